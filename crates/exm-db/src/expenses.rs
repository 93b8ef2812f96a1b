use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use exm_data::{Expense, ExpenseFilter, IdMatch, Insert, Query, Retrieve, Table};

use crate::{
    results::{single, Id},
    Connection,
};

const SELECT_EXPENSES: &str = r#"
    SELECT
        id,
        group_id,
        member_id,
        category_id,
        ROUND(amount, 10) AS amount,
        note,
        expense_date,
        created_at
    FROM expenses
    WHERE 1
    "#;

fn push_id_match(qry: &mut QueryBuilder<'_, Sqlite>, column: &str, id_match: IdMatch) {
    match id_match {
        IdMatch::Id(id) => {
            qry.push(format!(" AND {} = ", column)).push_bind(id);
        }
        IdMatch::Unassigned => {
            qry.push(format!(" AND {} IS NULL", column));
        }
    }
}

#[async_trait]
impl Query<Expense> for Connection {
    type Filter = ExpenseFilter;

    /// Expenses of a group, newest expense date first.
    /// Equal dates list the most recently inserted first.
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Expense>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(SELECT_EXPENSES);
        qry.push(" AND group_id = ").push_bind(filter.group_id);
        if let Some(member) = filter.member {
            push_id_match(&mut qry, "member_id", member);
        }
        if let Some(category) = filter.category {
            push_id_match(&mut qry, "category_id", category);
        }
        if let Some(date) = filter.date {
            if let Some(start) = date.start {
                qry.push(" AND expense_date >= ").push_bind(start);
            }
            if let Some(end) = date.end {
                qry.push(" AND expense_date <= ").push_bind(end);
            }
        }
        qry.push(" ORDER BY expense_date DESC, id DESC");

        let expenses: Vec<Expense> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(expenses)
    }
}

#[async_trait]
impl Retrieve<Expense> for Connection {
    type Key = u32;
    async fn retrieve(&self, expense_id: Self::Key) -> Result<Expense> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(SELECT_EXPENSES);
        qry.push(" AND id = ").push_bind(expense_id);

        let expenses: Vec<Expense> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(single(expenses)?)
    }
}

#[async_trait]
impl Insert<Expense> for Connection {
    async fn insert(&self, expense: Expense) -> Result<Expense> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO expenses (
                    group_id,
                    member_id,
                    category_id,
                    amount,
                    note,
                    expense_date,
                    created_at
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(expense.group_id)
                .push_bind(expense.member_id)
                .push_bind(expense.category_id)
                .push_bind(expense.amount)
                .push_bind(&expense.note)
                .push_bind(expense.expense_date)
                .push_bind(Utc::now().naive_utc());

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.notify(Table::Expenses, Some(expense.group_id));
        self.retrieve(insert.id).await
    }
}

/// Insert or replace an expense keeping its id and creation time.
pub(crate) async fn upsert_expense(conn: &mut SqliteConnection, expense: &Expense) -> Result<()> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"INSERT INTO expenses (
            id,
            group_id,
            member_id,
            category_id,
            amount,
            note,
            expense_date,
            created_at
        ) VALUES (
        "#,
    );
    qry.separated(", ")
        .push_bind(expense.id)
        .push_bind(expense.group_id)
        .push_bind(expense.member_id)
        .push_bind(expense.category_id)
        .push_bind(expense.amount)
        .push_bind(&expense.note)
        .push_bind(expense.expense_date)
        .push_bind(expense.created_at);
    qry.push(
        r#") ON CONFLICT(id) DO UPDATE SET
            group_id = excluded.group_id,
            member_id = excluded.member_id,
            category_id = excluded.category_id,
            amount = excluded.amount,
            note = excluded.note,
            expense_date = excluded.expense_date
        "#,
    )
    .build()
    .execute(&mut *conn)
    .await?;
    Ok(())
}
