use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use exm_data::{Category, CategoryFilter, Insert, Query, Retrieve, Table};

use crate::{
    results::{single, Id},
    Connection,
};

#[async_trait]
impl Query<Category> for Connection {
    type Filter = CategoryFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Category>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "SELECT id, group_id, name, color FROM categories WHERE 1",
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(group_id) = filter.group_id {
            qry.push(" AND group_id = ").push_bind(group_id);
        }
        qry.push(" ORDER BY name, id");

        let categories: Vec<Category> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(categories)
    }
}

#[async_trait]
impl Retrieve<Category> for Connection {
    type Key = u32;
    async fn retrieve(&self, category_id: Self::Key) -> Result<Category> {
        let filter = CategoryFilter {
            id: Some(category_id),
            ..Default::default()
        };
        let categories: Vec<Category> = self.query(&filter).await?;
        Ok(single(categories)?)
    }
}

#[async_trait]
impl Insert<Category> for Connection {
    async fn insert(&self, category: Category) -> Result<Category> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                "INSERT INTO categories (group_id, name, color) VALUES (",
            );
            qry.separated(", ")
                .push_bind(category.group_id)
                .push_bind(&category.name)
                .push_bind(&category.color);
            qry.push(") RETURNING id")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.notify(Table::Categories, Some(category.group_id));
        self.retrieve(insert.id).await
    }
}

/// Insert or replace a category keeping its id.
pub(crate) async fn upsert_category(conn: &mut SqliteConnection, category: &Category) -> Result<()> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        "INSERT INTO categories (id, group_id, name, color) VALUES (",
    );
    qry.separated(", ")
        .push_bind(category.id)
        .push_bind(category.group_id)
        .push_bind(&category.name)
        .push_bind(&category.color);
    qry.push(
        ") ON CONFLICT(id) DO UPDATE SET \
         group_id = excluded.group_id, name = excluded.name, color = excluded.color",
    )
    .build()
    .execute(&mut *conn)
    .await?;
    Ok(())
}
