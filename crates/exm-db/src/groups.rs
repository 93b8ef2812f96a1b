use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use exm_data::{Group, GroupFilter, Insert, Query, Retrieve, Table, User};

use crate::{
    results::{single, Id},
    Connection,
};

#[async_trait]
impl Query<Group> for Connection {
    type Filter = GroupFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Group>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new("SELECT id, name FROM expense_groups WHERE 1");
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(name) = filter.name.clone() {
            qry.push(" AND name LIKE ").push_bind(format!("%{}%", name));
        }
        qry.push(" ORDER BY id");

        let groups: Vec<Group> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(groups)
    }
}

#[async_trait]
impl Retrieve<Group> for Connection {
    type Key = u32;
    async fn retrieve(&self, group_id: Self::Key) -> Result<Group> {
        let filter = GroupFilter {
            id: Some(group_id),
            ..Default::default()
        };
        let groups: Vec<Group> = self.query(&filter).await?;
        Ok(single(groups)?)
    }
}

#[async_trait]
impl Insert<Group> for Connection {
    async fn insert(&self, group: Group) -> Result<Group> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("INSERT INTO expense_groups (name) VALUES (")
                .push_bind(&group.name)
                .push(") RETURNING id")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.notify(Table::Groups, Some(insert.id));
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Retrieve<User> for Connection {
    type Key = u32;
    async fn retrieve(&self, user_id: Self::Key) -> Result<User> {
        let mut conn = self.lock().await;
        let users: Vec<User> = QueryBuilder::<Sqlite>::new(
            "SELECT id, fullname, photo_url FROM users WHERE id = ",
        )
        .push_bind(user_id)
        .build_query_as()
        .fetch_all(&mut *conn)
        .await?;
        Ok(single(users)?)
    }
}

#[async_trait]
impl Insert<User> for Connection {
    async fn insert(&self, user: User) -> Result<User> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new("INSERT INTO users (fullname, photo_url) VALUES (");
            qry.separated(", ")
                .push_bind(&user.fullname)
                .push_bind(&user.photo_url);
            qry.push(") RETURNING id")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.notify(Table::Users, None);
        self.retrieve(insert.id).await
    }
}

/// Insert or replace a group keeping its id.
pub(crate) async fn upsert_group(conn: &mut SqliteConnection, group: &Group) -> Result<()> {
    QueryBuilder::<Sqlite>::new("INSERT INTO expense_groups (id, name) VALUES (")
        .push_bind(group.id)
        .push(", ")
        .push_bind(&group.name)
        .push(") ON CONFLICT(id) DO UPDATE SET name = excluded.name")
        .build()
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Insert or replace a user keeping its id.
pub(crate) async fn upsert_user(conn: &mut SqliteConnection, user: &User) -> Result<()> {
    let mut qry = QueryBuilder::<Sqlite>::new("INSERT INTO users (id, fullname, photo_url) VALUES (");
    qry.separated(", ")
        .push_bind(user.id)
        .push_bind(&user.fullname)
        .push_bind(&user.photo_url);
    qry.push(
        ") ON CONFLICT(id) DO UPDATE SET \
         fullname = excluded.fullname, photo_url = excluded.photo_url",
    )
    .build()
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_group_insert_and_query() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let flat = db
            .insert(Group {
                name: "Flat share".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        db.insert(Group {
            name: "Road trip".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        assert!(flat.id > 0);
        let groups: Vec<Group> = db
            .query(&GroupFilter {
                name: Some("flat".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(groups, vec![flat]);
    }

    #[tokio::test]
    async fn test_user_retrieve_missing() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let user: Result<User> = db.retrieve(42).await;
        assert!(user.is_err());

        let user = db
            .insert(User {
                fullname: "Ada Lovelace".to_string(),
                photo_url: "https://example.org/ada.png".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let found: User = db.retrieve(user.id).await.unwrap();
        assert_eq!(found, user);
    }
}
