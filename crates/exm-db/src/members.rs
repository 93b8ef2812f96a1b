use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use exm_data::{Count, Insert, Member, MemberFilter, Query, Retrieve, Table, Update};

use crate::{
    results::{single, Id},
    Connection,
};

fn push_conditions(qry: &mut QueryBuilder<'_, Sqlite>, filter: &MemberFilter) {
    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(group_id) = filter.group_id {
        qry.push(" AND group_id = ").push_bind(group_id);
    }
    if let Some(name) = filter.name.as_ref() {
        qry.push(" AND name LIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(accepted) = filter.accepted {
        qry.push(" AND accepted = ").push_bind(accepted);
    }
}

#[async_trait]
impl Query<Member> for Connection {
    type Filter = MemberFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Member>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::new(
            r#"
            SELECT
                id,
                group_id,
                name,
                user_id,
                accepted
            FROM members
            WHERE 1
            "#,
        );
        push_conditions(&mut qry, filter);
        qry.push(" ORDER BY name, id");

        let members: Vec<Member> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(members)
    }
}

#[async_trait]
impl Count<Member> for Connection {
    type Filter = MemberFilter;
    async fn count(&self, filter: &Self::Filter) -> Result<u32> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::new("SELECT COUNT(*) FROM members WHERE 1");
        push_conditions(&mut qry, filter);

        let count: i64 = qry.build_query_scalar().fetch_one(&mut *conn).await?;
        Ok(u32::try_from(count)?)
    }
}

#[async_trait]
impl Retrieve<Member> for Connection {
    type Key = u32;
    async fn retrieve(&self, member_id: Self::Key) -> Result<Member> {
        let filter = MemberFilter {
            id: Some(member_id),
            ..Default::default()
        };
        let members: Vec<Member> = self.query(&filter).await?;
        Ok(single(members)?)
    }
}

#[async_trait]
impl Insert<Member> for Connection {
    async fn insert(&self, member: Member) -> Result<Member> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO members (
                    group_id,
                    name,
                    user_id,
                    accepted
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(member.group_id)
                .push_bind(&member.name)
                .push_bind(member.user_id)
                .push_bind(member.accepted);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.notify(Table::Members, Some(member.group_id));
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Member> for Connection {
    /// Update member
    async fn update(&self, member: Member) -> Result<Member> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE members SET")
                .push(" name = ")
                .push_bind(&member.name)
                .push(", user_id = ")
                .push_bind(member.user_id)
                .push(", accepted = ")
                .push_bind(member.accepted)
                .push(" WHERE id = ")
                .push_bind(member.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.notify(Table::Members, Some(member.group_id));
        self.retrieve(member.id).await
    }
}

/// Insert or replace a member keeping its id.
pub(crate) async fn upsert_member(conn: &mut SqliteConnection, member: &Member) -> Result<()> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        "INSERT INTO members (id, group_id, name, user_id, accepted) VALUES (",
    );
    qry.separated(", ")
        .push_bind(member.id)
        .push_bind(member.group_id)
        .push_bind(&member.name)
        .push_bind(member.user_id)
        .push_bind(member.accepted);
    qry.push(
        ") ON CONFLICT(id) DO UPDATE SET \
         group_id = excluded.group_id, name = excluded.name, \
         user_id = excluded.user_id, accepted = excluded.accepted",
    )
    .build()
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use exm_data::{Group, User};

    async fn group(db: &Connection) -> Group {
        db.insert(Group {
            name: "Test Group".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_member_insert() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let g = group(&db).await;
        let member = db
            .insert(Member {
                group_id: g.id,
                name: "Test Member".to_string(),
                accepted: true,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(member.id > 0);
        assert_eq!(member.group_id, g.id);
        assert_eq!(member.name, "Test Member");
        assert_eq!(member.user_id, None);
        assert!(member.accepted);
    }

    #[tokio::test]
    async fn test_member_count_accepted() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let g = group(&db).await;
        let other = group(&db).await;

        for (group_id, name, accepted) in [
            (g.id, "Accepted 1", true),
            (g.id, "Accepted 2", true),
            (g.id, "Invited", false),
            (other.id, "Elsewhere", true),
        ] {
            db.insert(Member {
                group_id,
                name: name.to_string(),
                accepted,
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let accepted = db.count(&MemberFilter::accepted_in(g.id)).await.unwrap();
        assert_eq!(accepted, 2);
        let all = db
            .count(&MemberFilter {
                group_id: Some(g.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all, 3);
    }

    #[tokio::test]
    async fn test_member_update_accepts_invitation() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let g = group(&db).await;
        let mut member = db
            .insert(Member {
                group_id: g.id,
                name: "Invited".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(db.count(&MemberFilter::accepted_in(g.id)).await.unwrap(), 0);

        member.accepted = true;
        let member = db.update(member).await.unwrap();
        assert!(member.accepted);
        assert_eq!(db.count(&MemberFilter::accepted_in(g.id)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_member_get_user() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let g = group(&db).await;
        let user = db
            .insert(User {
                fullname: "Ada Lovelace".to_string(),
                photo_url: "https://example.org/ada.png".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let linked = db
            .insert(Member {
                group_id: g.id,
                name: "Ada".to_string(),
                user_id: Some(user.id),
                accepted: true,
                ..Default::default()
            })
            .await
            .unwrap();
        let guest = db
            .insert(Member {
                group_id: g.id,
                name: "Guest".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(linked.get_user(&db).await.unwrap(), Some(user));
        assert_eq!(guest.get_user(&db).await.unwrap(), None);
    }
}
