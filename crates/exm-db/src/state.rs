use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use exm_data::{Retrieve, SyncState, Table, Update};

use crate::Connection;

#[async_trait]
impl Retrieve<SyncState> for Connection {
    type Key = u32;

    /// Fetch the sync state of a group. Groups that
    /// were never synced report `SyncState::never`.
    async fn retrieve(&self, group_id: Self::Key) -> Result<SyncState> {
        let mut conn = self.lock().await;
        let state: Option<SyncState> = QueryBuilder::<Sqlite>::new(
            "SELECT group_id, synced_at_millis FROM sync_state WHERE group_id = ",
        )
        .push_bind(group_id)
        .build_query_as()
        .fetch_optional(&mut *conn)
        .await?;
        Ok(state.unwrap_or_else(|| SyncState::never(group_id)))
    }
}

#[async_trait]
impl Update<SyncState> for Connection {
    /// Store the sync state of a group
    async fn update(&self, state: SyncState) -> Result<SyncState> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("INSERT INTO sync_state (group_id, synced_at_millis) VALUES (")
                .push_bind(state.group_id)
                .push(", ")
                .push_bind(state.synced_at_millis)
                .push(") ON CONFLICT(group_id) DO UPDATE SET synced_at_millis = excluded.synced_at_millis")
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.notify(Table::SyncState, Some(state.group_id));
        self.retrieve(state.group_id).await
    }
}
