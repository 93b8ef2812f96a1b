use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a sync run brought in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub members: usize,
    pub categories: usize,
    pub expenses: usize,
}

/// Pulls a group's expenses from remote into the local store.
#[async_trait]
pub trait SyncService: Send + Sync {
    async fn sync_group_expenses(&self, group_id: u32) -> Result<SyncReport>;
}
