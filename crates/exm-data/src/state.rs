use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// When the expenses of a group were last pulled from remote.
/// A group that was never synced reports `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SyncState {
    pub group_id: u32,
    pub synced_at_millis: i64,
}

impl SyncState {
    pub fn never(group_id: u32) -> Self {
        Self {
            group_id,
            synced_at_millis: 0,
        }
    }
}
