use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::Connection as SqlConnection;
use thiserror::Error as ThisError;
use tracing::{debug, info};

use exm_data::{Category, Expense, Group, Member, SyncReport, SyncService, Table, User};

use crate::{
    categories::upsert_category, expenses::upsert_expense, groups::upsert_group,
    groups::upsert_user, members::upsert_member, Connection,
};

#[derive(Debug, ThisError)]
pub enum SyncError {
    #[error("snapshot {path} could not be read: {reason}")]
    Snapshot { path: String, reason: String },
    #[error("snapshot is for group {found}, expected group {expected}")]
    GroupMismatch { expected: u32, found: u32 },
    #[error("snapshot record belongs to group {found}, expected group {expected}")]
    ForeignRecord { expected: u32, found: u32 },
}

/// A remote export of one group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub group: Group,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Snapshot {
    pub fn parse(data: &str) -> Result<Snapshot, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Every record must belong to the snapshot's group.
    fn check(&self, group_id: u32) -> Result<(), SyncError> {
        if self.group.id != group_id {
            return Err(SyncError::GroupMismatch {
                expected: group_id,
                found: self.group.id,
            });
        }
        let foreign = self
            .members
            .iter()
            .map(|m| m.group_id)
            .chain(self.categories.iter().map(|c| c.group_id))
            .chain(self.expenses.iter().map(|e| e.group_id))
            .find(|id| *id != group_id);
        match foreign {
            Some(found) => Err(SyncError::ForeignRecord {
                expected: group_id,
                found,
            }),
            None => Ok(()),
        }
    }

    /// Write the snapshot into the store.
    pub async fn apply(&self, db: &Connection) -> Result<SyncReport> {
        {
            let mut conn = db.lock().await;
            let mut tx = conn.begin().await?;
            upsert_group(&mut tx, &self.group).await?;
            for user in &self.users {
                upsert_user(&mut tx, user).await?;
            }
            for member in &self.members {
                upsert_member(&mut tx, member).await?;
            }
            for category in &self.categories {
                upsert_category(&mut tx, category).await?;
            }
            for expense in &self.expenses {
                upsert_expense(&mut tx, expense).await?;
            }
            tx.commit().await?;
        }

        let group_id = Some(self.group.id);
        db.notify(Table::Groups, group_id);
        if !self.users.is_empty() {
            db.notify(Table::Users, None);
        }
        if !self.members.is_empty() {
            db.notify(Table::Members, group_id);
        }
        if !self.categories.is_empty() {
            db.notify(Table::Categories, group_id);
        }
        if !self.expenses.is_empty() {
            db.notify(Table::Expenses, group_id);
        }

        Ok(SyncReport {
            members: self.members.len(),
            categories: self.categories.len(),
            expenses: self.expenses.len(),
        })
    }
}

/// Syncs groups from snapshot files. The file is read anew on every run.
#[derive(Clone)]
pub struct SnapshotSync {
    db: Connection,
    path: PathBuf,
}

impl SnapshotSync {
    pub fn new(db: Connection, path: impl Into<PathBuf>) -> Self {
        Self {
            db,
            path: path.into(),
        }
    }
}

#[async_trait]
impl SyncService for SnapshotSync {
    async fn sync_group_expenses(&self, group_id: u32) -> Result<SyncReport> {
        debug!(group_id, path = %self.path.display(), "reading snapshot");
        let data = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SyncError::Snapshot {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        let snapshot = Snapshot::parse(&data).map_err(|e| SyncError::Snapshot {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        snapshot.check(group_id)?;

        let report = snapshot
            .apply(&self.db)
            .await
            .with_context(|| format!("applying snapshot for group {}", group_id))?;
        info!(
            group_id,
            members = report.members,
            categories = report.categories,
            expenses = report.expenses,
            "group synced"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use exm_data::{ExpenseFilter, MemberFilter, Count, Query};

    const SNAPSHOT: &str = r##"{
        "group": { "id": 7, "name": "Road trip" },
        "users": [
            { "id": 3, "fullname": "Ada Lovelace", "photo_url": "https://example.org/ada.png" }
        ],
        "members": [
            { "id": 11, "group_id": 7, "name": "Ada", "user_id": 3, "accepted": true },
            { "id": 12, "group_id": 7, "name": "Bob", "user_id": null, "accepted": true }
        ],
        "categories": [
            { "id": 21, "group_id": 7, "name": "Fuel", "color": "#FF0000" }
        ],
        "expenses": [
            {
                "id": 31, "group_id": 7, "member_id": 11, "category_id": 21,
                "amount": 60.0, "note": "Tank", "expense_date": "2024-06-01",
                "created_at": "2024-06-01T10:00:00"
            },
            {
                "id": 32, "group_id": 7, "member_id": 12, "category_id": null,
                "amount": 14.2, "note": "Snacks", "expense_date": "2024-06-02",
                "created_at": "2024-06-02T09:30:00"
            }
        ]
    }"##;

    fn write_snapshot(data: &str) -> PathBuf {
        let path = PathBuf::from(format!("/tmp/exm_snapshot_{}.json", rand::random::<u64>()));
        fs::write(&path, data).unwrap();
        path
    }

    #[tokio::test]
    async fn test_snapshot_sync() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let path = write_snapshot(SNAPSHOT);
        let sync = SnapshotSync::new(db.clone(), &path);

        let report = sync.sync_group_expenses(7).await.unwrap();
        assert_eq!(
            report,
            SyncReport {
                members: 2,
                categories: 1,
                expenses: 2
            }
        );

        let expenses: Vec<Expense> = db.query(&ExpenseFilter::group(7)).await.unwrap();
        let notes: Vec<&str> = expenses.iter().map(|e| e.note.as_str()).collect();
        assert_eq!(notes, vec!["Snacks", "Tank"]);
        assert_eq!(db.count(&MemberFilter::accepted_in(7)).await.unwrap(), 2);

        // Syncing again replaces instead of duplicating
        sync.sync_group_expenses(7).await.unwrap();
        let expenses: Vec<Expense> = db.query(&ExpenseFilter::group(7)).await.unwrap();
        assert_eq!(expenses.len(), 2);

        fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_for_other_group() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let path = write_snapshot(SNAPSHOT);
        let sync = SnapshotSync::new(db, &path);

        let err = sync.sync_group_expenses(8).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::GroupMismatch {
                expected: 8,
                found: 7
            })
        ));
        fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_missing_file() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let sync = SnapshotSync::new(db, "/tmp/exm_snapshot_does_not_exist.json");

        let err = sync.sync_group_expenses(7).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::Snapshot { .. })
        ));
    }
}
