use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use exm_data::SyncService;
use exm_db::{Connection, SnapshotSync};
use exm_expenses::ControllerConfig;

use crate::commands::{
    Categories, Expenses, Groups, Init, ListExpenses, Members, Refresh, Unconfigured,
};

#[derive(Parser, Debug)]
#[clap(name = "exm", version=env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// The expense database
    #[clap(long, env = "EXM_DB", default_value = "expenses.sqlite3", global = true)]
    pub db: String,

    /// Data older than this is synced when a list is shown
    #[clap(long, env = "EXM_SYNC_INTERVAL_SECS", default_value_t = 300, global = true)]
    pub sync_interval_secs: u64,

    /// JSON snapshot of the group to sync from
    #[clap(long, env = "EXM_SNAPSHOT", global = true)]
    pub snapshot: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::default()
            .with_sync_interval(Duration::from_secs(self.sync_interval_secs))
    }

    /// The sync source for the expense list.
    pub fn sync_service(&self, db: &Connection) -> Arc<dyn SyncService> {
        match &self.snapshot {
            Some(path) => Arc::new(SnapshotSync::new(db.clone(), path.clone())),
            None => Arc::new(Unconfigured),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database
    #[clap(name = "init")]
    Init(Init),
    /// Manage groups
    #[clap(name = "group", subcommand)]
    Group(Groups),
    /// Manage group members
    #[clap(name = "member", subcommand)]
    Member(Members),
    /// Manage expense categories
    #[clap(name = "category", subcommand)]
    Category(Categories),
    /// Record expenses
    #[clap(name = "expense", subcommand)]
    Expense(Expenses),

    /// Show the expenses of a group
    #[clap(name = "expenses")]
    ListExpenses(ListExpenses),
    /// Sync a group now
    #[clap(name = "refresh")]
    Refresh(Refresh),
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_expenses_with_filters() {
        let cli = Cli::try_parse_from([
            "exm",
            "--db",
            "/tmp/x.sqlite3",
            "expenses",
            "--group",
            "3",
            "--category",
            "none",
            "--from",
            "2024-04-01",
        ])
        .unwrap();
        assert_eq!(cli.db, "/tmp/x.sqlite3");
        assert_eq!(cli.sync_interval_secs, 300);
        match cli.command {
            Command::ListExpenses(cmd) => {
                assert_eq!(cmd.group, 3);
                assert_eq!(cmd.category.as_deref(), Some("none"));
                assert_eq!(cmd.member, None);
                assert!(cmd.from.is_some());
                assert!(cmd.to.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_sync_interval_config() {
        let cli = Cli::try_parse_from([
            "exm",
            "--sync-interval-secs",
            "30",
            "refresh",
            "--group",
            "1",
        ])
        .unwrap();
        assert_eq!(
            cli.controller_config().sync_interval,
            Duration::from_secs(30)
        );
    }
}
