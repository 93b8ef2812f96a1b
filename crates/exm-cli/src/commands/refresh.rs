use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use clap::Args;
use tracing::debug;

use exm_data::{Group, Retrieve, SyncReport, SyncService};
use exm_db::Connection;
use exm_expenses::{ControllerConfig, ExpenseListController, ScreenEvent, SyncTrigger, SystemClock};

use crate::screen::TerminalScreen;

/// Sync source used when no snapshot is configured.
/// There is nothing to pull, so every sync succeeds empty.
pub struct Unconfigured;

#[async_trait]
impl SyncService for Unconfigured {
    async fn sync_group_expenses(&self, group_id: u32) -> Result<SyncReport> {
        debug!(group_id, "no sync source configured");
        Ok(SyncReport::default())
    }
}

#[derive(Args, Debug)]
pub struct Refresh {
    #[clap(short, long)]
    pub group: u32,
}

impl Refresh {
    /// Sync the group now and wait for the result.
    pub async fn run(
        self,
        db: &Connection,
        sync: Arc<dyn SyncService>,
        config: ControllerConfig,
    ) -> Result<()> {
        let group: Group = db.retrieve(self.group).await?;
        let screen = TerminalScreen::with_title(&group.name);
        let mut controller = ExpenseListController::open(
            group.id,
            db.clone(),
            sync,
            screen.presenters(),
            Box::new(SystemClock),
            config,
        )
        .await?;

        controller.refresh();
        println!("Refreshing {}...", group.name);
        loop {
            let outcome = match controller.next_event().await {
                ScreenEvent::SyncFinished(outcome) if outcome.trigger == SyncTrigger::Manual => {
                    outcome
                }
                other => {
                    controller.handle(other).await?;
                    continue;
                }
            };

            let summary = match &outcome.result {
                Ok(report) => Ok(format!(
                    "Synced {} members, {} categories, {} expenses.",
                    report.members, report.categories, report.expenses
                )),
                Err(e) => Err(anyhow!("Refresh of {} failed: {:#}", group.name, e)),
            };
            controller.handle(ScreenEvent::SyncFinished(outcome)).await?;
            debug!(refreshing = screen.snapshot().refreshing, "refresh done");
            println!("{}", summary?);
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use exm_data::Insert;

    #[tokio::test]
    async fn test_refresh_without_source() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let group = db
            .insert(Group {
                name: "Flat".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        Refresh { group: group.id }
            .run(&db, Arc::new(Unconfigured), ControllerConfig::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_refresh_unknown_group() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        let result = Refresh { group: 42 }
            .run(&db, Arc::new(Unconfigured), ControllerConfig::default())
            .await;
        assert!(result.is_err());
    }
}
