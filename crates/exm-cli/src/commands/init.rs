use anyhow::Result;
use clap::Args;

use exm_data::{Group, GroupFilter, Query};
use exm_db::Connection;

#[derive(Args, Debug)]
pub struct Init {}

impl Init {
    /// The schema is installed when the database is opened,
    /// report what is there.
    pub async fn run(self, db: &Connection, filename: &str) -> Result<()> {
        let groups: Vec<Group> = db.query(&GroupFilter::default()).await?;
        println!("Database {} ready, {} groups.", filename, groups.len());
        Ok(())
    }
}
