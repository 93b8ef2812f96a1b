use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use exm_data::{Group, GroupFilter, Insert, Query};
use exm_db::Connection;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Groups {
    /// List groups
    #[clap(name = "list")]
    List(ListGroups),
    /// Add a group
    #[clap(name = "add")]
    Add(AddGroup),
}

impl Groups {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Groups::List(cmd) => cmd.run(db).await,
            Groups::Add(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListGroups {
    #[clap(short, long)]
    pub name: Option<String>,
}

impl ListGroups {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let groups: Vec<Group> = db
            .query(&GroupFilter {
                name: self.name,
                ..Default::default()
            })
            .await?;
        println!("{} groups.", groups.len());
        groups.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddGroup {
    #[clap(short, long)]
    pub name: String,
}

impl AddGroup {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let existing: Vec<Group> = db
            .query(&GroupFilter {
                name: Some(self.name.clone()),
                ..Default::default()
            })
            .await?;
        if !existing.is_empty() {
            return Err(anyhow!("Group {} already exists.", self.name));
        }

        let group = db
            .insert(Group {
                name: self.name,
                ..Default::default()
            })
            .await?;
        println!("Group added with id {}.", group.id);
        Ok(())
    }
}
