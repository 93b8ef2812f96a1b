use anyhow::Result;
use clap::{Args, Subcommand};

use exm_data::{Group, Insert, Member, MemberFilter, Query, Retrieve};
use exm_db::Connection;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Members {
    /// List the members of a group
    #[clap(name = "list")]
    List(ListMembers),
    /// Add a member to a group
    #[clap(name = "add")]
    Add(AddMember),
}

impl Members {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Members::List(cmd) => cmd.run(db).await,
            Members::Add(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListMembers {
    #[clap(short, long)]
    pub group: u32,
    /// Only members that accepted their invitation
    #[clap(long)]
    pub accepted: bool,
}

impl ListMembers {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = MemberFilter {
            group_id: Some(self.group),
            accepted: self.accepted.then_some(true),
            ..Default::default()
        };
        let members: Vec<Member> = db.query(&filter).await?;
        println!("{} members.", members.len());
        members.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddMember {
    #[clap(short, long)]
    pub group: u32,
    #[clap(short, long)]
    pub name: String,
    /// User account of the member
    #[clap(short, long)]
    pub user: Option<u32>,
    /// Add the member as invited, not yet accepted
    #[clap(long)]
    pub invited: bool,
}

impl AddMember {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let group: Group = db.retrieve(self.group).await?;
        let member = db
            .insert(Member {
                group_id: group.id,
                name: self.name,
                user_id: self.user,
                accepted: !self.invited,
                ..Default::default()
            })
            .await?;
        println!("Member added to {} with id {}.", group.name, member.id);
        Ok(())
    }
}
