use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use exm_data::{Category, CategoryFilter, Group, Insert, Query, Retrieve};
use exm_db::Connection;
use exm_expenses::Color;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Categories {
    /// List the categories of a group
    #[clap(name = "list")]
    List(ListCategories),
    /// Add a category to a group
    #[clap(name = "add")]
    Add(AddCategory),
}

impl Categories {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Categories::List(cmd) => cmd.run(db).await,
            Categories::Add(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListCategories {
    #[clap(short, long)]
    pub group: u32,
}

impl ListCategories {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let categories: Vec<Category> = db
            .query(&CategoryFilter {
                group_id: Some(self.group),
                ..Default::default()
            })
            .await?;
        println!("{} categories.", categories.len());
        categories.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddCategory {
    #[clap(short, long)]
    pub group: u32,
    #[clap(short, long)]
    pub name: String,
    /// #RRGGBB or #AARRGGBB
    #[clap(short, long, default_value = "#3F51B5")]
    pub color: String,
}

impl AddCategory {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let color: Color = self
            .color
            .parse()
            .with_context(|| format!("invalid colour {}", self.color))?;
        let group: Group = db.retrieve(self.group).await?;
        let category = db
            .insert(Category {
                group_id: group.id,
                name: self.name,
                color: color.to_string(),
                ..Default::default()
            })
            .await?;
        println!("Category added to {} with id {}.", group.name, category.id);
        Ok(())
    }
}
