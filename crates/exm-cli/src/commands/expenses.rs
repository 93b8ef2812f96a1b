use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use exm_data::{
    Category, CategoryFilter, DateRange, Expense, Group, Insert, Member, MemberFilter, Query,
    Retrieve, SyncService,
};
use exm_db::Connection;
use exm_expenses::{
    ControllerConfig, ExpenseListController, ExpenseStore, FilterKind, FilterSelection,
    SystemClock,
};

use crate::formatting::{ExpenseTable, PrintFormatted};
use crate::screen::TerminalScreen;

#[derive(Subcommand, Debug)]
pub enum Expenses {
    /// Record an expense
    #[clap(name = "add")]
    Add(AddExpense),
}

impl Expenses {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Expenses::Add(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddExpense {
    #[clap(short, long)]
    pub group: u32,
    #[clap(short, long)]
    pub member: u32,
    #[clap(short, long)]
    pub category: Option<u32>,
    #[clap(short, long)]
    pub amount: f64,
    #[clap(short, long, default_value = "")]
    pub note: String,
    /// Defaults to today
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
}

impl AddExpense {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let group: Group = db.retrieve(self.group).await?;
        let member: Member = db.retrieve(self.member).await?;
        if member.group_id != group.id {
            return Err(anyhow!(
                "Member {} is not in group {}.",
                member.name,
                group.name
            ));
        }
        if let Some(id) = self.category {
            let category: Category = db.retrieve(id).await?;
            if category.group_id != group.id {
                return Err(anyhow!(
                    "Category {} is not in group {}.",
                    category.name,
                    group.name
                ));
            }
        }

        let expense = db
            .insert(Expense {
                group_id: group.id,
                member_id: member.id,
                category_id: self.category,
                amount: self.amount,
                note: self.note,
                expense_date: self.date.unwrap_or_else(|| Local::now().date_naive()),
                ..Default::default()
            })
            .await?;
        println!("Expense added with id {}.", expense.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListExpenses {
    #[clap(short, long)]
    pub group: u32,
    /// Only expenses of this member
    #[clap(short, long)]
    pub member: Option<u32>,
    /// Only expenses in this category, `none` for uncategorized
    #[clap(short, long)]
    pub category: Option<String>,
    #[clap(long)]
    pub from: Option<NaiveDate>,
    #[clap(long)]
    pub to: Option<NaiveDate>,
}

impl ListExpenses {
    /// The dialog answers for the requested filters.
    async fn selections(&self, db: &Connection, group: &Group) -> Result<Vec<FilterSelection>> {
        let mut selections = vec![];
        if let Some(id) = self.member {
            let member: Member = db.retrieve(id).await?;
            if member.group_id != group.id {
                return Err(anyhow!(
                    "Member {} is not in group {}.",
                    member.name,
                    group.name
                ));
            }
            selections.push(FilterSelection::Member(Some(member)));
        }
        if let Some(arg) = &self.category {
            let category = match parse_category(arg)? {
                Some(id) => {
                    let category: Category = db.retrieve(id).await?;
                    if category.group_id != group.id {
                        return Err(anyhow!(
                            "Category {} is not in group {}.",
                            category.name,
                            group.name
                        ));
                    }
                    Some(category)
                }
                None => None,
            };
            selections.push(FilterSelection::Category(category));
        }
        if self.from.is_some() || self.to.is_some() {
            selections.push(FilterSelection::DateRange(DateRange::new(self.from, self.to)));
        }
        Ok(selections)
    }

    pub async fn run(
        self,
        db: &Connection,
        sync: Arc<dyn SyncService>,
        config: ControllerConfig,
    ) -> Result<()> {
        let group: Group = db.retrieve(self.group).await?;
        let selections = self.selections(db, &group).await?;

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
        controller.resume().await?;
        let wants_member = selections.iter().any(|s| s.kind() == FilterKind::Member);
        if wants_member && !controller.member_filter_offered() {
            controller.pause();
            return Err(anyhow!(
                "Group {} has no member filter, it needs two accepted members.",
                group.name
            ));
        }

        let dialogs = controller.selections();
        for selection in selections {
            dialogs
                .send(selection)
                .map_err(|_| anyhow!("expense list closed"))?;
        }
        controller.process_pending().await?;
        settle(&mut controller).await?;

        screen
            .state()
            .show_filters(controller.filters(), controller.member_filter_offered());

        let members: Vec<Member> = db
            .query(&MemberFilter {
                group_id: Some(group.id),
                ..Default::default()
            })
            .await?;
        let categories: Vec<Category> = db
            .query(&CategoryFilter {
                group_id: Some(group.id),
                ..Default::default()
            })
            .await?;
        let state = screen.snapshot();
        println!("");
        ExpenseTable::new(&state, &members, &categories).print_formatted();
        println!("");

        controller.pause();
        Ok(())
    }
}

/// Wait for running syncs and the store changes they cause.
pub async fn settle<S: ExpenseStore>(controller: &mut ExpenseListController<S>) -> Result<()> {
    while controller.syncs_in_flight() > 0 {
        let event = controller.next_event().await;
        controller.handle(event).await?;
    }
    controller.process_pending().await?;
    Ok(())
}

/// A category id, or `none` for uncategorized expenses.
fn parse_category(arg: &str) -> Result<Option<u32>> {
    if arg.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let id = arg
        .parse::<u32>()
        .with_context(|| format!("invalid category {}, expected an id or none", arg))?;
    Ok(Some(id))
}
