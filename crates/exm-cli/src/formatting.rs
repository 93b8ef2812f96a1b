use std::collections::HashMap;

use exm_data::{Category, Group, Member};

use crate::screen::ScreenState;

pub trait PrintFormatted {
    fn print_formatted(&self);
}

impl PrintFormatted for Vec<Group> {
    fn print_formatted(&self) {
        println!("{:>4}\t{:<30}", "ID", "Name");
        println!("{:-<60}", "-");
        for group in self {
            println!("{:>4}\t{:<30}", group.id, group.name);
        }
    }
}

impl PrintFormatted for Vec<Member> {
    fn print_formatted(&self) {
        println!("{:>4}\t{:<24}\t{:>6}\t{}", "ID", "Name", "User", "Accepted");
        println!("{:-<60}", "-");
        for member in self {
            let user = match member.user_id {
                Some(id) => id.to_string(),
                None => "-".to_string(),
            };
            let accepted = if member.accepted { "yes" } else { "invited" };
            println!(
                "{:>4}\t{:<24}\t{:>6}\t{}",
                member.id, member.name, user, accepted
            );
        }
    }
}

impl PrintFormatted for Vec<Category> {
    fn print_formatted(&self) {
        println!("{:>4}\t{:<24}\t{}", "ID", "Name", "Colour");
        println!("{:-<60}", "-");
        for category in self {
            println!("{:>4}\t{:<24}\t{}", category.id, category.name, category.color);
        }
    }
}

/// The expense screen with names resolved for display.
pub struct ExpenseTable<'a> {
    pub state: &'a ScreenState,
    pub members: HashMap<u32, String>,
    pub categories: HashMap<u32, String>,
}

impl<'a> ExpenseTable<'a> {
    pub fn new(state: &'a ScreenState, members: &[Member], categories: &[Category]) -> Self {
        Self {
            state,
            members: members.iter().map(|m| (m.id, m.name.clone())).collect(),
            categories: categories.iter().map(|c| (c.id, c.name.clone())).collect(),
        }
    }

    fn category_name(&self, id: Option<u32>) -> &str {
        id.and_then(|id| self.categories.get(&id))
            .map(String::as_str)
            .unwrap_or("-")
    }

    fn member_name(&self, id: u32) -> &str {
        self.members.get(&id).map(String::as_str).unwrap_or("?")
    }
}

impl PrintFormatted for ExpenseTable<'_> {
    fn print_formatted(&self) {
        let state = self.state;
        match (&state.badge, state.accent) {
            (Some((icon, _)), Some(accent)) => println!("{}\t[{}]\t{}", state.title, accent, icon),
            (Some((icon, _)), None) => println!("{}\t{}", state.title, icon),
            (None, Some(accent)) => println!("{}\t[{}]", state.title, accent),
            (None, None) => println!("{}", state.title),
        }
        for filter in &state.filters {
            println!("  {}", filter);
        }
        println!("");

        if state.show_member_column {
            println!(
                "{:>4}\t{:<10}\t{:<20}\t{:<16}\t{:>10}\t{}",
                "ID", "Date", "Member", "Category", "Amount", "Note"
            );
        } else {
            println!(
                "{:>4}\t{:<10}\t{:<16}\t{:>10}\t{}",
                "ID", "Date", "Category", "Amount", "Note"
            );
        }
        println!("{:-<100}", "-");

        let mut total = 0.0;
        for expense in &state.items {
            total += expense.amount;
            let category = self.category_name(expense.category_id);
            if state.show_member_column {
                println!(
                    "{:>4}\t{:<10}\t{:<20}\t{:<16}\t{:>10.2}\t{}",
                    expense.id,
                    expense.expense_date,
                    self.member_name(expense.member_id),
                    category,
                    expense.amount,
                    expense.note
                );
            } else {
                println!(
                    "{:>4}\t{:<10}\t{:<16}\t{:>10.2}\t{}",
                    expense.id, expense.expense_date, category, expense.amount, expense.note
                );
            }
        }
        println!("{:-<100}", "-");
        println!("{} expenses, total {:.2}", state.items.len(), total);
    }
}
