use std::sync::{Arc, Mutex, MutexGuard};

use exm_data::{Category, DateRange, Expense, Member};
use exm_expenses::{
    ChromePresenter, Color, FilterDialogs, FilterState, ListPresenter, Presenters,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenState {
    pub title: String,
    pub accent: Option<Color>,
    /// Icon url and name of the filtered member's user.
    pub badge: Option<(String, String)>,
    pub show_member_column: bool,
    pub items: Vec<Expense>,
    pub refreshing: bool,
    /// Filter summaries written by the dialogs.
    pub filters: Vec<String>,
}

impl ScreenState {
    /// Summarize the current filters. The member line is left out
    /// when the group has no member filter.
    pub fn show_filters(&mut self, filters: &FilterState, member_offered: bool) {
        self.filters.clear();
        if member_offered {
            self.filters
                .push(member_summary(filters.member_active(), filters.member()));
        }
        self.filters
            .push(category_summary(filters.category_active(), filters.category()));
        self.filters.push(date_summary(filters.date_range()));
    }
}

#[derive(Clone, Default)]
pub struct TerminalScreen {
    state: Arc<Mutex<ScreenState>>,
}

impl TerminalScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// A screen showing `title` until the controller sets one.
    pub fn with_title(title: &str) -> Self {
        let screen = Self::new();
        screen.state().title = title.to_string();
        screen
    }

    pub fn presenters(&self) -> Presenters {
        Presenters {
            dialogs: Box::new(self.clone()),
            chrome: Box::new(self.clone()),
            list: Box::new(self.clone()),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, ScreenState> {
        // A poisoned lock only means a presenter call panicked,
        // the recorded state is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> ScreenState {
        self.state().clone()
    }
}

impl ChromePresenter for TerminalScreen {
    fn set_accent_color(&mut self, color: Color) {
        self.state().accent = Some(color);
    }

    fn show_user_badge(&mut self, icon_url: &str, name: &str) {
        let mut state = self.state();
        state.badge = Some((icon_url.to_string(), name.to_string()));
        state.title = name.to_string();
    }

    fn hide_user_badge(&mut self) {
        self.state().badge = None;
    }

    fn set_title(&mut self, title: &str) {
        self.state().title = title.to_string();
    }
}

impl ListPresenter for TerminalScreen {
    fn clear(&mut self) {
        self.state().items.clear();
    }

    fn set_show_member_column(&mut self, show: bool) {
        self.state().show_member_column = show;
    }

    fn set_items(&mut self, expenses: Vec<Expense>) {
        self.state().items = expenses;
    }

    fn set_refreshing(&mut self, refreshing: bool) {
        self.state().refreshing = refreshing;
    }
}

impl FilterDialogs for TerminalScreen {
    fn show_member_filter(&mut self, active: bool, current: Option<&Member>) {
        self.state().filters.push(member_summary(active, current));
    }

    fn show_category_filter(&mut self, active: bool, current: Option<&Category>) {
        self.state().filters.push(category_summary(active, current));
    }

    fn show_date_filter(&mut self, range: DateRange) {
        self.state().filters.push(date_summary(range));
    }
}

fn member_summary(active: bool, current: Option<&Member>) -> String {
    let value = match current {
        Some(member) => member.name.clone(),
        None => "no member".to_string(),
    };
    summary("Member", active, value)
}

fn category_summary(active: bool, current: Option<&Category>) -> String {
    let value = match current {
        Some(category) => category.name.clone(),
        None => "uncategorized".to_string(),
    };
    summary("Category", active, value)
}

fn date_summary(range: DateRange) -> String {
    let bound = |date: Option<chrono::NaiveDate>| match date {
        Some(date) => date.to_string(),
        None => "..".to_string(),
    };
    let value = format!("{} - {}", bound(range.start), bound(range.end));
    summary("Date", range.is_bounded(), value)
}

fn summary(name: &str, active: bool, value: String) -> String {
    if active {
        format!("{}:\t{}", name, value)
    } else {
        format!("{}:\tany", name)
    }
}
