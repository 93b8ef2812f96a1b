use exm_data::Expense;

use crate::{Color, FilterDialogs};

/// Toolbar decoration of the expense screen.
pub trait ChromePresenter {
    fn set_accent_color(&mut self, color: Color);
    /// Show a user's icon and use their name as title.
    fn show_user_badge(&mut self, icon_url: &str, name: &str);
    fn hide_user_badge(&mut self);
    fn set_title(&mut self, title: &str);
}

/// The expense list itself.
pub trait ListPresenter {
    fn clear(&mut self);
    fn set_show_member_column(&mut self, show: bool);
    fn set_items(&mut self, expenses: Vec<Expense>);
    fn set_refreshing(&mut self, refreshing: bool);
}

/// Everything the controller draws through.
pub struct Presenters {
    pub dialogs: Box<dyn FilterDialogs>,
    pub chrome: Box<dyn ChromePresenter>,
    pub list: Box<dyn ListPresenter>,
}
