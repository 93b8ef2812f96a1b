use exm_data::{Category, DateRange, Member};

/// A filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Member,
    Category,
    Date,
}

/// What a filter dialog reported back. `None` is an explicit clear.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSelection {
    Member(Option<Member>),
    Category(Option<Category>),
    DateRange(DateRange),
}

impl FilterSelection {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterSelection::Member(_) => FilterKind::Member,
            FilterSelection::Category(_) => FilterKind::Category,
            FilterSelection::DateRange(_) => FilterKind::Date,
        }
    }
}

/// Shows the filter dialogs. Dialogs answer by sending a
/// `FilterSelection` to the controller's selection channel.
pub trait FilterDialogs {
    fn show_member_filter(&mut self, active: bool, current: Option<&Member>);
    fn show_category_filter(&mut self, active: bool, current: Option<&Category>);
    fn show_date_filter(&mut self, range: DateRange);
}
