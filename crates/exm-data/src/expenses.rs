use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Match on a nullable reference column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdMatch {
    Id(u32),
    /// Matches rows where the column is NULL.
    Unassigned,
}

impl From<Option<u32>> for IdMatch {
    fn from(id: Option<u32>) -> Self {
        match id {
            Some(id) => IdMatch::Id(id),
            None => IdMatch::Unassigned,
        }
    }
}

/// An inclusive date range. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// True if at least one bound is set.
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// Expense query. Results are ordered by `expense_date`
/// descending, newest insert first on equal dates.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFilter {
    pub group_id: u32,
    pub member: Option<IdMatch>,
    pub category: Option<IdMatch>,
    pub date: Option<DateRange>,
}

impl ExpenseFilter {
    /// All expenses of a group.
    pub fn group(group_id: u32) -> Self {
        Self {
            group_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Expense {
    pub id: u32,
    pub group_id: u32,
    pub member_id: u32,
    pub category_id: Option<u32>,
    pub amount: f64,
    pub note: String,
    pub expense_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_bounds() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();

        assert!(!DateRange::default().is_bounded());
        assert!(DateRange::new(Some(d(1)), None).is_bounded());
        assert!(DateRange::new(None, Some(d(1))).is_bounded());
    }

    #[test]
    fn test_id_match_from_option() {
        assert_eq!(IdMatch::from(Some(3)), IdMatch::Id(3));
        assert_eq!(IdMatch::from(None), IdMatch::Unassigned);
    }
}
