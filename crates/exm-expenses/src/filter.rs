//! Filter selections of the expense list and the query they select.
//!
//! Each dimension (member, category, date range) carries its own
//! `active` flag. The flag is switched by the toggle rules below and is
//! not derived from whether a value is present: a dimension can be
//! active while its value is `None`.

use exm_data::{Category, DateRange, ExpenseFilter, IdMatch, Member};

/// Records that are compared by id when toggling a filter.
pub trait Identified {
    fn id(&self) -> u32;
}

impl Identified for Member {
    fn id(&self) -> u32 {
        self.id
    }
}

impl Identified for Category {
    fn id(&self) -> u32 {
        self.id
    }
}

/// Activate an inactive filter; re-selecting the current value
/// deactivates it; any other value replaces the current one and
/// keeps the filter active.
fn toggle<T: Identified>(active: &mut bool, current: &mut Option<T>, candidate: Option<T>) {
    if !*active {
        *active = true;
    } else if let (Some(current), Some(candidate)) = (current.as_ref(), candidate.as_ref()) {
        if current.id() == candidate.id() {
            *active = false;
        }
    }
    *current = candidate;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    member: Option<Member>,
    member_active: bool,
    category: Option<Category>,
    category_active: bool,
    date: DateRange,
    date_active: bool,
}

impl FilterState {
    pub fn member(&self) -> Option<&Member> {
        self.member.as_ref()
    }

    pub fn member_active(&self) -> bool {
        self.member_active
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn category_active(&self) -> bool {
        self.category_active
    }

    pub fn date_range(&self) -> DateRange {
        self.date
    }

    pub fn date_active(&self) -> bool {
        self.date_active
    }

    /// Apply a member picked in the member dialog.
    /// Returns whether the member filter is active afterwards.
    pub fn toggle_member(&mut self, candidate: Option<Member>) -> bool {
        toggle(&mut self.member_active, &mut self.member, candidate);
        self.member_active
    }

    /// Apply a category picked in the category dialog.
    /// Returns whether the category filter is active afterwards.
    pub fn toggle_category(&mut self, candidate: Option<Category>) -> bool {
        toggle(&mut self.category_active, &mut self.category, candidate);
        self.category_active
    }

    /// Apply a date range. The filter is active exactly when
    /// one of the bounds is set.
    pub fn set_date_range(&mut self, range: DateRange) -> bool {
        self.date_active = range.is_bounded();
        self.date = range;
        self.date_active
    }

    /// Pick the query for the current flags. Flags are independent,
    /// every one of the eight combinations has its own variant.
    pub fn select_query(&self, group_id: u32) -> QueryVariant {
        let member = self.member.as_ref().map(|m| m.id);
        let category = self.category.as_ref().map(|c| c.id);
        let range = self.date;

        match (self.member_active, self.category_active, self.date_active) {
            (false, false, false) => QueryVariant::All { group_id },
            (true, false, false) => QueryVariant::ByMember { group_id, member },
            (false, true, false) => QueryVariant::ByCategory { group_id, category },
            (false, false, true) => QueryVariant::ByDate { group_id, range },
            (true, false, true) => QueryVariant::ByMemberAndDate {
                group_id,
                member,
                range,
            },
            (true, true, false) => QueryVariant::ByMemberAndCategory {
                group_id,
                member,
                category,
            },
            (false, true, true) => QueryVariant::ByCategoryAndDate {
                group_id,
                category,
                range,
            },
            (true, true, true) => QueryVariant::ByMemberCategoryAndDate {
                group_id,
                member,
                category,
                range,
            },
        }
    }
}

/// The expense query to run for a filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryVariant {
    All {
        group_id: u32,
    },
    ByMember {
        group_id: u32,
        member: Option<u32>,
    },
    ByCategory {
        group_id: u32,
        category: Option<u32>,
    },
    ByDate {
        group_id: u32,
        range: DateRange,
    },
    ByMemberAndDate {
        group_id: u32,
        member: Option<u32>,
        range: DateRange,
    },
    ByMemberAndCategory {
        group_id: u32,
        member: Option<u32>,
        category: Option<u32>,
    },
    ByCategoryAndDate {
        group_id: u32,
        category: Option<u32>,
        range: DateRange,
    },
    ByMemberCategoryAndDate {
        group_id: u32,
        member: Option<u32>,
        category: Option<u32>,
        range: DateRange,
    },
}

impl QueryVariant {
    pub fn group_id(&self) -> u32 {
        match *self {
            QueryVariant::All { group_id }
            | QueryVariant::ByMember { group_id, .. }
            | QueryVariant::ByCategory { group_id, .. }
            | QueryVariant::ByDate { group_id, .. }
            | QueryVariant::ByMemberAndDate { group_id, .. }
            | QueryVariant::ByMemberAndCategory { group_id, .. }
            | QueryVariant::ByCategoryAndDate { group_id, .. }
            | QueryVariant::ByMemberCategoryAndDate { group_id, .. } => group_id,
        }
    }

    /// Lower the variant into a store filter. An active dimension
    /// without a value matches expenses where it is unset.
    pub fn to_filter(&self) -> ExpenseFilter {
        let (member, category, date) = match *self {
            QueryVariant::All { .. } => (None, None, None),
            QueryVariant::ByMember { member, .. } => (Some(member), None, None),
            QueryVariant::ByCategory { category, .. } => (None, Some(category), None),
            QueryVariant::ByDate { range, .. } => (None, None, Some(range)),
            QueryVariant::ByMemberAndDate { member, range, .. } => {
                (Some(member), None, Some(range))
            }
            QueryVariant::ByMemberAndCategory {
                member, category, ..
            } => (Some(member), Some(category), None),
            QueryVariant::ByCategoryAndDate {
                category, range, ..
            } => (None, Some(category), Some(range)),
            QueryVariant::ByMemberCategoryAndDate {
                member,
                category,
                range,
                ..
            } => (Some(member), Some(category), Some(range)),
        };
        ExpenseFilter {
            group_id: self.group_id(),
            member: member.map(IdMatch::from),
            category: category.map(IdMatch::from),
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    fn member(id: u32) -> Member {
        Member {
            id,
            group_id: 1,
            name: format!("member {}", id),
            accepted: true,
            ..Default::default()
        }
    }

    fn category(id: u32) -> Category {
        Category {
            id,
            group_id: 1,
            name: format!("category {}", id),
            color: "#FF0000".to_string(),
        }
    }

    fn range() -> DateRange {
        DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 1), None)
    }

    fn state(member_on: bool, category_on: bool, date_on: bool) -> FilterState {
        FilterState {
            member: Some(member(2)),
            member_active: member_on,
            category: Some(category(3)),
            category_active: category_on,
            date: range(),
            date_active: date_on,
        }
    }

    #[test]
    fn test_select_query_table() {
        let m = Some(2);
        let c = Some(3);
        let r = range();
        let g = 9;
        let cases = [
            ((false, false, false), QueryVariant::All { group_id: g }),
            ((true, false, false), QueryVariant::ByMember { group_id: g, member: m }),
            ((false, true, false), QueryVariant::ByCategory { group_id: g, category: c }),
            ((false, false, true), QueryVariant::ByDate { group_id: g, range: r }),
            (
                (true, false, true),
                QueryVariant::ByMemberAndDate { group_id: g, member: m, range: r },
            ),
            (
                (true, true, false),
                QueryVariant::ByMemberAndCategory { group_id: g, member: m, category: c },
            ),
            (
                (false, true, true),
                QueryVariant::ByCategoryAndDate { group_id: g, category: c, range: r },
            ),
            (
                (true, true, true),
                QueryVariant::ByMemberCategoryAndDate {
                    group_id: g,
                    member: m,
                    category: c,
                    range: r,
                },
            ),
        ];
        for ((member_on, category_on, date_on), expected) in cases {
            let selected = state(member_on, category_on, date_on).select_query(g);
            assert_eq!(selected, expected, "flags {:?}", (member_on, category_on, date_on));
        }
    }

    #[test]
    fn test_all_active_ignores_missing_values() {
        let state = FilterState {
            member_active: true,
            category_active: true,
            date_active: true,
            ..Default::default()
        };
        assert_eq!(
            state.select_query(1),
            QueryVariant::ByMemberCategoryAndDate {
                group_id: 1,
                member: None,
                category: None,
                range: DateRange::default(),
            }
        );
    }

    #[test]
    fn test_empty_state_selects_all() {
        let state = FilterState::default();
        let query = state.select_query(4);
        assert_eq!(query, QueryVariant::All { group_id: 4 });
        assert_eq!(query.to_filter(), ExpenseFilter::group(4));
    }

    #[test]
    fn test_same_member_twice_toggles_off() {
        let mut state = FilterState::default();
        assert!(state.toggle_member(Some(member(2))));
        assert!(!state.toggle_member(Some(member(2))));
        assert_eq!(state.member().map(|m| m.id), Some(2));
    }

    #[test]
    fn test_other_member_keeps_filter_active() {
        let mut state = FilterState::default();
        assert!(state.toggle_member(Some(member(2))));
        assert!(state.toggle_member(Some(member(5))));
        assert!(state.member_active());
        assert_eq!(state.member().map(|m| m.id), Some(5));
    }

    #[test]
    fn test_cleared_member_while_active_stays_active() {
        let mut state = FilterState::default();
        state.toggle_member(Some(member(2)));
        assert!(state.toggle_member(None));
        assert_eq!(state.member(), None);
        // An inactive filter is switched on even without a value
        let mut state = FilterState::default();
        assert!(state.toggle_member(None));
    }

    #[test]
    fn test_category_toggle() {
        let mut state = FilterState::default();
        assert!(state.toggle_category(Some(category(3))));
        assert!(state.toggle_category(Some(category(4))));
        assert!(!state.toggle_category(Some(category(4))));
        assert!(state.toggle_category(Some(category(4))));
        assert_eq!(state.category().map(|c| c.id), Some(4));
    }

    #[test]
    fn test_date_range_flag_follows_bounds() {
        let mut state = FilterState::default();
        let day = NaiveDate::from_ymd_opt(2024, 2, 1);

        assert!(!state.set_date_range(DateRange::default()));
        assert!(state.set_date_range(DateRange::new(day, None)));
        assert!(state.set_date_range(DateRange::new(day, None)));
        assert!(state.set_date_range(DateRange::new(None, day)));
        assert!(!state.set_date_range(DateRange::new(None, None)));
        assert!(!state.date_active());
    }

    #[test]
    fn test_to_filter_lowers_values() {
        let filter = QueryVariant::ByMemberCategoryAndDate {
            group_id: 1,
            member: Some(2),
            category: None,
            range: range(),
        }
        .to_filter();
        assert_eq!(filter.group_id, 1);
        assert_eq!(filter.member, Some(IdMatch::Id(2)));
        assert_eq!(filter.category, Some(IdMatch::Unassigned));
        assert_eq!(filter.date, Some(range()));

        let filter = QueryVariant::ByCategory {
            group_id: 1,
            category: Some(3),
        }
        .to_filter();
        assert_eq!(filter.member, None);
        assert_eq!(filter.category, Some(IdMatch::Id(3)));
        assert_eq!(filter.date, None);
    }
}
