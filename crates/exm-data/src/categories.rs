use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub id: Option<u32>,
    pub group_id: Option<u32>,
}

/// An expense category. `color` is a colour specifier
/// such as `#FF0000`.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub group_id: u32,
    pub name: String,
    pub color: String,
}
