use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GroupFilter {
    pub id: Option<u32>,
    pub name: Option<String>,
}

/// A user account. Members may be linked to one.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub fullname: String,
    pub photo_url: String,
}
