use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{Retrieve, User};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemberFilter {
    pub id: Option<u32>,
    pub group_id: Option<u32>,
    pub name: Option<String>,
    pub accepted: Option<bool>,
}

impl MemberFilter {
    /// Members of a group that accepted their invitation.
    pub fn accepted_in(group_id: u32) -> Self {
        Self {
            group_id: Some(group_id),
            accepted: Some(true),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub group_id: u32,
    pub name: String,
    pub user_id: Option<u32>,
    pub accepted: bool,
}

impl Member {
    /// Get the user account linked to this member, if any.
    pub async fn get_user<DB>(&self, db: &DB) -> Result<Option<User>>
    where
        DB: Retrieve<User, Key = u32>,
    {
        match self.user_id {
            Some(user_id) => Ok(Some(db.retrieve(user_id).await?)),
            None => Ok(None),
        }
    }
}
