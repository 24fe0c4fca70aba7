//! User model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
    /// Distinct accepted problems, non-contest submissions only
    pub ac_num: i32,
    /// Non-contest submissions
    pub submit_num: i32,
}

/// A named global privilege grant, independent of group membership
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserPrivilege {
    pub user_id: i32,
    pub privilege: String,
}
