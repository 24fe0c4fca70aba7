//! Problem model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Problem database model
///
/// Statement, testdata and judging configuration live with external
/// collaborators; the engine only needs identity, ownership and
/// visibility.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Problem {
    pub id: i32,
    pub title: String,
    /// Owning user; owners always manage their problem
    pub owner_id: i32,
    pub is_public: bool,
}
