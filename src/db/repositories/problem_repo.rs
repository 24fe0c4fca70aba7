//! Problem repository

use sqlx::PgPool;

use crate::{error::AppResult, models::Problem};

pub struct ProblemRepository;

impl ProblemRepository {
    /// Find problem by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> AppResult<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(r#"SELECT * FROM problems WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(problem)
    }

    /// Find several problems, preserving the caller's id order
    pub async fn find_by_ids(pool: &PgPool, ids: &[i32]) -> AppResult<Vec<Problem>> {
        let mut problems = sqlx::query_as::<_, Problem>(r#"SELECT * FROM problems WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        problems.sort_by_key(|p| ids.iter().position(|&id| id == p.id).unwrap_or(usize::MAX));
        Ok(problems)
    }
}
