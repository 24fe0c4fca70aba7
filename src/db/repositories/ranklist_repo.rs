//! Ranklist repository

use sqlx::PgPool;
use sqlx::types::Json;

use crate::{error::AppResult, models::ContestRanklist};

pub struct RanklistRepository;

impl RanklistRepository {
    /// Create an empty ranklist (no weights, no ranked players)
    pub async fn create_empty(pool: &PgPool) -> AppResult<ContestRanklist> {
        let ranklist = sqlx::query_as::<_, ContestRanklist>(
            r#"
            INSERT INTO contest_ranklists (ranking_params, ranking)
            VALUES ('{}', '{"player_num": 0, "entries": {}}')
            RETURNING *
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(ranklist)
    }

    /// Find ranklist by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> AppResult<Option<ContestRanklist>> {
        let ranklist =
            sqlx::query_as::<_, ContestRanklist>(r#"SELECT * FROM contest_ranklists WHERE id = $1"#)
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(ranklist)
    }

    /// Persist the current weights and standings
    pub async fn save(pool: &PgPool, ranklist: &ContestRanklist) -> AppResult<()> {
        sqlx::query(
            r#"UPDATE contest_ranklists SET ranking_params = $2, ranking = $3 WHERE id = $1"#,
        )
        .bind(ranklist.id)
        .bind(Json(&ranklist.ranking_params))
        .bind(Json(&ranklist.ranking))
        .execute(pool)
        .await?;

        Ok(())
    }
}
