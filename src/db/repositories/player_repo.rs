//! Contest player repository

use sqlx::PgPool;
use sqlx::types::Json;

use crate::{
    error::AppResult,
    models::{ContestPlayer, RanklistSlot},
};

pub struct PlayerRepository;

impl PlayerRepository {
    /// One user's standings row in one scoreboard slot
    pub async fn find_in_contest(
        pool: &PgPool,
        contest_id: i32,
        user_id: i32,
        slot: RanklistSlot,
    ) -> AppResult<Option<ContestPlayer>> {
        let player = sqlx::query_as::<_, ContestPlayer>(
            r#"
            SELECT * FROM contest_players
            WHERE contest_id = $1 AND user_id = $2 AND slot = $3
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(slot)
        .fetch_optional(pool)
        .await?;

        Ok(player)
    }

    /// Create the standings row if it does not exist yet and return it.
    ///
    /// Concurrent first visits race here; the unique key on
    /// (contest_id, user_id, slot) makes the insert a no-op for the
    /// loser, which then reads the winner's row.
    pub async fn find_or_create(
        pool: &PgPool,
        contest_id: i32,
        user_id: i32,
        slot: RanklistSlot,
    ) -> AppResult<ContestPlayer> {
        let inserted = sqlx::query_as::<_, ContestPlayer>(
            r#"
            INSERT INTO contest_players (contest_id, user_id, slot, score, score_details)
            VALUES ($1, $2, $3, 0, '{}')
            ON CONFLICT (contest_id, user_id, slot) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(slot)
        .fetch_optional(pool)
        .await?;

        if let Some(player) = inserted {
            return Ok(player);
        }

        let player = sqlx::query_as::<_, ContestPlayer>(
            r#"
            SELECT * FROM contest_players
            WHERE contest_id = $1 AND user_id = $2 AND slot = $3
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(slot)
        .fetch_one(pool)
        .await?;

        Ok(player)
    }

    /// All standings rows of one scoreboard slot
    pub async fn players_of_slot(
        pool: &PgPool,
        contest_id: i32,
        slot: RanklistSlot,
    ) -> AppResult<Vec<ContestPlayer>> {
        let players = sqlx::query_as::<_, ContestPlayer>(
            r#"SELECT * FROM contest_players WHERE contest_id = $1 AND slot = $2"#,
        )
        .bind(contest_id)
        .bind(slot)
        .fetch_all(pool)
        .await?;

        Ok(players)
    }

    /// Fetch players by row id, preserving the caller's order
    pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> AppResult<Vec<ContestPlayer>> {
        let mut players =
            sqlx::query_as::<_, ContestPlayer>(r#"SELECT * FROM contest_players WHERE id = ANY($1)"#)
                .bind(ids)
                .fetch_all(pool)
                .await?;

        players.sort_by_key(|p| ids.iter().position(|&id| id == p.id).unwrap_or(usize::MAX));
        Ok(players)
    }

    /// Write back a recomputed score and detail map
    pub async fn save_score(pool: &PgPool, player: &ContestPlayer) -> AppResult<()> {
        sqlx::query(r#"UPDATE contest_players SET score = $2, score_details = $3 WHERE id = $1"#)
            .bind(player.id)
            .bind(player.score)
            .bind(Json(&player.score_details))
            .execute(pool)
            .await?;

        Ok(())
    }
}
