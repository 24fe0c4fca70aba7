//! Submission repository

use sqlx::PgPool;

use crate::{error::AppResult, models::JudgeState};

pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Find submission by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<JudgeState>> {
        let judge = sqlx::query_as::<_, JudgeState>(r#"SELECT * FROM judge_states WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(judge)
    }

    /// A user's full in-contest submission history for one problem, in
    /// submission order. Scoring replays this stream.
    pub async fn contest_history(
        pool: &PgPool,
        contest_id: i32,
        user_id: i32,
        problem_id: i32,
    ) -> AppResult<Vec<JudgeState>> {
        let history = sqlx::query_as::<_, JudgeState>(
            r#"
            SELECT * FROM judge_states
            WHERE kind = 1 AND contest_id = $1 AND user_id = $2 AND problem_id = $3
            ORDER BY id ASC
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(problem_id)
        .fetch_all(pool)
        .await?;

        Ok(history)
    }

    /// Accepted and total counts per problem over one contest's
    /// submissions, keyed by problem id
    pub async fn contest_problem_counts(
        pool: &PgPool,
        contest_id: i32,
    ) -> AppResult<Vec<(i32, i64, i64)>> {
        let rows: Vec<(i32, i64, i64)> = sqlx::query_as(
            r#"
            SELECT problem_id,
                   COUNT(*) FILTER (WHERE status = 'Accepted'),
                   COUNT(*)
            FROM judge_states
            WHERE kind = 1 AND contest_id = $1
            GROUP BY problem_id
            "#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}
