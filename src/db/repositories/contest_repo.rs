//! Contest repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{error::AppResult, models::Contest};

pub struct ContestRepository;

impl ContestRepository {
    /// Insert a contest and its pre-created scoreboard slot references
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        title: &str,
        contest_type: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        problems: &[i32],
        owner_id: i32,
        primary_ranklist_id: i32,
        restricted_ranklist_id: i32,
    ) -> AppResult<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            INSERT INTO contests
                (title, contest_type, start_time, end_time, problems, admins,
                 is_public, hide_statistics, read_rating, owner_id,
                 primary_ranklist_id, restricted_ranklist_id)
            VALUES ($1, $2, $3, $4, $5, '{}', false, false, false, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(contest_type)
        .bind(start_time)
        .bind(end_time)
        .bind(problems)
        .bind(owner_id)
        .bind(primary_ranklist_id)
        .bind(restricted_ranklist_id)
        .fetch_one(pool)
        .await?;

        Ok(contest)
    }

    /// Find contest by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(contest)
    }

    /// Update the mutable contest fields. The scoring regime and the
    /// scoreboard slot references never change after creation.
    pub async fn update(pool: &PgPool, contest: &Contest) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE contests SET
                title = $2, start_time = $3, end_time = $4, problems = $5,
                admins = $6, is_public = $7, hide_statistics = $8, read_rating = $9
            WHERE id = $1
            "#,
        )
        .bind(contest.id)
        .bind(&contest.title)
        .bind(contest.start_time)
        .bind(contest.end_time)
        .bind(&contest.problems)
        .bind(&contest.admins)
        .bind(contest.is_public)
        .bind(contest.hide_statistics)
        .bind(contest.read_rating)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Count contests the viewer may see.
    ///
    /// A contest is visible when it is public and either carries no group
    /// restriction or shares a group with the viewer. Supervisors bypass
    /// the filter with `privileged`.
    pub async fn count_visible(
        pool: &PgPool,
        privileged: bool,
        viewer_group_ids: &[i32],
    ) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM contests WHERE {VISIBILITY_CLAUSE}"
        ))
        .bind(privileged)
        .bind(viewer_group_ids)
        .fetch_one(pool)
        .await?;

        Ok(total)
    }

    /// One page of visible contests, newest start first
    pub async fn list_visible(
        pool: &PgPool,
        privileged: bool,
        viewer_group_ids: &[i32],
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Contest>> {
        let contests = sqlx::query_as::<_, Contest>(&format!(
            r#"
            SELECT * FROM contests WHERE {VISIBILITY_CLAUSE}
            ORDER BY start_time DESC, id DESC
            OFFSET $3 LIMIT $4
            "#
        ))
        .bind(privileged)
        .bind(viewer_group_ids)
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(contests)
    }
}

const VISIBILITY_CLAUSE: &str = r#"
    (
        $1
        OR (
            is_public
            AND (
                NOT EXISTS (
                    SELECT 1 FROM contest_group_map m WHERE m.contest_id = contests.id
                )
                OR EXISTS (
                    SELECT 1 FROM contest_group_map m
                    WHERE m.contest_id = contests.id AND m.group_id = ANY($2)
                )
            )
        )
    )
"#;
