//! Group and membership repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Group, GroupMembership},
};

/// Repository for groups, memberships and group restriction maps
pub struct GroupRepository;

impl GroupRepository {
    /// Find group by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(r#"SELECT * FROM groups WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(group)
    }

    /// Find group by name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(r#"SELECT * FROM groups WHERE name = $1"#)
            .bind(name)
            .fetch_optional(pool)
            .await?;

        Ok(group)
    }

    /// All memberships of a user, in no particular order. Callers that
    /// resolve levels put them in canonical order first
    /// ([`crate::models::sort_memberships`]).
    pub async fn memberships_of_user(pool: &PgPool, user_id: i32) -> AppResult<Vec<GroupMembership>> {
        let memberships = sqlx::query_as::<_, GroupMembership>(
            r#"SELECT * FROM user_group_map WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// One user's membership in one group
    pub async fn membership(
        pool: &PgPool,
        user_id: i32,
        group_id: i32,
    ) -> AppResult<Option<GroupMembership>> {
        let membership = sqlx::query_as::<_, GroupMembership>(
            r#"SELECT * FROM user_group_map WHERE user_id = $1 AND group_id = $2"#,
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Insert or overwrite a user's level in a group
    pub async fn upsert_membership(
        pool: &PgPool,
        user_id: i32,
        group_id: i32,
        level: i32,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_group_map (user_id, group_id, level)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, group_id) DO UPDATE SET level = EXCLUDED.level
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .bind(level)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Remove a user from a group, returning whether a row was deleted
    pub async fn delete_membership(pool: &PgPool, user_id: i32, group_id: i32) -> AppResult<bool> {
        let result =
            sqlx::query(r#"DELETE FROM user_group_map WHERE user_id = $1 AND group_id = $2"#)
                .bind(user_id)
                .bind(group_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Group ids restricting a contest. Empty means unrestricted.
    pub async fn contest_group_ids(pool: &PgPool, contest_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            r#"SELECT group_id FROM contest_group_map WHERE contest_id = $1 ORDER BY group_id"#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Group ids restricting a problem. Empty means unrestricted.
    pub async fn problem_group_ids(pool: &PgPool, problem_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            r#"SELECT group_id FROM problem_group_map WHERE problem_id = $1 ORDER BY group_id"#,
        )
        .bind(problem_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Attach a group restriction to a contest (idempotent)
    pub async fn attach_contest_group(pool: &PgPool, contest_id: i32, group_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contest_group_map (contest_id, group_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(contest_id)
        .bind(group_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Detach a group restriction from a contest
    pub async fn detach_contest_group(
        pool: &PgPool,
        contest_id: i32,
        group_id: i32,
    ) -> AppResult<bool> {
        let result =
            sqlx::query(r#"DELETE FROM contest_group_map WHERE contest_id = $1 AND group_id = $2"#)
                .bind(contest_id)
                .bind(group_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach a group restriction to a problem (idempotent)
    pub async fn attach_problem_group(pool: &PgPool, problem_id: i32, group_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO problem_group_map (problem_id, group_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(problem_id)
        .bind(group_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Detach a group restriction from a problem
    pub async fn detach_problem_group(
        pool: &PgPool,
        problem_id: i32,
        group_id: i32,
    ) -> AppResult<bool> {
        let result =
            sqlx::query(r#"DELETE FROM problem_group_map WHERE problem_id = $1 AND group_id = $2"#)
                .bind(problem_id)
                .bind(group_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
