//! User repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{User, UserPrivilege},
};

/// Repository for user database operations
pub struct UserRepository;

impl UserRepository {
    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(pool: &PgPool, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE username = $1"#)
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Check a named global privilege grant
    pub async fn has_privilege_grant(
        pool: &PgPool,
        user_id: i32,
        privilege: &str,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_privileges
                WHERE user_id = $1 AND privilege = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(privilege)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// List a user's privilege grants
    pub async fn privileges_of(pool: &PgPool, user_id: i32) -> AppResult<Vec<UserPrivilege>> {
        let privileges = sqlx::query_as::<_, UserPrivilege>(
            r#"SELECT * FROM user_privileges WHERE user_id = $1 ORDER BY privilege"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(privileges)
    }

    /// Distinct accepted problems over non-contest submissions
    pub async fn count_accepted_problems(pool: &PgPool, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT problem_id) FROM judge_states
            WHERE user_id = $1 AND status = 'Accepted' AND kind <> 1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Non-contest submissions of a user
    pub async fn count_submissions(pool: &PgPool, user_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM judge_states WHERE user_id = $1 AND kind <> 1"#)
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Write back the refreshed aggregate counters
    pub async fn update_submit_info(
        pool: &PgPool,
        user_id: i32,
        ac_num: i32,
        submit_num: i32,
    ) -> AppResult<()> {
        sqlx::query(r#"UPDATE users SET ac_num = $2, submit_num = $3 WHERE id = $1"#)
            .bind(user_id)
            .bind(ac_num)
            .bind(submit_num)
            .execute(pool)
            .await?;

        Ok(())
    }
}
