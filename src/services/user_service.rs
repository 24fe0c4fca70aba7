//! User aggregate maintenance

use sqlx::PgPool;

use crate::db::lock::{LockManager, ResourceKey};
use crate::db::repositories::UserRepository;
use crate::error::{AppError, AppResult};

pub struct UserService;

impl UserService {
    /// Recompute a user's `ac_num`/`submit_num` counters from the
    /// submission log and write them back.
    ///
    /// Serialized per user so concurrent refreshes cannot interleave the
    /// read-aggregate-then-write sequence.
    pub async fn refresh_submit_info(
        pool: &PgPool,
        locks: &LockManager,
        user_id: i32,
    ) -> AppResult<(i32, i32)> {
        let guard = locks
            .acquire(pool, ResourceKey::UserSubmitInfo(user_id))
            .await?;
        let result = Self::refresh_locked(pool, user_id).await;
        guard.release().await?;
        result
    }

    async fn refresh_locked(pool: &PgPool, user_id: i32) -> AppResult<(i32, i32)> {
        if UserRepository::find_by_id(pool, user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {user_id} not found")));
        }

        let ac_num = UserRepository::count_accepted_problems(pool, user_id).await?;
        let submit_num = UserRepository::count_submissions(pool, user_id).await?;
        let ac_num = i32::try_from(ac_num).unwrap_or(i32::MAX);
        let submit_num = i32::try_from(submit_num).unwrap_or(i32::MAX);

        UserRepository::update_submit_info(pool, user_id, ac_num, submit_num).await?;
        Ok((ac_num, submit_num))
    }
}
