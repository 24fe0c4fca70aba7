//! Typed mutual exclusion over Postgres advisory locks
//!
//! Workers share no in-memory ranking state, so the two critical sections
//! (per-user aggregate refresh, per-contest ranklist rewrite) coordinate
//! through the backing store. Each logical resource maps to a distinct
//! 64-bit advisory-lock key; a lock is held on a dedicated pool connection
//! for the bounded read-modify-write window and released with the guard.

use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tokio::time::Instant;

use crate::constants::LOCK_POLL_INTERVAL_MS;
use crate::error::{AppError, AppResult};

/// A lockable logical resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// Serializes `ac_num`/`submit_num` refreshes for one user
    UserSubmitInfo(i32),
    /// Serializes ranklist read-modify-write for one contest (both slots)
    ContestRanklist(i32),
}

impl ResourceKey {
    /// Encode into the advisory-lock key space: operation tag in the high
    /// 32 bits, resource id in the low 32 bits
    pub fn advisory_key(self) -> i64 {
        let (tag, id) = match self {
            Self::UserSubmitInfo(id) => (1i64, id),
            Self::ContestRanklist(id) => (2i64, id),
        };
        (tag << 32) | i64::from(id as u32)
    }
}

/// Acquires scoped advisory locks with a bounded wait
#[derive(Debug, Clone)]
pub struct LockManager {
    timeout: Duration,
}

impl LockManager {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Acquire an exclusive lock on `key`, polling until the timeout.
    /// Timeout surfaces as the transient [`AppError::LockTimeout`].
    pub async fn acquire(&self, pool: &PgPool, key: ResourceKey) -> AppResult<LockGuard> {
        let advisory_key = key.advisory_key();
        let mut conn = pool.acquire().await?;
        let deadline = Instant::now() + self.timeout;

        loop {
            let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
                .bind(advisory_key)
                .fetch_one(&mut *conn)
                .await?;
            if acquired {
                return Ok(LockGuard {
                    conn: Some(conn),
                    advisory_key,
                });
            }
            if Instant::now() >= deadline {
                tracing::warn!(?key, "advisory lock acquisition timed out");
                return Err(AppError::LockTimeout(format!("{key:?}")));
            }
            tokio::time::sleep(Duration::from_millis(LOCK_POLL_INTERVAL_MS)).await;
        }
    }
}

/// Holds one advisory lock for its lifetime.
///
/// Prefer [`LockGuard::release`]; dropping the guard unlocks on a
/// background task instead.
pub struct LockGuard {
    conn: Option<PoolConnection<Postgres>>,
    advisory_key: i64,
}

impl LockGuard {
    /// Release the lock and return the connection to the pool
    pub async fn release(mut self) -> AppResult<()> {
        if let Some(mut conn) = self.conn.take() {
            sqlx::query("SELECT pg_advisory_unlock($1)")
                .bind(self.advisory_key)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            let advisory_key = self.advisory_key;
            tokio::spawn(async move {
                if let Err(error) = sqlx::query("SELECT pg_advisory_unlock($1)")
                    .bind(advisory_key)
                    .execute(&mut *conn)
                    .await
                {
                    tracing::error!(%error, advisory_key, "failed to release advisory lock");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisory_keys_are_distinct_per_operation() {
        let user = ResourceKey::UserSubmitInfo(5).advisory_key();
        let contest = ResourceKey::ContestRanklist(5).advisory_key();
        assert_ne!(user, contest);
    }

    #[test]
    fn test_advisory_keys_are_distinct_per_resource() {
        let a = ResourceKey::ContestRanklist(1).advisory_key();
        let b = ResourceKey::ContestRanklist(2).advisory_key();
        assert_ne!(a, b);
    }

    #[test]
    fn test_advisory_key_handles_negative_ids() {
        // ids are widened unsigned so the tag bits stay intact
        let key = ResourceKey::ContestRanklist(-7).advisory_key();
        assert_eq!(key >> 32, 2);
    }
}
