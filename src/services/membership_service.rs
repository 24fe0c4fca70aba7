//! Group membership operations

use sqlx::PgPool;

use crate::db::repositories::{GroupRepository, UserRepository};
use crate::error::{AppError, AppResult};
use crate::models::{GroupMembership, sort_memberships};

pub struct MembershipService;

impl MembershipService {
    /// All of a user's memberships in the canonical resolution order
    /// (level descending, group id ascending)
    pub async fn groups_of(pool: &PgPool, user_id: i32) -> AppResult<Vec<GroupMembership>> {
        let mut memberships = GroupRepository::memberships_of_user(pool, user_id).await?;
        sort_memberships(&mut memberships);
        Ok(memberships)
    }

    /// The level a user holds in one group
    pub async fn level_of_user_in_group(
        pool: &PgPool,
        user_id: i32,
        group_id: i32,
    ) -> AppResult<i32> {
        let membership = GroupRepository::membership(pool, user_id, group_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {user_id} is not a member of group {group_id}"))
            })?;

        Ok(membership.level)
    }

    /// Add a user to a named group, or update their level if already a
    /// member
    pub async fn add_membership(
        pool: &PgPool,
        user_id: i32,
        group_name: &str,
        level: i32,
    ) -> AppResult<()> {
        if UserRepository::find_by_id(pool, user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {user_id} not found")));
        }
        let group = GroupRepository::find_by_name(pool, group_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {group_name} not found")))?;

        GroupRepository::upsert_membership(pool, user_id, group.id, level).await
    }

    /// Remove a user from a group
    pub async fn remove_membership(pool: &PgPool, user_id: i32, group_id: i32) -> AppResult<()> {
        let removed = GroupRepository::delete_membership(pool, user_id, group_id).await?;
        if !removed {
            return Err(AppError::NotFound(format!(
                "User {user_id} is not a member of group {group_id}"
            )));
        }

        Ok(())
    }
}
