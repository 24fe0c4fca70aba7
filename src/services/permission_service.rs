//! Visibility and management permission resolution
//!
//! Every check defaults to deny: absence of a matching rule is
//! not-allowed, and `deny_on_error` turns resolution failures into
//! denials instead of implicit grants.

use sqlx::PgPool;

use crate::constants::{LEVEL_DEFAULT, LEVEL_MANAGE, LEVEL_NONE, privileges};
use crate::db::repositories::{GroupRepository, UserRepository};
use crate::error::AppResult;
use crate::models::{Contest, ContestStatus, GroupMembership, Problem, User, sort_memberships};

/// Effective level a membership list grants over a restriction set.
///
/// Memberships must already be in the canonical order (level descending,
/// group id ascending); the first membership whose group is in the
/// restriction set wins. An empty restriction set grants everyone the
/// default level.
pub fn resolve_level(memberships: &[GroupMembership], restricting: &[i32]) -> i32 {
    if restricting.is_empty() {
        return LEVEL_DEFAULT;
    }
    memberships
        .iter()
        .find(|m| restricting.contains(&m.group_id))
        .map_or(LEVEL_NONE, |m| m.level)
}

/// Collapse a failed permission resolution into a denial
pub fn deny_on_error(check: &str, result: AppResult<bool>) -> bool {
    match result {
        Ok(allowed) => allowed,
        Err(error) => {
            tracing::warn!(%error, check, "permission resolution failed, denying");
            false
        }
    }
}

pub struct PermissionResolver;

impl PermissionResolver {
    /// Whether the user holds a named global privilege. Admins hold every
    /// privilege implicitly.
    pub async fn has_privilege(pool: &PgPool, user: &User, privilege: &str) -> AppResult<bool> {
        if user.is_admin {
            return Ok(true);
        }
        UserRepository::has_privilege_grant(pool, user.id, privilege).await
    }

    /// Highest trust level the user's groups grant over a problem's
    /// restriction set.
    ///
    /// A global manage privilege short-circuits to the manage level. A
    /// problem with no restricting groups is open to everyone at the
    /// default level; otherwise a user in none of the restricting groups
    /// gets the no-access level.
    pub async fn max_level_in_problem(
        pool: &PgPool,
        user: &User,
        problem_id: i32,
    ) -> AppResult<i32> {
        if Self::has_privilege(pool, user, privileges::MANAGE_PROBLEM).await? {
            return Ok(LEVEL_MANAGE);
        }

        let restricting = GroupRepository::problem_group_ids(pool, problem_id).await?;
        if restricting.is_empty() {
            return Ok(LEVEL_DEFAULT);
        }

        let mut memberships = GroupRepository::memberships_of_user(pool, user.id).await?;
        sort_memberships(&mut memberships);
        Ok(resolve_level(&memberships, &restricting))
    }

    /// Whether the user may interact with a contest at all: the manage
    /// privilege, an unrestricted contest, or a shared restricting group
    pub async fn has_contest_permission(
        pool: &PgPool,
        user: &User,
        contest: &Contest,
    ) -> AppResult<bool> {
        if Self::has_privilege(pool, user, privileges::MANAGE_PROBLEM).await? {
            return Ok(true);
        }

        let restricting = GroupRepository::contest_group_ids(pool, contest.id).await?;
        if restricting.is_empty() {
            return Ok(true);
        }

        let memberships = GroupRepository::memberships_of_user(pool, user.id).await?;
        Ok(memberships.iter().any(|m| restricting.contains(&m.group_id)))
    }

    /// Whether the user may manage a contest: the manage privilege, the
    /// owner or a listed admin, or a manage-level group membership
    pub async fn is_allowed_manage_contest(
        pool: &PgPool,
        user: &User,
        contest: &Contest,
    ) -> AppResult<bool> {
        if Self::has_privilege(pool, user, privileges::MANAGE_PROBLEM).await? {
            return Ok(true);
        }
        if contest.has_admin(user.id) {
            return Ok(true);
        }

        let restricting = GroupRepository::contest_group_ids(pool, contest.id).await?;
        if restricting.is_empty() {
            return Ok(false);
        }
        let mut memberships = GroupRepository::memberships_of_user(pool, user.id).await?;
        sort_memberships(&mut memberships);
        Ok(resolve_level(&memberships, &restricting) >= LEVEL_MANAGE)
    }

    /// Whether the user may view a contest. Managers always view; others
    /// need a public contest they hold group permission on, and an
    /// upcoming contest is invisible to non-managers.
    pub async fn is_allowed_view_contest(
        pool: &PgPool,
        user: &User,
        contest: &Contest,
    ) -> AppResult<bool> {
        if Self::is_allowed_manage_contest(pool, user, contest).await? {
            return Ok(true);
        }
        if !contest.is_public || contest.status() == ContestStatus::Upcoming {
            return Ok(false);
        }
        Self::has_contest_permission(pool, user, contest).await
    }

    /// Whether the user may manage a problem: the manage privilege, the
    /// owner, or a manage-level group membership
    pub async fn is_allowed_manage_problem(
        pool: &PgPool,
        user: &User,
        problem: &Problem,
    ) -> AppResult<bool> {
        if problem.owner_id == user.id {
            return Ok(true);
        }
        Ok(Self::max_level_in_problem(pool, user, problem.id).await? >= LEVEL_MANAGE)
    }

    /// Whether the user may view a problem: manage rights always view,
    /// otherwise the problem must be public and group-accessible
    pub async fn is_allowed_view_problem(
        pool: &PgPool,
        user: &User,
        problem: &Problem,
    ) -> AppResult<bool> {
        if problem.owner_id == user.id {
            return Ok(true);
        }
        let level = Self::max_level_in_problem(pool, user, problem.id).await?;
        if level >= LEVEL_MANAGE {
            return Ok(true);
        }
        Ok(problem.is_public && level >= LEVEL_DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn membership(group_id: i32, level: i32) -> GroupMembership {
        GroupMembership {
            user_id: 1,
            group_id,
            level,
        }
    }

    #[test]
    fn test_unrestricted_target_is_open_at_default_level() {
        assert_eq!(resolve_level(&[membership(5, 2)], &[]), LEVEL_DEFAULT);
        assert_eq!(resolve_level(&[], &[]), LEVEL_DEFAULT);
    }

    #[test]
    fn test_no_shared_group_means_no_access() {
        // member of group B only, target restricted to group A
        let memberships = vec![membership(2, 1)];
        assert_eq!(resolve_level(&memberships, &[1]), LEVEL_NONE);
    }

    #[test]
    fn test_joining_a_restricting_group_grants_its_level() {
        let memberships = vec![membership(2, 3), membership(1, 1)];
        assert_eq!(resolve_level(&memberships, &[1]), 1);
    }

    #[test]
    fn test_first_match_in_canonical_order_wins() {
        // both groups restrict the target; the higher-level membership
        // comes first in canonical order and determines the result
        let memberships = vec![membership(9, 2), membership(3, 1)];
        assert_eq!(resolve_level(&memberships, &[3, 9]), 2);
    }

    #[test]
    fn test_deny_on_error_is_fail_closed() {
        assert!(deny_on_error("view", Ok(true)));
        assert!(!deny_on_error("view", Ok(false)));
        assert!(!deny_on_error(
            "view",
            Err(AppError::Database("connection reset".into()))
        ));
    }
}
