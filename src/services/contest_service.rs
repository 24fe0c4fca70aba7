//! Contest lifecycle and access orchestration

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::constants::privileges;
use crate::db::lock::LockManager;
use crate::db::repositories::{
    ContestRepository, GroupRepository, ProblemRepository, RanklistRepository,
    SubmissionRepository,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    Contest, ContestStatus, ContestType, Problem, RankingParams, RanklistSlot, User,
};
use crate::pagination::Paginate;
use crate::services::permission_service::PermissionResolver;
use crate::services::ranking_service::RankingEngine;

/// Per-problem submission counters for a contest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemStat {
    pub problem_id: i32,
    pub accepted: i64,
    pub submitted: i64,
}

pub struct ContestService;

impl ContestService {
    /// Create a contest together with its two empty scoreboard slots.
    /// The scoring regime is validated here and immutable afterwards.
    pub async fn create(
        pool: &PgPool,
        title: &str,
        contest_type: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        problems: &[i32],
        owner_id: i32,
    ) -> AppResult<Contest> {
        ContestType::parse(contest_type)?;
        if end_time <= start_time {
            return Err(AppError::InvalidInput(
                "Contest must end after it starts".to_string(),
            ));
        }

        let primary = RanklistRepository::create_empty(pool).await?;
        let restricted = RanklistRepository::create_empty(pool).await?;

        ContestRepository::create(
            pool,
            title,
            contest_type,
            start_time,
            end_time,
            problems,
            owner_id,
            primary.id,
            restricted.id,
        )
        .await
    }

    pub async fn find(pool: &PgPool, id: i32) -> AppResult<Contest> {
        ContestRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contest {id} not found")))
    }

    /// The contest's problems, in contest order
    pub async fn problems(pool: &PgPool, contest: &Contest) -> AppResult<Vec<Problem>> {
        ProblemRepository::find_by_ids(pool, &contest.problems).await
    }

    /// Save edits to a contest's mutable fields. The scoring regime is
    /// immutable after creation.
    pub async fn update(pool: &PgPool, caller: &User, contest: &Contest) -> AppResult<()> {
        if !PermissionResolver::is_allowed_manage_contest(pool, caller, contest).await? {
            return Err(AppError::PermissionDenied(
                "Only contest managers may edit a contest".to_string(),
            ));
        }
        let stored = Self::find(pool, contest.id).await?;
        if stored.contest_type != contest.contest_type {
            return Err(AppError::InvalidInput(
                "Contest type cannot change after creation".to_string(),
            ));
        }
        if contest.end_time <= contest.start_time {
            return Err(AppError::InvalidInput(
                "Contest must end after it starts".to_string(),
            ));
        }

        ContestRepository::update(pool, contest).await
    }

    /// Replace one scoreboard slot's score multipliers.
    ///
    /// A malformed multiplier map resets the slot to defaults instead of
    /// failing the whole update.
    pub async fn update_ranking_params(
        pool: &PgPool,
        locks: &LockManager,
        caller: &User,
        contest: &Contest,
        slot: RanklistSlot,
        raw: &serde_json::Value,
    ) -> AppResult<()> {
        if !PermissionResolver::is_allowed_manage_contest(pool, caller, contest).await? {
            return Err(AppError::PermissionDenied(
                "Only contest managers may change ranking parameters".to_string(),
            ));
        }

        let params: RankingParams = match serde_json::from_value(raw.clone()) {
            Ok(params) => params,
            Err(error) => {
                tracing::warn!(%error, contest_id = contest.id, "malformed ranking params, resetting to defaults");
                RankingParams::default()
            }
        };

        RankingEngine::set_ranking_params(pool, locks, contest, slot, params).await
    }

    /// Attach a group restriction to a contest
    pub async fn attach_group(
        pool: &PgPool,
        caller: &User,
        contest: &Contest,
        group_id: i32,
    ) -> AppResult<()> {
        if !PermissionResolver::is_allowed_manage_contest(pool, caller, contest).await? {
            return Err(AppError::PermissionDenied(
                "Only contest managers may change group restrictions".to_string(),
            ));
        }
        if GroupRepository::find_by_id(pool, group_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Group {group_id} not found")));
        }

        GroupRepository::attach_contest_group(pool, contest.id, group_id).await
    }

    /// Detach a group restriction from a contest
    pub async fn detach_group(
        pool: &PgPool,
        caller: &User,
        contest: &Contest,
        group_id: i32,
    ) -> AppResult<()> {
        if !PermissionResolver::is_allowed_manage_contest(pool, caller, contest).await? {
            return Err(AppError::PermissionDenied(
                "Only contest managers may change group restrictions".to_string(),
            ));
        }

        let detached = GroupRepository::detach_contest_group(pool, contest.id, group_id).await?;
        if !detached {
            return Err(AppError::NotFound(format!(
                "Group {group_id} does not restrict contest {}",
                contest.id
            )));
        }

        Ok(())
    }

    /// Record a participant's visit to a contest problem and resolve the
    /// global problem id.
    ///
    /// An upcoming contest is closed to non-supervisors. While the
    /// contest runs, `read_rating` contests create the visitor's
    /// standings row on first visit.
    pub async fn visit_problem(
        pool: &PgPool,
        locks: &LockManager,
        caller: &User,
        contest: &Contest,
        problem_number: usize,
    ) -> AppResult<i32> {
        let problem_id = contest.problem_at(problem_number).ok_or_else(|| {
            AppError::NotFound(format!(
                "Contest {} has no problem {problem_number}",
                contest.id
            ))
        })?;

        let supervisor =
            PermissionResolver::is_allowed_manage_contest(pool, caller, contest).await?;
        if contest.status() == ContestStatus::Upcoming && !supervisor {
            return Err(AppError::PermissionDenied(
                "Contest has not started yet".to_string(),
            ));
        }

        if contest.is_running() && contest.read_rating && !supervisor {
            RankingEngine::ensure_player(pool, locks, contest, caller.id).await?;
        }

        Ok(problem_id)
    }

    /// One page of contests visible to the viewer, newest first
    pub async fn list_visible(
        pool: &PgPool,
        viewer: Option<&User>,
        page: Option<i64>,
        per_page: i64,
    ) -> AppResult<(Vec<Contest>, Paginate)> {
        let (privileged, group_ids) = match viewer {
            Some(user) => {
                let privileged =
                    PermissionResolver::has_privilege(pool, user, privileges::MANAGE_PROBLEM)
                        .await?;
                let group_ids = GroupRepository::memberships_of_user(pool, user.id)
                    .await?
                    .into_iter()
                    .map(|m| m.group_id)
                    .collect();
                (privileged, group_ids)
            }
            None => (false, Vec::new()),
        };

        let total = ContestRepository::count_visible(pool, privileged, &group_ids).await?;
        let paginate = Paginate::new(total, page, per_page);
        let contests = ContestRepository::list_visible(
            pool,
            privileged,
            &group_ids,
            paginate.offset(),
            paginate.per_page,
        )
        .await?;

        Ok((contests, paginate))
    }

    /// Per-problem accepted/submitted counters, in contest problem order.
    ///
    /// Hidden from non-supervisors while the contest runs if the contest
    /// asked for it.
    pub async fn problem_statistics(
        pool: &PgPool,
        caller: &User,
        contest: &Contest,
    ) -> AppResult<Vec<ProblemStat>> {
        let supervisor =
            PermissionResolver::is_allowed_manage_contest(pool, caller, contest).await?;
        if contest.hide_statistics && !contest.is_ended() && !supervisor {
            return Err(AppError::PermissionDenied(
                "Statistics are hidden until the contest ends".to_string(),
            ));
        }

        let counts = SubmissionRepository::contest_problem_counts(pool, contest.id).await?;
        let stats = contest
            .problems
            .iter()
            .map(|&problem_id| {
                let (accepted, submitted) = counts
                    .iter()
                    .find(|(id, _, _)| *id == problem_id)
                    .map_or((0, 0), |&(_, accepted, submitted)| (accepted, submitted));
                ProblemStat {
                    problem_id,
                    accepted,
                    submitted,
                }
            })
            .collect();

        Ok(stats)
    }
}
