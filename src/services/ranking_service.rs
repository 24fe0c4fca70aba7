//! Ranking engine: player creation and standings maintenance
//!
//! All mutation of a contest's two ranklists goes through this engine,
//! serialized per contest by an advisory lock. Standings reads are
//! lock-free against the latest committed state.

use sqlx::PgPool;

use crate::db::lock::{LockManager, ResourceKey};
use crate::db::repositories::{
    ContestRepository, PlayerRepository, RanklistRepository, SubmissionRepository,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    Contest, ContestPlayer, ContestRanklist, ContestType, JudgeState, RankingParams, RanklistSlot,
    ScoreDetail, SubmissionKind,
};

const SLOTS: [RanklistSlot; 2] = [RanklistSlot::Primary, RanklistSlot::Restricted];

pub struct RankingEngine;

impl RankingEngine {
    /// Make the absent→present transition for a (contest, user) pair in
    /// both scoreboard slots and return the primary-slot player.
    ///
    /// Idempotent: concurrent duplicate triggers yield one player row and
    /// one rank slot per scoreboard.
    pub async fn ensure_player(
        pool: &PgPool,
        locks: &LockManager,
        contest: &Contest,
        user_id: i32,
    ) -> AppResult<ContestPlayer> {
        let guard = locks
            .acquire(pool, ResourceKey::ContestRanklist(contest.id))
            .await?;
        let result = Self::ensure_player_locked(pool, contest, user_id).await;
        guard.release().await?;
        result
    }

    async fn ensure_player_locked(
        pool: &PgPool,
        contest: &Contest,
        user_id: i32,
    ) -> AppResult<ContestPlayer> {
        let primary = Self::ensure_slot(pool, contest, user_id, RanklistSlot::Primary).await?;
        Self::ensure_slot(pool, contest, user_id, RanklistSlot::Restricted).await?;
        Ok(primary)
    }

    async fn ensure_slot(
        pool: &PgPool,
        contest: &Contest,
        user_id: i32,
        slot: RanklistSlot,
    ) -> AppResult<ContestPlayer> {
        let player = PlayerRepository::find_or_create(pool, contest.id, user_id, slot).await?;
        let mut ranklist = Self::load_ranklist(pool, contest.ranklist_id(slot)).await?;
        if !ranklist.ranking.contains(player.id) {
            ranklist.ranking.insert_player(player.id);
            RanklistRepository::save(pool, &ranklist).await?;
        }
        Ok(player)
    }

    /// Fold a judged submission into its contest's standings, loading
    /// the submission and contest by the id the judging collaborator
    /// reports. Non-contest submissions are a no-op.
    pub async fn apply_judge_result_by_id(
        pool: &PgPool,
        locks: &LockManager,
        judge_id: i64,
    ) -> AppResult<()> {
        let judge = SubmissionRepository::find_by_id(pool, judge_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {judge_id} not found")))?;
        if judge.kind != SubmissionKind::Contest {
            return Ok(());
        }
        let Some(contest_id) = judge.contest_id else {
            return Ok(());
        };
        let contest = ContestRepository::find_by_id(pool, contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contest {contest_id} not found")))?;

        Self::apply_judge_result(pool, locks, &contest, &judge).await
    }

    /// Fold one judged (or re-judged) submission into the standings.
    ///
    /// The per-problem record is recomputed from the player's full
    /// submission history for that problem, so applying the same result
    /// twice changes nothing.
    pub async fn apply_judge_result(
        pool: &PgPool,
        locks: &LockManager,
        contest: &Contest,
        judge: &JudgeState,
    ) -> AppResult<()> {
        if !judge.belongs_to_contest(contest.id) {
            return Err(AppError::InvalidInput(format!(
                "Submission {} does not belong to contest {}",
                judge.id, contest.id
            )));
        }
        if !contest.has_problem(judge.problem_id) {
            return Err(AppError::InvalidInput(format!(
                "Problem {} is not in contest {}",
                judge.problem_id, contest.id
            )));
        }
        let contest_type = contest.contest_type()?;

        let guard = locks
            .acquire(pool, ResourceKey::ContestRanklist(contest.id))
            .await?;
        let result = Self::apply_locked(pool, contest, contest_type, judge).await;
        guard.release().await?;
        result
    }

    async fn apply_locked(
        pool: &PgPool,
        contest: &Contest,
        contest_type: ContestType,
        judge: &JudgeState,
    ) -> AppResult<()> {
        let history =
            SubmissionRepository::contest_history(pool, contest.id, judge.user_id, judge.problem_id)
                .await?;
        let detail = ScoreDetail::from_history(contest_type, &history);

        for slot in SLOTS {
            let mut player =
                PlayerRepository::find_or_create(pool, contest.id, judge.user_id, slot).await?;
            match &detail {
                Some(detail) => player.set_detail(judge.problem_id, detail.clone()),
                None => {
                    player.score_details.remove(&judge.problem_id);
                }
            }
            // persist the new detail before the resort reloads all rows
            PlayerRepository::save_score(pool, &player).await?;

            let mut ranklist = Self::load_ranklist(pool, contest.ranklist_id(slot)).await?;
            if !ranklist.ranking.contains(player.id) {
                ranklist.ranking.insert_player(player.id);
            }
            Self::resort_and_save(pool, contest, contest_type, slot, &mut ranklist).await?;
        }

        Ok(())
    }

    /// Replace one slot's score multipliers and re-rank it
    pub async fn set_ranking_params(
        pool: &PgPool,
        locks: &LockManager,
        contest: &Contest,
        slot: RanklistSlot,
        params: RankingParams,
    ) -> AppResult<()> {
        let contest_type = contest.contest_type()?;
        let guard = locks
            .acquire(pool, ResourceKey::ContestRanklist(contest.id))
            .await?;
        let result = async {
            let mut ranklist = Self::load_ranklist(pool, contest.ranklist_id(slot)).await?;
            ranklist.ranking_params = params;
            Self::resort_and_save(pool, contest, contest_type, slot, &mut ranklist).await
        }
        .await;
        guard.release().await?;
        result
    }

    /// One slot's standings in rank order, with weighted aggregates
    /// freshly recomputed before serving
    pub async fn standings(
        pool: &PgPool,
        contest: &Contest,
        slot: RanklistSlot,
    ) -> AppResult<Vec<ContestPlayer>> {
        let contest_type = contest.contest_type()?;
        let ranklist = Self::load_ranklist(pool, contest.ranklist_id(slot)).await?;
        let ids = ranklist.ranking.players_in_order();
        let mut players = PlayerRepository::find_by_ids(pool, &ids).await?;

        if matches!(contest_type, ContestType::Ioi | ContestType::Noi) {
            for player in &mut players {
                ranklist.apply_weights(player);
            }
        }

        Ok(players)
    }

    /// One slot's standings as served to a viewer. Supervisors always
    /// get them; participants only once the contest exposes its
    /// ranklist.
    pub async fn standings_for(
        pool: &PgPool,
        contest: &Contest,
        slot: RanklistSlot,
        supervisor: bool,
    ) -> AppResult<Vec<ContestPlayer>> {
        if !supervisor && !contest.ranklist_visible_to_participants()? {
            return Err(AppError::PermissionDenied(
                "The ranklist of this contest is not visible yet".to_string(),
            ));
        }
        Self::standings(pool, contest, slot).await
    }

    /// One user's standings row in a slot, weighted the same way the
    /// full standings are. `None` when the user never entered.
    pub async fn player_standing(
        pool: &PgPool,
        contest: &Contest,
        user_id: i32,
        slot: RanklistSlot,
    ) -> AppResult<Option<ContestPlayer>> {
        let contest_type = contest.contest_type()?;
        let Some(mut player) =
            PlayerRepository::find_in_contest(pool, contest.id, user_id, slot).await?
        else {
            return Ok(None);
        };

        if matches!(contest_type, ContestType::Ioi | ContestType::Noi) {
            let ranklist = Self::load_ranklist(pool, contest.ranklist_id(slot)).await?;
            ranklist.apply_weights(&mut player);
        }
        Ok(Some(player))
    }

    async fn resort_and_save(
        pool: &PgPool,
        contest: &Contest,
        contest_type: ContestType,
        slot: RanklistSlot,
        ranklist: &mut ContestRanklist,
    ) -> AppResult<()> {
        // a standings row exists exactly when the slot's rank map has an
        // entry for it, so the slot roster is the full ranked population
        let mut players = PlayerRepository::players_of_slot(pool, contest.id, slot).await?;
        ranklist.resort(contest_type, contest.start_time, &mut players);
        for player in &players {
            PlayerRepository::save_score(pool, player).await?;
        }
        RanklistRepository::save(pool, ranklist).await
    }

    async fn load_ranklist(pool: &PgPool, id: i32) -> AppResult<ContestRanklist> {
        RanklistRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ranklist {id} not found")))
    }
}
