//! Contest ranklist model: score weighting and rank ordering

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::constants::DEFAULT_SCORE_MULTIPLIER;
use crate::models::{ContestPlayer, ContestType, ScoreDetail};

/// Per-problem score multipliers; problems without an entry use 1.0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankingParams(pub BTreeMap<i32, f64>);

impl RankingParams {
    pub fn multiplier(&self, problem_id: i32) -> f64 {
        self.0
            .get(&problem_id)
            .copied()
            .unwrap_or(DEFAULT_SCORE_MULTIPLIER)
    }
}

/// The ordered standings of one scoreboard slot.
///
/// Rank positions are a contiguous 1..player_num sequence with no gaps or
/// duplicates; `player_num` always equals the number of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankMap {
    pub player_num: u32,
    pub entries: BTreeMap<u32, i64>,
}

impl RankMap {
    /// Append a player at the next free rank slot. Idempotent: inserting
    /// an already ranked player changes nothing, so duplicate first-visit
    /// triggers cannot allocate two slots.
    pub fn insert_player(&mut self, player_id: i64) -> u32 {
        if let Some(rank) = self.rank_of(player_id) {
            return rank;
        }
        let rank = self.player_num + 1;
        self.entries.insert(rank, player_id);
        self.player_num = rank;
        rank
    }

    pub fn rank_of(&self, player_id: i64) -> Option<u32> {
        self.entries
            .iter()
            .find(|&(_, &p)| p == player_id)
            .map(|(&rank, _)| rank)
    }

    pub fn contains(&self, player_id: i64) -> bool {
        self.rank_of(player_id).is_some()
    }

    /// Player ids from rank 1 upwards
    pub fn players_in_order(&self) -> Vec<i64> {
        (1..=self.player_num)
            .filter_map(|rank| self.entries.get(&rank).copied())
            .collect()
    }

    /// Rewrite the whole mapping from an already ordered player list
    pub fn replace(&mut self, ordered: &[i64]) {
        self.entries = ordered
            .iter()
            .enumerate()
            .map(|(i, &p)| (i as u32 + 1, p))
            .collect();
        self.player_num = ordered.len() as u32;
    }

    /// Check the structural invariant: contiguous 1..player_num ranks,
    /// no duplicate players
    pub fn is_consistent(&self) -> bool {
        if self.entries.len() as u32 != self.player_num {
            return false;
        }
        let contiguous = self
            .entries
            .keys()
            .enumerate()
            .all(|(i, &rank)| rank == i as u32 + 1);
        let distinct: BTreeSet<i64> = self.entries.values().copied().collect();
        contiguous && distinct.len() as u32 == self.player_num
    }
}

/// Ranklist database model; one instance serves exactly one contest
/// scoreboard slot and is mutated only by the ranking engine
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContestRanklist {
    pub id: i32,
    #[sqlx(json)]
    pub ranking_params: RankingParams,
    #[sqlx(json)]
    pub ranking: RankMap,
}

impl ContestRanklist {
    pub fn multiplier(&self, problem_id: i32) -> f64 {
        self.ranking_params.multiplier(problem_id)
    }

    /// Recompute a player's weighted per-problem scores and aggregate
    /// from the raw judge scores, using this slot's multipliers.
    ///
    /// Only meaningful for ioi/noi players; acm details are untouched and
    /// the acm aggregate stays non-authoritative.
    pub fn apply_weights(&self, player: &mut ContestPlayer) {
        let mut total = 0;
        for (&problem_id, detail) in player.score_details.iter_mut() {
            if let ScoreDetail::Weighted {
                score,
                weighted_score,
                ..
            } = detail
            {
                *weighted_score =
                    score.map(|s| (s * self.multiplier(problem_id)).round() as i64);
                if let Some(w) = *weighted_score {
                    total += w;
                }
            }
        }
        player.score = total;
    }

    /// Re-sort the slot after a player's standing changed and write back
    /// the full rank→player mapping. Weighted aggregates are refreshed
    /// first so the order never reads a stale sum.
    pub fn resort(
        &mut self,
        contest_type: ContestType,
        contest_start: DateTime<Utc>,
        players: &mut [ContestPlayer],
    ) {
        if matches!(contest_type, ContestType::Ioi | ContestType::Noi) {
            for player in players.iter_mut() {
                self.apply_weights(player);
            }
        }
        sort_players(contest_type, contest_start, players);
        let ordered: Vec<i64> = players.iter().map(|p| p.id).collect();
        self.ranking.replace(&ordered);
    }
}

/// Deterministic, total standings order.
///
/// acm: accepted count descending, then penalty ascending, then user id
/// ascending. ioi/noi: aggregate weighted score descending, then latest
/// contributing submission id ascending, then user id ascending. The id
/// tie-breaks make re-sorts idempotent on equal scores.
pub fn sort_players(
    contest_type: ContestType,
    contest_start: DateTime<Utc>,
    players: &mut [ContestPlayer],
) {
    match contest_type {
        ContestType::Acm => {
            players.sort_by_key(|p| (-p.solved_count(), p.acm_penalty(contest_start), p.user_id));
        }
        ContestType::Ioi | ContestType::Noi => {
            players.sort_by_key(|p| (-p.score, p.last_judge_id(), p.user_id));
        }
    }
}
