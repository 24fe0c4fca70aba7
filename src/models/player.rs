//! Contest player model and per-problem score bookkeeping

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::constants::ACM_PENALTY_SECONDS;
use crate::models::{ContestType, JudgeState, RanklistSlot};

/// Per-problem score records, keyed by problem id
pub type ScoreDetails = BTreeMap<i32, ScoreDetail>;

/// One contest-scoped participation record for one user and one
/// scoreboard slot
///
/// Created lazily on the first qualifying submission or visit, never
/// deleted while the contest exists. Unique on (contest, user, slot).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContestPlayer {
    pub id: i64,
    pub contest_id: i32,
    pub user_id: i32,
    pub slot: RanklistSlot,
    /// Aggregate weighted score; authoritative ranking input only for
    /// ioi/noi, and recomputed from `score_details` before every read
    pub score: i64,
    #[sqlx(json)]
    pub score_details: ScoreDetails,
}

/// Per-problem standing of one player, shaped by the contest type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreDetail {
    /// acm bookkeeping: accepted flag plus attempts made before acceptance
    Acm {
        judge_id: i64,
        accepted: bool,
        unaccepted_count: i32,
        /// Submit time of the accepting submission, seconds since epoch
        #[serde(skip_serializing_if = "Option::is_none")]
        accepted_time: Option<i64>,
    },
    /// ioi/noi bookkeeping: the latest submission's percentage score and
    /// its multiplier-weighted value
    Weighted {
        judge_id: i64,
        score: Option<f64>,
        weighted_score: Option<i64>,
    },
}

impl ScoreDetail {
    pub fn judge_id(&self) -> i64 {
        match self {
            Self::Acm { judge_id, .. } | Self::Weighted { judge_id, .. } => *judge_id,
        }
    }

    /// Recompute the record for one problem from the player's full
    /// qualifying submission history, ordered by submission id ascending.
    ///
    /// Recomputing from history (rather than folding one result at a
    /// time) makes the operation idempotent: the same history always
    /// yields the same record.
    pub fn from_history(contest_type: ContestType, history: &[JudgeState]) -> Option<Self> {
        match contest_type {
            ContestType::Acm => Self::acm_from_history(history),
            ContestType::Ioi | ContestType::Noi => Self::latest_from_history(history),
        }
    }

    /// acm: `accepted` latches on the first accepting submission;
    /// `unaccepted_count` counts judged failures made before it and is
    /// frozen afterwards. `judge_id` points at the accepting submission
    /// once accepted, otherwise the latest judged attempt.
    fn acm_from_history(history: &[JudgeState]) -> Option<Self> {
        let mut unaccepted_count = 0;
        let mut judge_id = None;

        for judge in history.iter().filter(|j| !j.pending) {
            if judge.is_accepted() {
                return Some(Self::Acm {
                    judge_id: judge.id,
                    accepted: true,
                    unaccepted_count,
                    accepted_time: Some(judge.submit_time.timestamp()),
                });
            }
            unaccepted_count += 1;
            judge_id = Some(judge.id);
        }

        judge_id.map(|judge_id| Self::Acm {
            judge_id,
            accepted: false,
            unaccepted_count,
            accepted_time: None,
        })
    }

    /// ioi/noi: the latest judged submission wins, not the best one
    fn latest_from_history(history: &[JudgeState]) -> Option<Self> {
        history
            .iter()
            .filter(|j| !j.pending)
            .next_back()
            .map(|judge| Self::Weighted {
                judge_id: judge.id,
                score: judge.score.map(f64::from),
                weighted_score: None,
            })
    }
}

impl ContestPlayer {
    pub fn detail(&self, problem_id: i32) -> Option<&ScoreDetail> {
        self.score_details.get(&problem_id)
    }

    pub fn set_detail(&mut self, problem_id: i32, detail: ScoreDetail) {
        self.score_details.insert(problem_id, detail);
    }

    /// Number of accepted problems (acm ranking input)
    pub fn solved_count(&self) -> i64 {
        self.score_details
            .values()
            .filter(|d| matches!(d, ScoreDetail::Acm { accepted: true, .. }))
            .count() as i64
    }

    /// acm penalty: for each accepted problem, seconds from contest start
    /// to acceptance plus a fixed penalty per counted failed attempt
    pub fn acm_penalty(&self, contest_start: DateTime<Utc>) -> i64 {
        let start = contest_start.timestamp();
        self.score_details
            .values()
            .filter_map(|d| match d {
                ScoreDetail::Acm {
                    accepted: true,
                    unaccepted_count,
                    accepted_time: Some(t),
                    ..
                } => Some((t - start) + i64::from(*unaccepted_count) * ACM_PENALTY_SECONDS),
                _ => None,
            })
            .sum()
    }

    /// Highest contributing submission id; used as the ioi/noi tie-break
    /// (the player whose standing settled earlier ranks first)
    pub fn last_judge_id(&self) -> i64 {
        self.score_details
            .values()
            .map(ScoreDetail::judge_id)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::statuses;
    use crate::models::SubmissionKind;
    use chrono::TimeZone;

    fn judge(id: i64, status: &str, score: Option<i32>, pending: bool) -> JudgeState {
        JudgeState {
            id,
            user_id: 10,
            problem_id: 101,
            status: status.to_string(),
            score,
            kind: SubmissionKind::Contest,
            contest_id: Some(1),
            pending,
            task_id: None,
            language: Some("cpp".to_string()),
            code: String::new(),
            is_public: true,
            submit_time: Utc.with_ymd_and_hms(2024, 1, 1, 12, id as u32, 0).unwrap(),
        }
    }

    pub(crate) fn player(user_id: i32) -> ContestPlayer {
        ContestPlayer {
            id: i64::from(user_id) * 100,
            contest_id: 1,
            user_id,
            slot: RanklistSlot::Primary,
            score: 0,
            score_details: ScoreDetails::new(),
        }
    }

    #[test]
    fn test_acm_two_failures_then_accept() {
        let history = vec![
            judge(1, statuses::WRONG_ANSWER, Some(0), false),
            judge(2, statuses::WRONG_ANSWER, Some(0), false),
            judge(3, statuses::ACCEPTED, Some(100), false),
        ];
        let detail = ScoreDetail::from_history(ContestType::Acm, &history).unwrap();
        match detail {
            ScoreDetail::Acm {
                judge_id,
                accepted,
                unaccepted_count,
                accepted_time,
            } => {
                assert_eq!(judge_id, 3);
                assert!(accepted);
                assert_eq!(unaccepted_count, 2);
                assert!(accepted_time.is_some());
            }
            other => panic!("expected acm detail, got {other:?}"),
        }
    }

    #[test]
    fn test_acm_count_frozen_after_acceptance() {
        let history = vec![
            judge(1, statuses::WRONG_ANSWER, Some(0), false),
            judge(2, statuses::ACCEPTED, Some(100), false),
            judge(3, statuses::WRONG_ANSWER, Some(0), false),
        ];
        let detail = ScoreDetail::from_history(ContestType::Acm, &history).unwrap();
        match detail {
            ScoreDetail::Acm {
                judge_id,
                accepted,
                unaccepted_count,
                ..
            } => {
                assert_eq!(judge_id, 2);
                assert!(accepted);
                assert_eq!(unaccepted_count, 1);
            }
            other => panic!("expected acm detail, got {other:?}"),
        }
    }

    #[test]
    fn test_acm_pending_rows_do_not_count() {
        let history = vec![
            judge(1, statuses::WRONG_ANSWER, Some(0), false),
            judge(2, statuses::WAITING, None, true),
        ];
        let detail = ScoreDetail::from_history(ContestType::Acm, &history).unwrap();
        match detail {
            ScoreDetail::Acm {
                judge_id,
                accepted,
                unaccepted_count,
                ..
            } => {
                assert_eq!(judge_id, 1);
                assert!(!accepted);
                assert_eq!(unaccepted_count, 1);
            }
            other => panic!("expected acm detail, got {other:?}"),
        }
    }

    #[test]
    fn test_ioi_takes_latest_not_best() {
        let history = vec![
            judge(1, statuses::ACCEPTED, Some(100), false),
            judge(2, statuses::WRONG_ANSWER, Some(40), false),
        ];
        let detail = ScoreDetail::from_history(ContestType::Ioi, &history).unwrap();
        assert_eq!(
            detail,
            ScoreDetail::Weighted {
                judge_id: 2,
                score: Some(40.0),
                weighted_score: None,
            }
        );
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let history = vec![
            judge(1, statuses::WRONG_ANSWER, Some(0), false),
            judge(2, statuses::ACCEPTED, Some(100), false),
        ];
        let a = ScoreDetail::from_history(ContestType::Acm, &history);
        let b = ScoreDetail::from_history(ContestType::Acm, &history);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_history_yields_no_detail() {
        assert_eq!(ScoreDetail::from_history(ContestType::Acm, &[]), None);
        assert_eq!(ScoreDetail::from_history(ContestType::Noi, &[]), None);
    }

    #[test]
    fn test_acm_penalty_includes_failed_attempts() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut p = player(10);
        p.set_detail(
            101,
            ScoreDetail::Acm {
                judge_id: 3,
                accepted: true,
                unaccepted_count: 2,
                accepted_time: Some(start.timestamp() + 600),
            },
        );
        // 600s to accept + 2 * 20min penalty
        assert_eq!(p.acm_penalty(start), 600 + 2 * ACM_PENALTY_SECONDS);
        assert_eq!(p.solved_count(), 1);
    }

    #[test]
    fn test_score_details_serde_round_trip() {
        let mut p = player(10);
        p.set_detail(
            101,
            ScoreDetail::Weighted {
                judge_id: 5,
                score: Some(80.0),
                weighted_score: Some(40),
            },
        );
        let json = serde_json::to_string(&p.score_details).unwrap();
        let back: ScoreDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p.score_details);
    }
}
