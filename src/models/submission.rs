//! Submission (judge state) model and caller-facing views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::statuses;

/// Submission scope: an open submission or a contest submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
pub enum SubmissionKind {
    Normal = 0,
    Contest = 1,
}

/// One submission and its judging state
///
/// Judging happens in an external collaborator; `task_id` is the opaque
/// handle it is known by while `pending` is set.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JudgeState {
    pub id: i64,
    pub user_id: i32,
    pub problem_id: i32,
    pub status: String,
    pub score: Option<i32>,
    pub kind: SubmissionKind,
    /// Contest id when `kind` is [`SubmissionKind::Contest`]
    pub contest_id: Option<i32>,
    pub pending: bool,
    pub task_id: Option<Uuid>,
    /// Null or empty for submit-answer problems
    pub language: Option<String>,
    pub code: String,
    /// Denormalized from the owning problem; drives the open-listing
    /// visibility scope
    pub is_public: bool,
    pub submit_time: DateTime<Utc>,
}

impl JudgeState {
    pub fn is_accepted(&self) -> bool {
        self.status == statuses::ACCEPTED
    }

    /// Whether the row belongs to the given contest
    pub fn belongs_to_contest(&self, contest_id: i32) -> bool {
        self.kind == SubmissionKind::Contest && self.contest_id == Some(contest_id)
    }
}

/// Field-visibility decisions for one caller looking at submission rows.
///
/// Embedded verbatim into push tokens so the channel can re-derive what
/// the issuing caller was entitled to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    pub show_score: bool,
    pub show_usage: bool,
    pub show_code: bool,
    pub show_result: bool,
    pub show_others: bool,
    pub show_detail_result: bool,
    pub show_testdata: bool,
    pub in_contest: bool,
    pub show_rejudge: bool,
}

impl DisplayConfig {
    /// Everything visible: the open submission listing outside any contest
    pub fn open() -> Self {
        Self {
            show_score: true,
            show_usage: true,
            show_code: true,
            show_result: true,
            show_others: true,
            show_detail_result: true,
            show_testdata: true,
            in_contest: false,
            show_rejudge: false,
        }
    }
}

/// The masked, caller-visible part of a submission row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionInfo {
    pub id: i64,
    pub user_id: i32,
    /// Contest-local 1-based problem number when scoped to a contest,
    /// global problem id otherwise
    pub problem_id: i32,
    pub language: Option<String>,
    pub submit_time: DateTime<Utc>,
}

/// Coarse judging outcome shown in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoughResult {
    pub status: String,
    pub score: Option<i32>,
}

impl SubmissionInfo {
    pub fn from_judge(judge: &JudgeState, display: &DisplayConfig) -> Self {
        Self {
            id: judge.id,
            user_id: judge.user_id,
            problem_id: judge.problem_id,
            language: if display.show_code {
                judge.language.clone()
            } else {
                None
            },
            submit_time: judge.submit_time,
        }
    }
}

/// Coarse result for a listing row, or `None` while the row must stay
/// opaque (still judging, or results withheld by the display config).
/// A compile error passes through even when results are withheld.
pub fn rough_result(judge: &JudgeState, display: &DisplayConfig) -> Option<RoughResult> {
    if judge.pending {
        return None;
    }
    if display.show_result {
        Some(RoughResult {
            status: judge.status.clone(),
            score: if display.show_score { judge.score } else { None },
        })
    } else if judge.status == statuses::COMPILE_ERROR {
        Some(RoughResult {
            status: judge.status.clone(),
            score: None,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn judge(status: &str, pending: bool, score: Option<i32>) -> JudgeState {
        JudgeState {
            id: 1,
            user_id: 10,
            problem_id: 100,
            status: status.to_string(),
            score,
            kind: SubmissionKind::Normal,
            contest_id: None,
            pending,
            task_id: None,
            language: Some("cpp".to_string()),
            code: String::new(),
            is_public: true,
            submit_time: Utc::now(),
        }
    }

    #[test]
    fn test_pending_row_has_no_rough_result() {
        let j = judge(statuses::WAITING, true, None);
        assert_eq!(rough_result(&j, &DisplayConfig::open()), None);
    }

    #[test]
    fn test_rough_result_hides_score_when_config_says_so() {
        let j = judge(statuses::ACCEPTED, false, Some(100));
        let mut display = DisplayConfig::open();
        display.show_score = false;
        let rough = rough_result(&j, &display).unwrap();
        assert_eq!(rough.status, statuses::ACCEPTED);
        assert_eq!(rough.score, None);
    }

    #[test]
    fn test_compile_error_passes_through_hidden_results() {
        let mut display = DisplayConfig::open();
        display.show_result = false;

        let ce = judge(statuses::COMPILE_ERROR, false, None);
        assert!(rough_result(&ce, &display).is_some());

        let wa = judge(statuses::WRONG_ANSWER, false, Some(0));
        assert!(rough_result(&wa, &display).is_none());
    }
}
