//! Contest model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::constants::statuses;
use crate::error::{AppError, AppResult};
use crate::models::DisplayConfig;

/// Contest database model
///
/// Every contest owns exactly two ranklist slots: the primary scoreboard
/// and a restricted/secondary scoreboard that may weight problems
/// differently.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contest {
    pub id: i32,
    pub title: String,
    /// Scoring regime, immutable after creation: "acm", "ioi" or "noi"
    pub contest_type: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Ordered problem ids; contest-local problem numbers are 1-based
    /// indexes into this list
    pub problems: Vec<i32>,
    /// Users allowed to manage this contest besides the owner
    pub admins: Vec<i32>,
    pub is_public: bool,
    pub hide_statistics: bool,
    /// Create a standings row on a participant's first problem visit
    /// while the contest runs
    pub read_rating: bool,
    pub owner_id: i32,
    pub primary_ranklist_id: i32,
    pub restricted_ranklist_id: i32,
}

/// Contest scoring regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestType {
    Acm,
    Ioi,
    Noi,
}

impl ContestType {
    /// Parse a stored or caller-provided type string
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "acm" => Ok(Self::Acm),
            "ioi" => Ok(Self::Ioi),
            "noi" => Ok(Self::Noi),
            other => Err(AppError::InvalidInput(format!(
                "Unknown contest type: {other}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acm => "acm",
            Self::Ioi => "ioi",
            Self::Noi => "noi",
        }
    }

    /// Participants see their scores while the contest runs
    pub fn shows_score(self) -> bool {
        matches!(self, Self::Acm | Self::Ioi)
    }

    /// Participants see full judge results while the contest runs
    pub fn shows_result(self) -> bool {
        matches!(self, Self::Acm | Self::Ioi)
    }

    /// Participants see other players' submissions while the contest runs
    pub fn shows_others(self) -> bool {
        matches!(self, Self::Acm)
    }

    /// Participants see per-testcase details while the contest runs
    pub fn shows_testcase_details(self) -> bool {
        matches!(self, Self::Ioi)
    }
}

/// One of the two scoreboard slots of a contest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ranklist_slot", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RanklistSlot {
    Primary,
    Restricted,
}

/// Contest status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    Upcoming,
    Ongoing,
    Ended,
}

impl std::fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upcoming => write!(f, "upcoming"),
            Self::Ongoing => write!(f, "ongoing"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

impl Contest {
    pub fn contest_type(&self) -> AppResult<ContestType> {
        ContestType::parse(&self.contest_type)
    }

    /// Get the status of the contest at a given instant
    pub fn status_at(&self, now: DateTime<Utc>) -> ContestStatus {
        if now < self.start_time {
            ContestStatus::Upcoming
        } else if now < self.end_time {
            ContestStatus::Ongoing
        } else {
            ContestStatus::Ended
        }
    }

    /// Get the current status of the contest
    pub fn status(&self) -> ContestStatus {
        self.status_at(Utc::now())
    }

    pub fn is_running(&self) -> bool {
        self.status() == ContestStatus::Ongoing
    }

    pub fn is_ended(&self) -> bool {
        self.status() == ContestStatus::Ended
    }

    /// Resolve a contest-local 1-based problem number to a problem id
    pub fn problem_at(&self, number: usize) -> Option<i32> {
        if number == 0 {
            return None;
        }
        self.problems.get(number - 1).copied()
    }

    /// Contest-local 1-based number of a problem id
    pub fn problem_number(&self, problem_id: i32) -> Option<usize> {
        self.problems.iter().position(|&p| p == problem_id).map(|i| i + 1)
    }

    pub fn has_problem(&self, problem_id: i32) -> bool {
        self.problems.contains(&problem_id)
    }

    pub fn ranklist_id(&self, slot: RanklistSlot) -> i32 {
        match slot {
            RanklistSlot::Primary => self.primary_ranklist_id,
            RanklistSlot::Restricted => self.restricted_ranklist_id,
        }
    }

    /// Whether the given user id is listed as a contest admin
    pub fn has_admin(&self, user_id: i32) -> bool {
        self.owner_id == user_id || self.admins.contains(&user_id)
    }

    /// Field visibility for a participant while this contest runs
    pub fn display_config(&self) -> AppResult<DisplayConfig> {
        let contest_type = self.contest_type()?;
        Ok(DisplayConfig {
            show_score: contest_type.shows_score(),
            show_usage: false,
            show_code: false,
            show_result: contest_type.shows_result(),
            show_others: contest_type.shows_others(),
            show_detail_result: contest_type.shows_testcase_details(),
            show_testdata: false,
            in_contest: true,
            show_rejudge: false,
        })
    }

    /// Whether the ranklist may be served to a non-supervisor right now
    pub fn ranklist_visible_to_participants(&self) -> AppResult<bool> {
        let contest_type = self.contest_type()?;
        Ok(self.is_ended() || (contest_type.shows_result() && contest_type.shows_others()))
    }
}

/// Status string shown to a noi participant before contest end.
///
/// Everything collapses to a generic "Submitted" except compile errors
/// and the not-yet-judged states.
pub fn noi_masked_status(status: &str) -> &str {
    if statuses::NOI_PASSTHROUGH.contains(&status) {
        status
    } else {
        statuses::SUBMITTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn contest(contest_type: &str) -> Contest {
        Contest {
            id: 1,
            title: "Test Round".to_string(),
            contest_type: contest_type.to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap(),
            problems: vec![101, 102, 103],
            admins: vec![7],
            is_public: true,
            hide_statistics: false,
            read_rating: false,
            owner_id: 3,
            primary_ranklist_id: 11,
            restricted_ranklist_id: 12,
        }
    }

    #[test]
    fn test_status_windows() {
        let c = contest("acm");
        let before = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();
        let during = Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();

        assert_eq!(c.status_at(before), ContestStatus::Upcoming);
        assert_eq!(c.status_at(during), ContestStatus::Ongoing);
        assert_eq!(c.status_at(after), ContestStatus::Ended);
    }

    #[test]
    fn test_problem_number_mapping_is_one_based() {
        let c = contest("ioi");
        assert_eq!(c.problem_at(1), Some(101));
        assert_eq!(c.problem_at(3), Some(103));
        assert_eq!(c.problem_at(0), None);
        assert_eq!(c.problem_at(4), None);
        assert_eq!(c.problem_number(102), Some(2));
        assert_eq!(c.problem_number(999), None);
    }

    #[test]
    fn test_contest_type_parsing_rejects_unknown() {
        assert_eq!(ContestType::parse("acm").unwrap(), ContestType::Acm);
        assert!(ContestType::parse("codeforces").is_err());
    }

    #[test]
    fn test_display_config_per_type() {
        let acm = contest("acm").display_config().unwrap();
        assert!(acm.show_result && acm.show_others && acm.show_score);
        assert!(!acm.show_detail_result);

        let ioi = contest("ioi").display_config().unwrap();
        assert!(ioi.show_result && ioi.show_score && ioi.show_detail_result);
        assert!(!ioi.show_others);

        let noi = contest("noi").display_config().unwrap();
        assert!(!noi.show_result && !noi.show_score && !noi.show_others);
    }

    #[test]
    fn test_ranklist_visibility_per_type() {
        // the fixture's dates are in the past, so it reads as ended
        assert!(contest("acm").ranklist_visible_to_participants().unwrap());
        assert!(contest("noi").ranklist_visible_to_participants().unwrap());

        let live = |ty: &str| {
            let mut c = contest(ty);
            c.end_time = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
            c
        };
        // while running, only acm shows everyone's standings
        assert!(live("acm").ranklist_visible_to_participants().unwrap());
        assert!(!live("ioi").ranklist_visible_to_participants().unwrap());
        assert!(!live("noi").ranklist_visible_to_participants().unwrap());
    }

    #[test]
    fn test_noi_masking_passes_terminal_states() {
        assert_eq!(noi_masked_status("Accepted"), "Submitted");
        assert_eq!(noi_masked_status("Wrong Answer"), "Submitted");
        assert_eq!(noi_masked_status("Compile Error"), "Compile Error");
        assert_eq!(noi_masked_status("Waiting"), "Waiting");
        assert_eq!(noi_masked_status("Compiling"), "Compiling");
    }
}
