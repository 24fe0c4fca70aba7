//! Domain models
//!
//! Database-backed entities plus the pure scoring and ordering rules that
//! operate on them. Everything stateful about a contest standings lives in
//! [`ContestRanklist`] and [`ContestPlayer`]; services only orchestrate
//! loading, locking and storing.

mod contest;
mod group;
mod player;
mod problem;
mod ranklist;
mod submission;
mod user;

pub use contest::{Contest, ContestStatus, ContestType, RanklistSlot, noi_masked_status};
pub use group::{Group, GroupMembership, sort_memberships};
pub use player::{ContestPlayer, ScoreDetail, ScoreDetails};
pub use problem::Problem;
pub use ranklist::{ContestRanklist, RankMap, RankingParams, sort_players};
pub use submission::{
    DisplayConfig, JudgeState, RoughResult, SubmissionInfo, SubmissionKind, rough_result,
};
pub use user::{User, UserPrivilege};
