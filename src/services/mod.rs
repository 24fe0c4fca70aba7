//! Service layer: orchestration over repositories and models

mod contest_service;
mod membership_service;
mod notification_service;
mod permission_service;
mod ranking_service;
mod submission_query_service;
mod user_service;

pub use contest_service::{ContestService, ProblemStat};
pub use membership_service::MembershipService;
pub use notification_service::{NotificationService, NotificationType, PushClaims};
pub use permission_service::{PermissionResolver, deny_on_error, resolve_level};
pub use ranking_service::RankingEngine;
pub use submission_query_service::{
    LanguageFilter, SubmissionListQuery, SubmissionQueryService, SubmissionRow, Viewer,
};
pub use user_service::UserService;
