//! Application-wide constants
//!
//! This module contains all constant values used throughout the engine.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// GROUP LEVELS
// =============================================================================

/// Level returned when a user belongs to none of a problem's restricting groups
pub const LEVEL_NONE: i32 = -1;

/// Level granted on an unrestricted problem
pub const LEVEL_DEFAULT: i32 = 0;

/// Level at or above which a group membership grants management rights.
/// A global manage privilege short-circuits to exactly this level.
pub const LEVEL_MANAGE: i32 = 2;

// =============================================================================
// GLOBAL PRIVILEGES
// =============================================================================

/// Named global privileges, independent of group membership.
/// `is_admin` implies every privilege.
pub mod privileges {
    /// Manage all contests and problems
    pub const MANAGE_PROBLEM: &str = "manage_problem";
    /// See participants' real names on ranklists
    pub const SEE_REALNAME: &str = "see_realname";
    /// Manage user accounts
    pub const MANAGE_USER: &str = "manage_user";

    /// All known privileges
    pub const ALL: &[&str] = &[MANAGE_PROBLEM, SEE_REALNAME, MANAGE_USER];
}

// =============================================================================
// JUDGE STATUSES
// =============================================================================

/// Judge status strings as reported by the judging collaborator
pub mod statuses {
    pub const ACCEPTED: &str = "Accepted";
    pub const WRONG_ANSWER: &str = "Wrong Answer";
    pub const TIME_LIMIT_EXCEEDED: &str = "Time Limit Exceeded";
    pub const MEMORY_LIMIT_EXCEEDED: &str = "Memory Limit Exceeded";
    pub const RUNTIME_ERROR: &str = "Runtime Error";
    pub const COMPILE_ERROR: &str = "Compile Error";
    pub const WAITING: &str = "Waiting";
    pub const COMPILING: &str = "Compiling";
    pub const JUDGING: &str = "Judging";
    pub const SYSTEM_ERROR: &str = "System Error";

    /// Generic status shown to noi participants before contest end
    pub const SUBMITTED: &str = "Submitted";

    /// Statuses reported verbatim even while noi feedback is restricted
    pub const NOI_PASSTHROUGH: &[&str] = &[COMPILE_ERROR, WAITING, COMPILING];
}

// =============================================================================
// CONTEST SETTINGS
// =============================================================================

/// Penalty added per counted unaccepted attempt in acm ranking (seconds)
pub const ACM_PENALTY_SECONDS: i64 = 20 * 60;

/// Score multiplier applied when `ranking_params` has no entry for a problem
pub const DEFAULT_SCORE_MULTIPLIER: f64 = 1.0;

// =============================================================================
// SUBMISSION LANGUAGE FILTERS
// =============================================================================

/// Special language filter value matching submit-answer submissions
/// (empty or null language)
pub const LANGUAGE_SUBMIT_ANSWER: &str = "submit-answer";

/// Special language filter value excluding submit-answer submissions
pub const LANGUAGE_NON_SUBMIT_ANSWER: &str = "non-submit-answer";

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for submission listings
pub const DEFAULT_SUBMISSION_PAGE_SIZE: i64 = 20;

/// Default page size for contest listings
pub const DEFAULT_CONTEST_PAGE_SIZE: i64 = 20;

/// Maximum page size for paginated results
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// LOCKING
// =============================================================================

/// Default advisory-lock acquisition timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Poll interval while waiting on an advisory lock, in milliseconds
pub const LOCK_POLL_INTERVAL_MS: u64 = 25;
