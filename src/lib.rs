//! Gavel - Contest Ranking & Access-Control Engine
//!
//! This library provides the core engine of an online-judge contest
//! platform: per-contest standings across three scoring regimes (acm,
//! ioi, noi), multi-level group-based visibility and management
//! permissions, and large submission listings served under counting or
//! cursor pagination.
//!
//! Page rendering, sessions, and the judging sandbox are external
//! collaborators. They call into this crate and render its results;
//! the judging side is only ever identified by an opaque task handle
//! and a signed push-notification token.
//!
//! # Architecture
//!
//! The crate follows a layered architecture:
//! - **Services**: Business logic (permissions, ranking, queries)
//! - **Repositories**: Database access
//! - **Models**: Domain models carrying the pure scoring/ordering rules

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
