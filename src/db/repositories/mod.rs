//! Repository layer for database operations

mod contest_repo;
mod group_repo;
mod player_repo;
mod problem_repo;
mod ranklist_repo;
mod submission_repo;
mod user_repo;

pub use contest_repo::ContestRepository;
pub use group_repo::GroupRepository;
pub use player_repo::PlayerRepository;
pub use problem_repo::ProblemRepository;
pub use ranklist_repo::RanklistRepository;
pub use submission_repo::SubmissionRepository;
pub use user_repo::UserRepository;
