//! Database access layer

pub mod connection;
pub mod lock;
pub mod repositories;

pub use connection::{create_pool, run_migrations, test_connection};
pub use lock::{LockManager, ResourceKey};
