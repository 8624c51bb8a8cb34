// MentorQ Infrastructure - SQLite Adapter
// Implements: QueueRepository (versioned snapshots), TeamDirectory

mod connection;
mod error;
mod migration;
mod queue_repository;
mod team_directory;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;
pub use team_directory::SqliteTeamDirectory;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
