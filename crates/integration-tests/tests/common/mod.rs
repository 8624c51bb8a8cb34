//! Shared wiring for integration tests

#![allow(dead_code)]

use mentorq_core::application::{CoordinatorConfig, QueueCoordinator};
use mentorq_core::domain::{Actor, Team};
use mentorq_core::port::id_provider::UuidProvider;
use mentorq_core::port::time_provider::SystemTimeProvider;
use mentorq_core::port::{BroadcastNotifier, TeamDirectory};
use mentorq_infra_sqlite::{create_pool, run_migrations, SqliteQueueRepository, SqliteTeamDirectory};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

pub const TEAM: &str = "team-rust";
pub const MENTOR: &str = "mentor-kim";

pub fn mentor() -> Actor {
    Actor::mentor(MENTOR)
}

/// Fresh database file under the system temp dir
pub struct TempDb {
    pub path: PathBuf,
}

impl TempDb {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!("mentorq_{}_{}.db", label, uuid::Uuid::new_v4()));
        Self { path }
    }

    pub fn url(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

pub async fn open_pool(url: &str) -> SqlitePool {
    let pool = create_pool(url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    SqliteTeamDirectory::new(pool.clone())
        .register(&Team::new(TEAM, "Rust cohort", MENTOR))
        .await
        .unwrap();
    pool
}

pub fn coordinator(
    pool: &SqlitePool,
    notifier: Arc<BroadcastNotifier>,
    max_swap_attempts: u32,
) -> Arc<QueueCoordinator> {
    Arc::new(QueueCoordinator::new(
        Arc::new(SqliteQueueRepository::new(pool.clone())),
        Arc::new(SqliteTeamDirectory::new(pool.clone())),
        notifier,
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
        CoordinatorConfig {
            max_swap_attempts,
            swap_base_delay_ms: 1,
        },
    ))
}
