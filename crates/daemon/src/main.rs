//! MentorQ Daemon - Main Entry Point
//!
//! Wires the SQLite adapters and the broadcast notifier into the queue
//! coordinator and serves it over JSON-RPC until Ctrl+C.

mod config;
mod logging;

use anyhow::Result;
use config::DaemonConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use mentorq_api_rpc::RpcServer;
use mentorq_core::application::{CoordinatorConfig, QueueCoordinator};
use mentorq_core::port::id_provider::UuidProvider;
use mentorq_core::port::time_provider::SystemTimeProvider;
use mentorq_core::port::BroadcastNotifier;
use mentorq_infra_sqlite::{create_pool, run_migrations, SqliteQueueRepository, SqliteTeamDirectory};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging
    let _log_guard = logging::init(&config)?;
    info!("MentorQ daemon v{} starting...", VERSION);

    // 3. Initialize database
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    info!(db_path = %config.db_path, "Initializing database...");

    let pool = create_pool(&config.db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let notifier = Arc::new(BroadcastNotifier::new(config.notify_capacity));
    let coordinator = Arc::new(QueueCoordinator::new(
        Arc::new(SqliteQueueRepository::new(pool.clone())),
        Arc::new(SqliteTeamDirectory::new(pool.clone())),
        notifier.clone(),
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
        CoordinatorConfig {
            max_swap_attempts: config.max_swap_attempts,
            swap_base_delay_ms: config.swap_base_delay_ms,
        },
    ));

    // 5. Start JSON-RPC server
    let (rpc_handle, addr) = RpcServer::new(config.rpc.clone(), coordinator, notifier)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}
