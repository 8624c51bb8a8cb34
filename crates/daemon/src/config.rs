//! Daemon configuration from `MENTORQ_*` environment variables

use anyhow::{bail, Context, Result};
use mentorq_api_rpc::RpcServerConfig;
use mentorq_core::application::constants::{
    DEFAULT_MAX_SWAP_ATTEMPTS, DEFAULT_NOTIFY_CAPACITY, DEFAULT_SWAP_BASE_DELAY_MS,
};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_DB_PATH: &str = "~/.mentorq/queues.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: String,
    pub rpc: RpcServerConfig,
    pub max_swap_attempts: u32,
    pub swap_base_delay_ms: u64,
    pub notify_capacity: usize,
    pub log_format: LogFormat,
    /// Also write daily-rotated log files here when set
    pub log_dir: Option<PathBuf>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys take defaults; set but
    /// unparsable keys are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("MENTORQ_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let log_format = match lookup("MENTORQ_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("MENTORQ_LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        };

        let rpc_defaults = RpcServerConfig::default();
        let config = Self {
            db_path: shellexpand::tilde(&db_path).into_owned(),
            rpc: RpcServerConfig {
                host: lookup("MENTORQ_RPC_HOST").unwrap_or(rpc_defaults.host),
                port: parse_or(&lookup, "MENTORQ_RPC_PORT", rpc_defaults.port)?,
            },
            max_swap_attempts: parse_or(
                &lookup,
                "MENTORQ_SWAP_MAX_ATTEMPTS",
                DEFAULT_MAX_SWAP_ATTEMPTS,
            )?,
            swap_base_delay_ms: parse_or(
                &lookup,
                "MENTORQ_SWAP_BASE_DELAY_MS",
                DEFAULT_SWAP_BASE_DELAY_MS,
            )?,
            notify_capacity: parse_or(&lookup, "MENTORQ_NOTIFY_CAPACITY", DEFAULT_NOTIFY_CAPACITY)?,
            log_format,
            log_dir: lookup("MENTORQ_LOG_DIR")
                .map(|dir| PathBuf::from(shellexpand::tilde(&dir).into_owned())),
        };

        if config.max_swap_attempts == 0 {
            bail!("MENTORQ_SWAP_MAX_ATTEMPTS must be at least 1");
        }
        if config.notify_capacity == 0 {
            bail!("MENTORQ_NOTIFY_CAPACITY must be at least 1");
        }
        Ok(config)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
