use crate::humanize::HumanDuration;
use crate::ledger::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Snapshot store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Single JSON document replaced atomically (temp file + rename)
    #[default]
    File,
    /// Fjall keyspace directory; `path` names the directory
    Fjall,
    /// In-process only, nothing survives a restart
    Memory,
}

impl StoreBackend {
    pub fn is_persistent(&self) -> bool {
        !matches!(self, StoreBackend::Memory)
    }
}

/// Ledger storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
    /// Maximum number of events kept in history
    #[serde(default = "default_capacity")]
    pub capacity: NonZeroUsize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_ledger_path(),
            capacity: default_capacity(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("data/activity.json")
}

fn default_capacity() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN)
}

/// Defaults for the two query shapes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Subjects idle for longer than this are reported inactive
    #[serde(default = "default_inactivity_threshold")]
    pub inactivity_threshold: HumanDuration,
    /// Entries per page of inactivity results
    #[serde(default = "default_page_size")]
    pub page_size: NonZeroUsize,
    /// Default number of events returned by a recent-events query
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            inactivity_threshold: default_inactivity_threshold(),
            page_size: default_page_size(),
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_inactivity_threshold() -> HumanDuration {
    HumanDuration::from_days(30)
}

fn default_page_size() -> NonZeroUsize {
    NonZeroUsize::new(15).unwrap_or(NonZeroUsize::MIN)
}

fn default_recent_limit() -> usize {
    20
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
