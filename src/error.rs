//! Error kinds for the reconciliation layer.
//!
//! Cache misses and unparsable lesson times are not errors anywhere in this
//! crate — absence and deprioritization are the only signals for those. The
//! types here cover the collaborator boundaries (remote fetch, persistent
//! store) and the single user-visible failure the repository can produce.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by the remote schedule source.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
  #[error("request timed out")]
  Timeout,

  #[error("network error: {0}")]
  Network(String),

  #[error("remote returned status {0}")]
  Status(u16),

  #[error("malformed remote payload: {0}")]
  Malformed(String),
}

/// Failure reported by the persistent storage collaborator.
#[derive(Debug, Clone, Error)]
#[error("storage error: {0}")]
pub struct StoreError(pub String);

/// User-visible repository failure.
///
/// Produced only when the remote fetch failed and the persisted fallback
/// failed too. A failed fetch with a readable fallback is served as a
/// degraded success, not an error.
#[derive(Debug, Clone, Error)]
pub enum RepoError {
  #[error("schedule data unavailable: {fetch}")]
  Unavailable {
    fetch: FetchError,
    store: StoreError,
  },
}

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read config file {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },
}
