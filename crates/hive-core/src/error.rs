//! Error taxonomy for workload enumeration, client discovery and config upserts.
//!
//! Only [`SyncError`] ever surfaces as the result of a synchronization call.
//! [`UpsertError`] is per file and ends up inside the report.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure talking to the container runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to run `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{binary} ps` exited with {status}: {stderr}")]
    CommandFailed {
        binary: String,
        status: String,
        stderr: String,
    },

    #[error("failed to parse runtime output line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of the discovery mechanism itself (not of a single file probe).
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("could not determine the user's home directory")]
    HomeDirUnavailable,
}

/// Call-level failure of a synchronization pass.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(#[from] RuntimeError),

    #[error("client config discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("operation cancelled")]
    Cancelled,
}

/// Failure of a single (endpoint, file) upsert.
#[derive(Debug, Error)]
pub enum UpsertError {
    #[error("cancelled before the config lock was acquired")]
    Cancelled,

    #[error("timed out after {timeout:?} waiting for lock on {}", path.display())]
    LockTimeout { path: PathBuf, timeout: Duration },

    #[error("failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0:#}")]
    Config(#[from] anyhow::Error),

    #[error("upsert task failed: {0}")]
    Task(String),
}
