//! Container runtime access.
//!
//! The runtime is the source of truth for which workloads exist. This module
//! exposes a read-only snapshot of them through [`WorkloadRuntime`]:
//!
//! - [`Workload`] is the runtime-agnostic record (name, labels, state)
//! - [`DockerCliRuntime`] implements the trait by shelling out to a
//!   Docker-compatible CLI (`docker`, `podman`)
//!
//! Anything that knows what the labels *mean* lives in [`crate::workload`].

mod docker;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

pub use docker::{DockerCliRuntime, parse_ps_output};

/// Environment variable selecting the runtime CLI binary.
pub const RUNTIME_ENV_VAR: &str = "HIVE_RUNTIME";

/// Runtime binary used when [`RUNTIME_ENV_VAR`] is unset.
pub const DEFAULT_RUNTIME_BINARY: &str = "docker";

/// Lifecycle state reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadState {
    Running,
    Stopped,
    Other(String),
}

impl WorkloadState {
    /// Map a runtime state string onto the states we care about.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => WorkloadState::Running,
            "exited" | "stopped" => WorkloadState::Stopped,
            other => WorkloadState::Other(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, WorkloadState::Running)
    }
}

/// A workload as observed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub name: String,
    pub labels: HashMap<String, String>,
    pub state: WorkloadState,
}

impl Workload {
    pub fn new(
        name: impl Into<String>,
        labels: HashMap<String, String>,
        state: WorkloadState,
    ) -> Self {
        Self {
            name: name.into(),
            labels,
            state,
        }
    }
}

/// Read-only view of the container runtime.
///
/// Implementations must be safe to share across concurrent callers.
#[async_trait]
pub trait WorkloadRuntime: Send + Sync {
    /// List every workload the runtime knows about, in any state.
    async fn list_workloads(&self) -> Result<Vec<Workload>, RuntimeError>;
}
