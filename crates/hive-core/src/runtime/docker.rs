//! Docker-compatible CLI runtime.
//!
//! Runs `<binary> ps --all --no-trunc --format '{{json .}}'` and parses one
//! JSON object per line. Docker reports labels as a flat `k=v,k2=v2` string
//! and names as a single string; Podman uses a map and a list. Both shapes
//! are accepted.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use super::{DEFAULT_RUNTIME_BINARY, RUNTIME_ENV_VAR, Workload, WorkloadRuntime, WorkloadState};
use crate::error::RuntimeError;

#[derive(Debug, Clone)]
pub struct DockerCliRuntime {
    binary: String,
}

impl Default for DockerCliRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_BINARY)
    }
}

impl DockerCliRuntime {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Use `HIVE_RUNTIME` if set, `docker` otherwise.
    pub fn from_env() -> Self {
        match std::env::var(RUNTIME_ENV_VAR) {
            Ok(binary) if !binary.trim().is_empty() => Self::new(binary.trim()),
            _ => Self::default(),
        }
    }
}

#[async_trait]
impl WorkloadRuntime for DockerCliRuntime {
    async fn list_workloads(&self) -> Result<Vec<Workload>, RuntimeError> {
        let output = Command::new(&self.binary)
            .args(["ps", "--all", "--no-trunc", "--format", "{{json .}}"])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RuntimeError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RuntimeError::CommandFailed {
                binary: self.binary.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_ps_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug, Deserialize)]
struct PsRecord {
    #[serde(rename = "Names", default)]
    names: Option<Names>,
    #[serde(rename = "Labels", default)]
    labels: Option<Labels>,
    #[serde(rename = "State", default)]
    state: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Names {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Labels {
    Map(HashMap<String, String>),
    Flat(String),
}

/// Parse the line-delimited JSON emitted by `ps --format '{{json .}}'`.
pub fn parse_ps_output(stdout: &str) -> Result<Vec<Workload>, RuntimeError> {
    let mut workloads = Vec::new();
    for (idx, line) in stdout.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: PsRecord = serde_json::from_str(line).map_err(|source| {
            RuntimeError::Parse {
                line: idx + 1,
                source,
            }
        })?;
        workloads.push(record.into_workload());
    }
    Ok(workloads)
}

impl PsRecord {
    fn into_workload(self) -> Workload {
        let name = match self.names {
            Some(Names::One(name)) => name.split(',').next().unwrap_or_default().to_string(),
            Some(Names::Many(names)) => names.into_iter().next().unwrap_or_default(),
            None => String::new(),
        };
        let labels = match self.labels {
            Some(Labels::Map(map)) => map,
            Some(Labels::Flat(flat)) => parse_flat_labels(&flat),
            None => HashMap::new(),
        };
        Workload {
            name: name.trim_start_matches('/').to_string(),
            labels,
            state: WorkloadState::parse(&self.state),
        }
    }
}

fn parse_flat_labels(flat: &str) -> HashMap<String, String> {
    flat.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}
