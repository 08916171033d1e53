#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;

use hive_core::client::{ClientConfigFile, ConfigLocator};
use hive_core::config::ConfigUpserter;
use hive_core::error::{DiscoveryError, RuntimeError};
use hive_core::fs::FileLocks;
use hive_core::runtime::{Workload, WorkloadRuntime, WorkloadState};

/// Runtime returning a fixed listing.
pub struct FixedRuntime(pub Vec<Workload>);

#[async_trait]
impl WorkloadRuntime for FixedRuntime {
    async fn list_workloads(&self) -> Result<Vec<Workload>, RuntimeError> {
        Ok(self.0.clone())
    }
}

/// Runtime whose daemon is down.
pub struct FailingRuntime;

#[async_trait]
impl WorkloadRuntime for FailingRuntime {
    async fn list_workloads(&self) -> Result<Vec<Workload>, RuntimeError> {
        Err(RuntimeError::CommandFailed {
            binary: "docker".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "Cannot connect to the Docker daemon".to_string(),
        })
    }
}

/// Locator returning a fixed set of files.
pub struct StaticLocator(pub Vec<ClientConfigFile>);

impl ConfigLocator for StaticLocator {
    fn find_config_files(&self) -> Result<Vec<ClientConfigFile>, DiscoveryError> {
        Ok(self.0.clone())
    }
}

pub struct BrokenLocator;

impl ConfigLocator for BrokenLocator {
    fn find_config_files(&self) -> Result<Vec<ClientConfigFile>, DiscoveryError> {
        Err(DiscoveryError::HomeDirUnavailable)
    }
}

pub fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Running, hive-owned MCP workload.
pub fn mcp_workload(name: &str, transport: &str, port: u16) -> Workload {
    let port = port.to_string();
    Workload::new(
        name,
        labels(&[
            ("hive", "true"),
            ("hive-tool-type", "mcp"),
            ("hive-transport", transport),
            ("hive-port", &port),
        ]),
        WorkloadState::Running,
    )
}

pub fn file_locks(temp: &TempDir) -> FileLocks {
    FileLocks::new(temp.path().join("state/locks"))
        .with_timeout(Duration::from_millis(500))
        .with_poll_interval(Duration::from_millis(10))
}

pub fn upserter(temp: &TempDir) -> ConfigUpserter {
    ConfigUpserter::new(file_locks(temp))
}

pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
