//! Schema of hive's own `config.toml`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::ClientType;
use crate::fs::lock::{DEFAULT_LOCK_TIMEOUT, DEFAULT_POLL_INTERVAL};

/// Persistent user settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Custom CA certificate used for registry and container operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_certificate_path: Option<PathBuf>,

    /// Remote MCP server registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,

    /// Allow a registry URL whose host is a private IP address
    #[serde(default)]
    pub allow_private_registry_ip: bool,

    #[serde(default)]
    pub clients: ClientsSection,

    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientsSection {
    /// Client types whose config files are kept in sync
    #[serde(default)]
    pub registered_clients: Vec<ClientType>,
}

/// Tuning for per-file config locks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default = "default_lock_poll_interval_ms")]
    pub lock_poll_interval_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT.as_millis() as u64
}

fn default_lock_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            lock_poll_interval_ms: default_lock_poll_interval_ms(),
        }
    }
}

impl SyncSettings {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sync.lock_timeout_ms == 0 {
            anyhow::bail!("sync.lock_timeout_ms must be greater than zero");
        }
        if self.sync.lock_poll_interval_ms == 0 {
            anyhow::bail!("sync.lock_poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn is_registered(&self, client: ClientType) -> bool {
        self.clients.registered_clients.contains(&client)
    }

    /// Add `client` to the registered list. Returns `false` if already present.
    pub fn register_client(&mut self, client: ClientType) -> bool {
        if self.is_registered(client) {
            return false;
        }
        self.clients.registered_clients.push(client);
        true
    }

    /// Remove `client` from the registered list. Returns `false` if absent.
    pub fn remove_client(&mut self, client: ClientType) -> bool {
        let before = self.clients.registered_clients.len();
        self.clients.registered_clients.retain(|c| *c != client);
        self.clients.registered_clients.len() != before
    }
}
