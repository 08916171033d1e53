//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::{ClientConfigLocator, ClientType, Platform};
use crate::config::{ConfigUpserter, Settings, SettingsStore, default_config_dir};
use crate::fs::FileLocks;
use crate::runtime::WorkloadRuntime;
use crate::sync::ConfigSynchronizer;

/// Unified application context for dependency injection.
///
/// Holds every path hive touches. Frontends create this once and derive
/// services from it; tests point it at temp directories.
#[derive(Debug, Clone)]
pub struct AppContext {
    home_dir: Option<PathBuf>,
    config_dir: PathBuf,
    state_dir: PathBuf,
    platform: Platform,
}

impl AppContext {
    /// Create a new context with explicit paths.
    pub fn new(
        home_dir: Option<PathBuf>,
        config_dir: PathBuf,
        state_dir: PathBuf,
        platform: Platform,
    ) -> Self {
        Self {
            home_dir,
            config_dir,
            state_dir,
            platform,
        }
    }

    /// Context for the current user's standard directories.
    pub fn from_env() -> anyhow::Result<Self> {
        let config_dir = default_config_dir()?;
        let state_dir = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|p| p.join("hive"))
            .unwrap_or_else(|| config_dir.join("state"));

        Ok(Self::new(
            dirs::home_dir(),
            config_dir,
            state_dir,
            Platform::current(),
        ))
    }

    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Lock registry shared by every writer of client and settings files.
    pub fn file_locks(&self) -> FileLocks {
        FileLocks::new(self.state_dir.join("locks"))
    }

    pub fn settings_store(&self) -> SettingsStore {
        SettingsStore::in_dir(&self.config_dir, self.file_locks())
    }

    /// Locator targeting the given client types.
    pub fn locator(&self, clients: Vec<ClientType>) -> ClientConfigLocator {
        ClientConfigLocator::new(self.home_dir.clone(), self.platform, clients)
    }

    /// Synchronizer over the registered clients in `settings`.
    pub fn synchronizer(
        &self,
        runtime: Arc<dyn WorkloadRuntime>,
        settings: &Settings,
    ) -> ConfigSynchronizer {
        let locks = self
            .file_locks()
            .with_timeout(settings.sync.lock_timeout())
            .with_poll_interval(settings.sync.lock_poll_interval());
        let locator = self.locator(settings.clients.registered_clients.clone());

        ConfigSynchronizer::new(runtime, Arc::new(locator), ConfigUpserter::new(locks))
    }
}
