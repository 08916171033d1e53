//! Settings store for loading and updating `config.toml`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use super::{Settings, parser};
use crate::client::ClientType;
use crate::fs::{FileLocks, atomic_write, resolve_target};

/// File name of the settings file inside the hive config directory.
pub const SETTINGS_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    locks: FileLocks,
}

impl SettingsStore {
    pub fn new(path: PathBuf, locks: FileLocks) -> Self {
        Self { path, locks }
    }

    /// Store at `<config_dir>/config.toml`.
    pub fn in_dir(config_dir: &Path, locks: FileLocks) -> Self {
        Self::new(config_dir.join(SETTINGS_FILE_NAME), locks)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields defaults.
    pub fn load(&self) -> anyhow::Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::new());
        }
        parser::parse_settings(&self.path)
    }

    /// Load, mutate and atomically rewrite the settings under an exclusive lock.
    ///
    /// The file work runs on the blocking pool while the lock is held.
    pub async fn update<F, R>(&self, cancel: &CancellationToken, f: F) -> anyhow::Result<R>
    where
        F: FnOnce(&mut Settings) -> R + Send + 'static,
        R: Send + 'static,
    {
        let guard = self
            .locks
            .acquire(&self.path, cancel)
            .await
            .with_context(|| format!("Failed to lock config file: {}", self.path.display()))?;

        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let result = store.update_locked(f);
            drop(guard);
            result
        })
        .await
        .context("Settings update task failed")?
    }

    fn update_locked<F, R>(&self, f: F) -> anyhow::Result<R>
    where
        F: FnOnce(&mut Settings) -> R,
    {
        let mut settings = self.load()?;
        let result = f(&mut settings);
        settings.validate()?;
        self.save(&settings)?;
        Ok(result)
    }

    fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        let content = parser::to_toml(settings)?;
        let target = resolve_target(&self.path);
        atomic_write(&target, content.as_bytes())
            .with_context(|| format!("Failed to write config file: {}", self.path.display()))
    }

    pub fn registered_clients(&self) -> anyhow::Result<Vec<ClientType>> {
        Ok(self.load()?.clients.registered_clients)
    }

    /// Returns `false` if the client was already registered.
    pub async fn register_client(
        &self,
        client: ClientType,
        cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        self.update(cancel, move |s| s.register_client(client)).await
    }

    /// Returns `false` if the client was not registered.
    pub async fn remove_client(
        &self,
        client: ClientType,
        cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        self.update(cancel, move |s| s.remove_client(client)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> SettingsStore {
        SettingsStore::in_dir(
            &temp.path().join("config"),
            FileLocks::new(temp.path().join("state/locks")),
        )
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(store(&temp).load().unwrap(), Settings::new());
    }

    #[tokio::test]
    async fn test_update_persists() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let cancel = CancellationToken::new();

        assert!(store.register_client(ClientType::Cursor, &cancel).await.unwrap());
        assert!(!store.register_client(ClientType::Cursor, &cancel).await.unwrap());
        assert!(store.path().exists());
        assert_eq!(store.registered_clients().unwrap(), vec![ClientType::Cursor]);

        assert!(store.remove_client(ClientType::Cursor, &cancel).await.unwrap());
        assert!(store.registered_clients().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_update_is_not_written() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let cancel = CancellationToken::new();

        let result = store
            .update(&cancel, |s| s.sync.lock_timeout_ms = 0)
            .await;

        assert!(result.is_err());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_are_not_lost() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let cancel = CancellationToken::new();

        let (a, b) = tokio::join!(
            store.register_client(ClientType::Cursor, &cancel),
            store.register_client(ClientType::Windsurf, &cancel)
        );
        assert!(a.unwrap() && b.unwrap());

        let mut clients = store.registered_clients().unwrap();
        clients.sort();
        assert_eq!(clients, vec![ClientType::Cursor, ClientType::Windsurf]);
    }
}
