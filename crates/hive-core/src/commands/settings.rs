//! CA certificate and registry URL settings commands.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::{SettingsStore, validate_ca_certificate, validate_registry_url};

/// Stored CA certificate and whether it can still be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaCertStatus {
    pub path: PathBuf,
    pub accessible: bool,
}

/// Stored registry URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryUrlSetting {
    pub url: String,
    pub allow_private_ip: bool,
}

/// Settings command orchestrator
#[derive(Debug, Clone)]
pub struct SettingsCommand {
    store: SettingsStore,
}

impl SettingsCommand {
    pub fn new(store: SettingsStore) -> Self {
        Self { store }
    }

    /// Validate and store a CA certificate path. Returns the stored path.
    pub async fn set_ca_cert(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> anyhow::Result<PathBuf> {
        let path = validate_ca_certificate(path)?;
        let stored = path.clone();
        self.store
            .update(cancel, move |s| s.ca_certificate_path = Some(stored))
            .await?;
        Ok(path)
    }

    pub fn get_ca_cert(&self) -> anyhow::Result<Option<CaCertStatus>> {
        Ok(self
            .store
            .load()?
            .ca_certificate_path
            .map(|path| CaCertStatus {
                accessible: path.is_file(),
                path,
            }))
    }

    /// Returns `false` if no certificate was configured.
    pub async fn unset_ca_cert(&self, cancel: &CancellationToken) -> anyhow::Result<bool> {
        self.store
            .update(cancel, |s| s.ca_certificate_path.take().is_some())
            .await
    }

    pub async fn set_registry_url(
        &self,
        raw: &str,
        allow_private_ip: bool,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Url> {
        let url = validate_registry_url(raw, allow_private_ip)?;
        let stored = url.to_string();
        self.store
            .update(cancel, move |s| {
                s.registry_url = Some(stored);
                s.allow_private_registry_ip = allow_private_ip;
            })
            .await?;
        Ok(url)
    }

    pub fn get_registry_url(&self) -> anyhow::Result<Option<RegistryUrlSetting>> {
        let settings = self.store.load()?;
        Ok(settings.registry_url.map(|url| RegistryUrlSetting {
            url,
            allow_private_ip: settings.allow_private_registry_ip,
        }))
    }

    /// Returns `false` if no registry URL was configured.
    pub async fn unset_registry_url(&self, cancel: &CancellationToken) -> anyhow::Result<bool> {
        self.store
            .update(cancel, |s| {
                s.allow_private_registry_ip = false;
                s.registry_url.take().is_some()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileLocks;
    use tempfile::TempDir;

    fn command(temp: &TempDir) -> SettingsCommand {
        SettingsCommand::new(SettingsStore::in_dir(
            &temp.path().join("config"),
            FileLocks::new(temp.path().join("locks")),
        ))
    }

    #[tokio::test]
    async fn test_ca_cert_lifecycle() {
        let temp = TempDir::new().unwrap();
        let cmd = command(&temp);
        let cancel = CancellationToken::new();
        let cert = temp.path().join("ca.pem");
        std::fs::write(
            &cert,
            "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n",
        )
        .unwrap();

        assert_eq!(cmd.get_ca_cert().unwrap(), None);
        cmd.set_ca_cert(&cert, &cancel).await.unwrap();
        assert_eq!(
            cmd.get_ca_cert().unwrap(),
            Some(CaCertStatus {
                path: cert.clone(),
                accessible: true
            })
        );

        std::fs::remove_file(&cert).unwrap();
        assert!(!cmd.get_ca_cert().unwrap().unwrap().accessible);

        assert!(cmd.unset_ca_cert(&cancel).await.unwrap());
        assert!(!cmd.unset_ca_cert(&cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_ca_cert_is_not_stored() {
        let temp = TempDir::new().unwrap();
        let cmd = command(&temp);
        let bogus = temp.path().join("bogus.pem");
        std::fs::write(&bogus, "hello").unwrap();

        assert!(
            cmd.set_ca_cert(&bogus, &CancellationToken::new())
                .await
                .is_err()
        );
        assert_eq!(cmd.get_ca_cert().unwrap(), None);
    }

    #[tokio::test]
    async fn test_registry_url_lifecycle() {
        let temp = TempDir::new().unwrap();
        let cmd = command(&temp);
        let cancel = CancellationToken::new();

        assert!(
            cmd.set_registry_url("http://10.1.2.3/r.json", false, &cancel)
                .await
                .is_err()
        );
        cmd.set_registry_url("http://10.1.2.3/r.json", true, &cancel)
            .await
            .unwrap();
        assert_eq!(
            cmd.get_registry_url().unwrap(),
            Some(RegistryUrlSetting {
                url: "http://10.1.2.3/r.json".to_string(),
                allow_private_ip: true,
            })
        );

        assert!(cmd.unset_registry_url(&cancel).await.unwrap());
        assert_eq!(cmd.get_registry_url().unwrap(), None);
    }
}
