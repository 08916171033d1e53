//! Client registration and synchronization commands.

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::client::ClientType;
use crate::context::AppContext;
use crate::runtime::WorkloadRuntime;
use crate::sync::SyncReport;

/// Result of registering a client
#[derive(Debug, Clone, Serialize)]
pub struct RegisterReport {
    pub client: ClientType,
    /// False when the client was already registered
    pub newly_registered: bool,
    /// Report of the follow-up synchronization, if it ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncReport>,
    /// Why the follow-up synchronization failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
}

/// Result of removing a client
#[derive(Debug, Clone, Serialize)]
pub struct RemoveReport {
    pub client: ClientType,
    /// False when the client was not registered
    pub removed: bool,
}

/// Client command orchestrator
pub struct ClientsCommand {
    ctx: AppContext,
    runtime: Arc<dyn WorkloadRuntime>,
}

impl ClientsCommand {
    pub fn new(ctx: AppContext, runtime: Arc<dyn WorkloadRuntime>) -> Self {
        Self { ctx, runtime }
    }

    /// Register `client` and immediately sync running workloads into it.
    ///
    /// A failed sync is reported, never returned as an error.
    pub async fn register(
        &self,
        client: ClientType,
        cancel: &CancellationToken,
    ) -> anyhow::Result<RegisterReport> {
        let store = self.ctx.settings_store();
        let newly_registered = store
            .register_client(client, cancel)
            .await
            .with_context(|| format!("Failed to register client {client}"))?;

        let settings = store.load()?;
        let synchronizer = self.ctx.synchronizer(self.runtime.clone(), &settings);
        let (sync, sync_error) = match synchronizer.synchronize(client, cancel).await {
            Ok(report) => (Some(report), None),
            Err(err) => {
                warn!(client = %client, error = %err, "Failed to sync running servers to new client");
                (None, Some(err.to_string()))
            }
        };

        Ok(RegisterReport {
            client,
            newly_registered,
            sync,
            sync_error,
        })
    }

    /// Unregister `client`. Its config files are left untouched.
    pub async fn remove(
        &self,
        client: ClientType,
        cancel: &CancellationToken,
    ) -> anyhow::Result<RemoveReport> {
        let removed = self
            .ctx
            .settings_store()
            .remove_client(client, cancel)
            .await
            .with_context(|| format!("Failed to remove client {client}"))?;
        Ok(RemoveReport { client, removed })
    }

    pub fn list(&self) -> anyhow::Result<Vec<ClientType>> {
        self.ctx.settings_store().registered_clients()
    }

    /// Sync one registered client, or every registered client when `None`.
    pub async fn sync(
        &self,
        client: Option<ClientType>,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<SyncReport>> {
        let settings = self.ctx.settings_store().load()?;
        let targets = match client {
            Some(client) if !settings.is_registered(client) => anyhow::bail!(
                "client {client} is not registered; run `hive config register-client {client}` first"
            ),
            Some(client) => vec![client],
            None => settings.clients.registered_clients.clone(),
        };

        let synchronizer = self.ctx.synchronizer(self.runtime.clone(), &settings);
        let mut reports = Vec::with_capacity(targets.len());
        for target in targets {
            let report = synchronizer
                .synchronize(target, cancel)
                .await
                .with_context(|| format!("Failed to sync client {target}"))?;
            reports.push(report);
        }
        Ok(reports)
    }
}
