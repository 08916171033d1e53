//! Reconciliation of running workloads into client config files.
//!
//! A pass runs in this order:
//! 1. enumerate owned, running workloads (fatal on failure)
//! 2. locate config files of the target client (empty result is a no-op)
//! 3. classify each workload and resolve its endpoint
//! 4. upsert every endpoint into every file
//!
//! Step 4 runs one task per file, concurrently across files and in order
//! within a file. Per-item failures land in the [`SyncReport`].

pub mod report;

use std::sync::Arc;

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{ClientConfigFile, ClientType, ConfigLocator, filter_by_client_type};
use crate::config::{ConfigUpserter, UpsertStatus};
use crate::endpoint::ResolvedEndpoint;
use crate::error::SyncError;
use crate::runtime::WorkloadRuntime;
use crate::workload::{classify, list_eligible_workloads};

pub use report::{SkippedWorkload, SyncReport, UpsertOutcome, UpsertRecord};

pub struct ConfigSynchronizer {
    runtime: Arc<dyn WorkloadRuntime>,
    locator: Arc<dyn ConfigLocator>,
    upserter: ConfigUpserter,
}

impl ConfigSynchronizer {
    pub fn new(
        runtime: Arc<dyn WorkloadRuntime>,
        locator: Arc<dyn ConfigLocator>,
        upserter: ConfigUpserter,
    ) -> Self {
        Self {
            runtime,
            locator,
            upserter,
        }
    }

    /// Bring `client`'s config files in line with the running workloads.
    ///
    /// Only enumeration, discovery and cancellation during enumeration fail
    /// the call. A pass where every upsert failed still returns `Ok`.
    pub async fn synchronize(
        &self,
        client: ClientType,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        let workloads = list_eligible_workloads(self.runtime.as_ref(), cancel).await?;

        let files = filter_by_client_type(self.locator.find_config_files()?, client);
        let mut report = SyncReport::new(client);
        if files.is_empty() {
            debug!(client = %client, "No config files found for client");
            return Ok(report);
        }

        let mut endpoints = Vec::new();
        for workload in &workloads {
            let labels = classify(&workload.labels);
            match labels.endpoint_for(&workload.name) {
                Ok(endpoint) => endpoints.push(endpoint),
                Err(reason) => {
                    debug!(workload = %workload.name, reason = %reason, "Skipping workload");
                    report.skipped.push(SkippedWorkload {
                        workload: labels.name_or(&workload.name).to_string(),
                        reason,
                    });
                }
            }
        }

        let per_file = files
            .iter()
            .map(|file| self.upsert_into_file(file, &endpoints, cancel));
        for records in join_all(per_file).await {
            report.entries.extend(records);
        }
        report.sort();

        debug!(
            client = %client,
            files = files.len(),
            endpoints = endpoints.len(),
            added = report.added().count(),
            failed = report.failed().count(),
            "Synchronization pass finished"
        );
        Ok(report)
    }

    async fn upsert_into_file(
        &self,
        file: &ClientConfigFile,
        endpoints: &[ResolvedEndpoint],
        cancel: &CancellationToken,
    ) -> Vec<UpsertRecord> {
        let mut records = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let outcome = match self.upserter.upsert(file, endpoint, cancel).await {
                Ok(UpsertStatus::Added) => {
                    info!(
                        server = %endpoint.name,
                        client = %file.client_type,
                        "Added MCP server to client configuration"
                    );
                    UpsertOutcome::Added
                }
                Ok(UpsertStatus::AlreadyPresent) => UpsertOutcome::AlreadyPresent,
                Err(err) => {
                    warn!(
                        path = %file.path.display(),
                        server = %endpoint.name,
                        error = %err,
                        "Failed to update client configuration"
                    );
                    UpsertOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            records.push(UpsertRecord::new(endpoint, &file.path, outcome));
        }
        records
    }
}
