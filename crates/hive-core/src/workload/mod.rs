//! Workload enumeration and classification.
//!
//! Turns the runtime's raw listing into the set of workloads hive owns and
//! that are currently running. See [`labels`] for how their metadata is read.

pub mod labels;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::SyncError;
use crate::runtime::{Workload, WorkloadRuntime};

pub use labels::{SkipReason, WorkloadLabels, classify, is_managed};

/// List running workloads carrying hive's ownership marker.
///
/// Order is whatever the runtime returned. Cancelling `cancel` while the
/// runtime is being queried aborts with [`SyncError::Cancelled`].
pub async fn list_eligible_workloads(
    runtime: &dyn WorkloadRuntime,
    cancel: &CancellationToken,
) -> Result<Vec<Workload>, SyncError> {
    let workloads = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(SyncError::Cancelled),
        listed = runtime.list_workloads() => listed?,
    };

    let total = workloads.len();
    let eligible: Vec<Workload> = workloads
        .into_iter()
        .filter(|w| is_managed(&w.labels) && w.state.is_running())
        .collect();

    debug!(total, eligible = eligible.len(), "Enumerated workloads");
    Ok(eligible)
}
