//! Hive Core Library
//!
//! Keeps MCP client applications pointed at the MCP servers hive runs as
//! containers: running workloads are read from the container runtime,
//! classified by their labels, and upserted into every registered
//! client's config files.

pub mod client;
pub mod commands;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod fs;
pub mod runtime;
pub mod sync;
pub mod workload;

/// Re-exports of commonly used types
pub mod prelude {
    // Errors
    pub use crate::error::{DiscoveryError, RuntimeError, SyncError, UpsertError};

    // Runtime and workloads
    pub use crate::runtime::{DockerCliRuntime, Workload, WorkloadRuntime, WorkloadState};
    pub use crate::workload::{SkipReason, WorkloadLabels, classify};

    // Endpoints
    pub use crate::endpoint::{ResolvedEndpoint, TransportKind, resolve_url};

    // Clients
    pub use crate::client::{
        ClientConfigFile, ClientConfigLocator, ClientType, ConfigLayout, ConfigLocator, Platform,
    };

    // Configuration
    pub use crate::config::{ConfigUpserter, Settings, SettingsStore, UpsertStatus};

    // Synchronization
    pub use crate::sync::{ConfigSynchronizer, SyncReport, UpsertOutcome, UpsertRecord};

    // Commands
    pub use crate::commands::{ClientsCommand, SettingsCommand};
    pub use crate::context::AppContext;
}
