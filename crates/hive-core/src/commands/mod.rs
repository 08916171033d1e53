//! High-level commands for hive operations.
//!
//! These are the operations the `hive` CLI exposes; each takes its
//! dependencies explicitly so frontends and tests wire them the same way.

pub mod clients;
pub mod settings;

pub use clients::{ClientsCommand, RegisterReport, RemoveReport};
pub use settings::{CaCertStatus, RegistryUrlSetting, SettingsCommand};
