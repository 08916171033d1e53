//! Configuration: hive's own settings and third-party client config files.
//!
//! - [`store`]: `config.toml` (registered clients, CA cert, registry URL)
//! - [`client_config`]: reading and upserting client MCP config files

pub mod client_config;
pub mod parser;
pub mod schema;
pub mod store;
pub mod validate;

pub use client_config::{ConfigUpserter, JsonSerializer, UpsertStatus};
pub use parser::{parse_settings, parse_settings_str, to_toml};
pub use schema::{ClientsSection, Settings, SyncSettings};
pub use store::{SETTINGS_FILE_NAME, SettingsStore};
pub use validate::{validate_ca_certificate, validate_registry_url};

/// Default hive config directory (`<platform config dir>/hive`).
pub fn default_config_dir() -> anyhow::Result<std::path::PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("hive"))
}
