//! Discovery of client configuration files on disk.
//!
//! Every client type has a fixed, platform-specific set of candidate paths
//! relative to the user's home directory. Only candidates that exist as
//! regular files are returned; a candidate that cannot be probed is skipped.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ClientConfigFile, ClientType, ConfigLayout};
use crate::error::DiscoveryError;

/// Operating system family, for editor data directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// VS Code-family user data directory for the given product folder.
    fn code_user_dir(self, home: &Path, product: &str) -> PathBuf {
        let base = match self {
            Platform::Linux => home.join(".config"),
            Platform::MacOs => home.join("Library").join("Application Support"),
            Platform::Windows => home.join("AppData").join("Roaming"),
        };
        base.join(product).join("User")
    }
}

/// Source of client configuration files.
pub trait ConfigLocator: Send + Sync {
    /// Find config files for every client this locator targets.
    fn find_config_files(&self) -> Result<Vec<ClientConfigFile>, DiscoveryError>;
}

/// Keep only files belonging to `client_type`.
pub fn filter_by_client_type(
    files: Vec<ClientConfigFile>,
    client_type: ClientType,
) -> Vec<ClientConfigFile> {
    files
        .into_iter()
        .filter(|f| f.client_type == client_type)
        .collect()
}

/// Filesystem locator driven by the registered-clients list.
#[derive(Debug, Clone)]
pub struct ClientConfigLocator {
    home_dir: Option<PathBuf>,
    platform: Platform,
    clients: Vec<ClientType>,
}

impl ClientConfigLocator {
    pub fn new(home_dir: Option<PathBuf>, platform: Platform, clients: Vec<ClientType>) -> Self {
        Self {
            home_dir,
            platform,
            clients,
        }
    }

    /// Locator for the current user and platform.
    pub fn for_current_user(clients: Vec<ClientType>) -> Self {
        Self::new(dirs::home_dir(), Platform::current(), clients)
    }

    pub fn clients(&self) -> &[ClientType] {
        &self.clients
    }

    /// All candidate paths for a client, whether or not they exist.
    pub fn candidates(
        &self,
        client_type: ClientType,
    ) -> Result<Vec<(PathBuf, ConfigLayout)>, DiscoveryError> {
        let home = self
            .home_dir
            .as_deref()
            .ok_or(DiscoveryError::HomeDirUnavailable)?;
        let code = |product: &str| self.platform.code_user_dir(home, product);

        let candidates = match client_type {
            ClientType::ClaudeCode => {
                vec![(home.join(".claude.json"), ConfigLayout::MCP_SERVERS_TYPED)]
            }
            ClientType::Cline => vec![(
                code("Code")
                    .join("globalStorage")
                    .join("saoudrizwan.claude-dev")
                    .join("settings")
                    .join("cline_mcp_settings.json"),
                ConfigLayout::MCP_SERVERS,
            )],
            ClientType::Cursor => vec![(
                home.join(".cursor").join("mcp.json"),
                ConfigLayout::MCP_SERVERS,
            )],
            ClientType::RooCode => vec![(
                code("Code")
                    .join("globalStorage")
                    .join("rooveterinaryinc.roo-cline")
                    .join("settings")
                    .join("mcp_settings.json"),
                ConfigLayout::MCP_SERVERS,
            )],
            ClientType::VSCode => vscode_candidates(code("Code")),
            ClientType::VSCodeInsider => vscode_candidates(code("Code - Insiders")),
            ClientType::Windsurf => vec![(
                home.join(".codeium")
                    .join("windsurf")
                    .join("mcp_config.json"),
                ConfigLayout::WINDSURF,
            )],
            ClientType::WindsurfIntellij => vec![(
                home.join(".codeium").join("mcp_config.json"),
                ConfigLayout::WINDSURF,
            )],
        };
        Ok(candidates)
    }
}

fn vscode_candidates(user_dir: PathBuf) -> Vec<(PathBuf, ConfigLayout)> {
    vec![
        (user_dir.join("mcp.json"), ConfigLayout::VSCODE_MCP_JSON),
        (user_dir.join("settings.json"), ConfigLayout::VSCODE_SETTINGS),
    ]
}

impl ConfigLocator for ClientConfigLocator {
    fn find_config_files(&self) -> Result<Vec<ClientConfigFile>, DiscoveryError> {
        let mut found = Vec::new();
        for &client_type in &self.clients {
            for (path, layout) in self.candidates(client_type)? {
                match std::fs::metadata(&path) {
                    Ok(meta) if meta.is_file() => {
                        found.push(ClientConfigFile::new(client_type, path, layout));
                    }
                    Ok(_) => debug!(path = %path.display(), "Config candidate is not a file"),
                    Err(err) => {
                        debug!(path = %path.display(), error = %err, "Config candidate not present")
                    }
                }
            }
        }
        Ok(found)
    }
}
