//! Client applications that consume MCP server endpoints.
//!
//! Each supported client keeps its MCP servers in one or more JSON files
//! with a client-specific shape:
//! - where the servers map lives (`mcpServers`, `servers`, `mcp.servers`)
//! - which key holds the URL (`url` or `serverUrl`)
//! - whether a `"type"` field accompanies the URL
//!
//! [`ConfigLayout`] captures that shape; [`locator`] finds the files.

pub mod locator;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::endpoint::ResolvedEndpoint;

pub use locator::{ClientConfigLocator, ConfigLocator, Platform, filter_by_client_type};

/// Supported client applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClientType {
    /// Claude Code CLI
    #[serde(rename = "claude-code")]
    ClaudeCode,
    /// Cline extension for VS Code
    #[serde(rename = "cline")]
    Cline,
    /// Cursor editor
    #[serde(rename = "cursor")]
    Cursor,
    /// Roo Code extension for VS Code
    #[serde(rename = "roo-code")]
    RooCode,
    /// Visual Studio Code
    #[serde(rename = "vscode")]
    VSCode,
    /// Visual Studio Code Insiders edition
    #[serde(rename = "vscode-insider")]
    VSCodeInsider,
    /// Windsurf IDE
    #[serde(rename = "windsurf")]
    Windsurf,
    /// Windsurf plugin for IntelliJ
    #[serde(rename = "windsurf-intellij")]
    WindsurfIntellij,
}

impl ClientType {
    pub const ALL: [ClientType; 8] = [
        ClientType::ClaudeCode,
        ClientType::Cline,
        ClientType::Cursor,
        ClientType::RooCode,
        ClientType::VSCode,
        ClientType::VSCodeInsider,
        ClientType::Windsurf,
        ClientType::WindsurfIntellij,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ClientType::ClaudeCode => "claude-code",
            ClientType::Cline => "cline",
            ClientType::Cursor => "cursor",
            ClientType::RooCode => "roo-code",
            ClientType::VSCode => "vscode",
            ClientType::VSCodeInsider => "vscode-insider",
            ClientType::Windsurf => "windsurf",
            ClientType::WindsurfIntellij => "windsurf-intellij",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ClientType::ClaudeCode => "Claude Code CLI",
            ClientType::Cline => "Cline extension for VS Code",
            ClientType::Cursor => "Cursor editor",
            ClientType::RooCode => "Roo Code extension for VS Code",
            ClientType::VSCode => "Visual Studio Code",
            ClientType::VSCodeInsider => "Visual Studio Code Insiders edition",
            ClientType::Windsurf => "Windsurf IDE",
            ClientType::WindsurfIntellij => "Windsurf plugin for IntelliJ",
        }
    }

    /// Comma-separated list of valid ids, for error messages.
    pub fn valid_ids() -> String {
        Self::ALL
            .iter()
            .map(|c| c.id())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ClientType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.id() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "invalid client type: {} (valid types: {})",
                    wanted,
                    Self::valid_ids()
                )
            })
    }
}

/// Shape of the MCP servers section inside a client's config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigLayout {
    /// Path of nested object keys leading to the servers map.
    pub servers_path: &'static [&'static str],
    /// Key holding the endpoint URL inside a server entry.
    pub url_key: &'static str,
    /// Whether entries carry a `"type"` field (`sse` / `http`).
    pub include_type: bool,
    /// File may contain comments and trailing commas.
    pub jsonc: bool,
}

impl ConfigLayout {
    pub const MCP_SERVERS: ConfigLayout = ConfigLayout {
        servers_path: &["mcpServers"],
        url_key: "url",
        include_type: false,
        jsonc: false,
    };

    pub const MCP_SERVERS_TYPED: ConfigLayout = ConfigLayout {
        include_type: true,
        ..Self::MCP_SERVERS
    };

    pub const WINDSURF: ConfigLayout = ConfigLayout {
        url_key: "serverUrl",
        ..Self::MCP_SERVERS
    };

    pub const VSCODE_MCP_JSON: ConfigLayout = ConfigLayout {
        servers_path: &["servers"],
        url_key: "url",
        include_type: true,
        jsonc: true,
    };

    pub const VSCODE_SETTINGS: ConfigLayout = ConfigLayout {
        servers_path: &["mcp", "servers"],
        ..Self::VSCODE_MCP_JSON
    };

    /// Render one server entry in this layout.
    pub fn render_entry(&self, endpoint: &ResolvedEndpoint) -> Value {
        let mut obj = Map::new();
        if self.include_type {
            obj.insert(
                "type".to_string(),
                json!(endpoint.transport.client_type_field()),
            );
        }
        obj.insert(self.url_key.to_string(), json!(endpoint.url));
        Value::Object(obj)
    }
}

/// A located configuration file belonging to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfigFile {
    pub client_type: ClientType,
    pub path: PathBuf,
    pub layout: ConfigLayout,
}

impl ClientConfigFile {
    pub fn new(client_type: ClientType, path: PathBuf, layout: ConfigLayout) -> Self {
        Self {
            client_type,
            path,
            layout,
        }
    }
}
