//! Typed view over the label scheme hive stamps on its containers.
//!
//! [`classify`] is the single place that interprets raw labels. It never
//! fails: missing or malformed values degrade to `None`, and callers decide
//! what a missing field means via [`WorkloadLabels::endpoint_for`].

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::endpoint::{ResolvedEndpoint, TransportKind};

/// Ownership marker; value must be `true`.
pub const LABEL_OWNER: &str = "hive";
pub const LABEL_NAME: &str = "hive-name";
pub const LABEL_TOOL_TYPE: &str = "hive-tool-type";
pub const LABEL_TRANSPORT: &str = "hive-transport";
pub const LABEL_PORT: &str = "hive-port";

/// Tool type eligible for client synchronization.
pub const TOOL_TYPE_MCP: &str = "mcp";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadLabels {
    pub display_name: Option<String>,
    pub tool_type: Option<String>,
    /// `None` when the label is absent or names an unknown transport.
    pub transport: Option<TransportKind>,
    pub raw_transport: Option<String>,
    /// `None` when the label is absent, unparsable or out of range.
    pub port: Option<u16>,
}

/// Why a running workload was left out of synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum SkipReason {
    NotMcp(Option<String>),
    MissingPort,
    UnsupportedTransport(Option<String>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotMcp(Some(tool)) => write!(f, "tool type '{tool}' is not mcp"),
            SkipReason::NotMcp(None) => f.write_str("no tool type label"),
            SkipReason::MissingPort => f.write_str("no usable port label"),
            SkipReason::UnsupportedTransport(Some(raw)) => {
                write!(f, "unsupported transport '{raw}'")
            }
            SkipReason::UnsupportedTransport(None) => f.write_str("no transport label"),
        }
    }
}

/// Parse raw labels into a [`WorkloadLabels`].
pub fn classify(labels: &HashMap<String, String>) -> WorkloadLabels {
    let non_empty = |key: &str| {
        labels
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let raw_transport = non_empty(LABEL_TRANSPORT);
    WorkloadLabels {
        display_name: non_empty(LABEL_NAME),
        tool_type: non_empty(LABEL_TOOL_TYPE),
        transport: raw_transport.as_deref().and_then(|raw| raw.parse().ok()),
        raw_transport,
        port: non_empty(LABEL_PORT).and_then(|raw| parse_port(&raw)),
    }
}

/// Whether the labels carry hive's ownership marker.
pub fn is_managed(labels: &HashMap<String, String>) -> bool {
    labels
        .get(LABEL_OWNER)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Plain decimal digits in 1..=65535. `u16::from_str` alone would take `+80`.
fn parse_port(raw: &str) -> Option<u16> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u16>().ok().filter(|port| *port != 0)
}

impl WorkloadLabels {
    /// Name to publish under: the display label, else the runtime name.
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.display_name.as_deref().unwrap_or(fallback)
    }

    pub fn is_mcp(&self) -> bool {
        self.tool_type.as_deref() == Some(TOOL_TYPE_MCP)
    }

    /// Resolve the endpoint for a workload, or the reason it is skipped.
    pub fn endpoint_for(&self, workload_name: &str) -> Result<ResolvedEndpoint, SkipReason> {
        if !self.is_mcp() {
            return Err(SkipReason::NotMcp(self.tool_type.clone()));
        }
        let port = self.port.ok_or(SkipReason::MissingPort)?;
        let transport = self
            .transport
            .ok_or_else(|| SkipReason::UnsupportedTransport(self.raw_transport.clone()))?;
        Ok(ResolvedEndpoint::new(
            self.name_or(workload_name),
            transport,
            port,
        ))
    }
}
