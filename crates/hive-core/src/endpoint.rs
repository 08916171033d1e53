//! Connection endpoints for running MCP workloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Loopback host every managed workload is published on.
pub const LOCALHOST_IPV4: &str = "127.0.0.1";

/// Path served by the SSE proxy (used for both `sse` and `stdio` workloads).
pub const SSE_ENDPOINT_PATH: &str = "/sse";

/// Path served by streamable HTTP workloads.
pub const STREAMABLE_HTTP_ENDPOINT_PATH: &str = "/mcp";

/// How a workload exposes its MCP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    Stdio,
    Sse,
    StreamableHttp,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Stdio => "stdio",
            TransportKind::Sse => "sse",
            TransportKind::StreamableHttp => "streamable-http",
        }
    }

    /// Value clients expect in a `"type"` field next to the URL.
    pub fn client_type_field(self) -> &'static str {
        match self {
            // stdio workloads are fronted by the SSE proxy
            TransportKind::Stdio | TransportKind::Sse => "sse",
            TransportKind::StreamableHttp => "http",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(TransportKind::Stdio),
            "sse" => Ok(TransportKind::Sse),
            "streamable-http" => Ok(TransportKind::StreamableHttp),
            other => anyhow::bail!("Unknown transport: {}", other),
        }
    }
}

/// An endpoint ready to be written into client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoint {
    pub name: String,
    pub url: String,
    pub transport: TransportKind,
}

impl ResolvedEndpoint {
    pub fn new(name: impl Into<String>, transport: TransportKind, port: u16) -> Self {
        let name = name.into();
        let url = resolve_url(&name, transport, port);
        Self {
            name,
            url,
            transport,
        }
    }
}

/// Build the canonical URL for a workload.
///
/// Pure: the same inputs always produce the same bytes, which is what makes
/// presence checks in client files stable across runs.
pub fn resolve_url(name: &str, transport: TransportKind, port: u16) -> String {
    match transport {
        TransportKind::Stdio | TransportKind::Sse => {
            format!("http://{LOCALHOST_IPV4}:{port}{SSE_ENDPOINT_PATH}#{name}")
        }
        TransportKind::StreamableHttp => {
            format!("http://{LOCALHOST_IPV4}:{port}{STREAMABLE_HTTP_ENDPOINT_PATH}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_url_carries_workload_fragment() {
        assert_eq!(
            resolve_url("fetch-server", TransportKind::Sse, 8080),
            "http://127.0.0.1:8080/sse#fetch-server"
        );
    }

    #[test]
    fn test_stdio_uses_sse_proxy_url() {
        assert_eq!(
            resolve_url("github", TransportKind::Stdio, 43210),
            "http://127.0.0.1:43210/sse#github"
        );
    }

    #[test]
    fn test_streamable_http_url() {
        assert_eq!(
            resolve_url("time", TransportKind::StreamableHttp, 9000),
            "http://127.0.0.1:9000/mcp"
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let first = resolve_url("fetch", TransportKind::Sse, 1);
        for _ in 0..10 {
            assert_eq!(resolve_url("fetch", TransportKind::Sse, 1), first);
        }
    }

    #[test]
    fn test_resolved_url_parses() {
        let endpoint = ResolvedEndpoint::new("fetch", TransportKind::Sse, 8080);
        let parsed = url::Url::parse(&endpoint.url).expect("url should parse");
        assert_eq!(parsed.host_str(), Some("127.0.0.1"));
        assert_eq!(parsed.port(), Some(8080));
        assert_eq!(parsed.path(), "/sse");
        assert_eq!(parsed.fragment(), Some("fetch"));
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!(
            "streamable-http".parse::<TransportKind>().unwrap(),
            TransportKind::StreamableHttp
        );
        assert_eq!(" SSE ".parse::<TransportKind>().unwrap(), TransportKind::Sse);
        assert!("websocket".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_client_type_field() {
        assert_eq!(TransportKind::Stdio.client_type_field(), "sse");
        assert_eq!(TransportKind::Sse.client_type_field(), "sse");
        assert_eq!(TransportKind::StreamableHttp.client_type_field(), "http");
    }
}
