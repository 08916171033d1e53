//! Structured outcome of one synchronization pass.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::client::ClientType;
use crate::endpoint::ResolvedEndpoint;
use crate::workload::SkipReason;

/// Outcome of upserting one endpoint into one config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum UpsertOutcome {
    Added,
    AlreadyPresent,
    Failed { reason: String },
}

impl UpsertOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, UpsertOutcome::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            UpsertOutcome::Added => "added",
            UpsertOutcome::AlreadyPresent => "already-present",
            UpsertOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertRecord {
    pub server: String,
    pub path: PathBuf,
    pub url: String,
    pub outcome: UpsertOutcome,
}

impl UpsertRecord {
    pub fn new(endpoint: &ResolvedEndpoint, path: &Path, outcome: UpsertOutcome) -> Self {
        Self {
            server: endpoint.name.clone(),
            path: path.to_path_buf(),
            url: endpoint.url.clone(),
            outcome,
        }
    }
}

/// A running, hive-owned workload that produced no endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedWorkload {
    pub workload: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub client: ClientType,
    pub entries: Vec<UpsertRecord>,
    pub skipped: Vec<SkippedWorkload>,
}

impl SyncReport {
    pub fn new(client: ClientType) -> Self {
        Self {
            client,
            entries: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn added(&self) -> impl Iterator<Item = &UpsertRecord> {
        self.entries
            .iter()
            .filter(|r| r.outcome == UpsertOutcome::Added)
    }

    pub fn already_present(&self) -> impl Iterator<Item = &UpsertRecord> {
        self.entries
            .iter()
            .filter(|r| r.outcome == UpsertOutcome::AlreadyPresent)
    }

    pub fn failed(&self) -> impl Iterator<Item = &UpsertRecord> {
        self.entries.iter().filter(|r| r.outcome.is_failed())
    }

    /// No upserts were attempted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// At least one upsert ran and none succeeded.
    pub fn all_failed(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|r| r.outcome.is_failed())
    }

    /// Order entries by server name, then by file path.
    pub fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| (&a.server, &a.path).cmp(&(&b.server, &b.path)));
        self.skipped.sort_by(|a, b| a.workload.cmp(&b.workload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::TransportKind;
    use serde_json::json;

    fn record(name: &str, path: &str, outcome: UpsertOutcome) -> UpsertRecord {
        let endpoint = ResolvedEndpoint::new(name, TransportKind::Sse, 8080);
        UpsertRecord::new(&endpoint, Path::new(path), outcome)
    }

    #[test]
    fn test_counts_and_all_failed() {
        let mut report = SyncReport::new(ClientType::VSCode);
        assert!(report.is_empty());
        assert!(!report.all_failed());

        report.entries.push(record(
            "a",
            "/x",
            UpsertOutcome::Failed {
                reason: "boom".into(),
            },
        ));
        assert!(report.all_failed());

        report.entries.push(record("b", "/x", UpsertOutcome::Added));
        assert!(!report.all_failed());
        assert_eq!(report.added().count(), 1);
        assert_eq!(report.failed().count(), 1);
        assert_eq!(report.already_present().count(), 0);
    }

    #[test]
    fn test_sort_by_server_then_path() {
        let mut report = SyncReport::new(ClientType::VSCode);
        report.entries = vec![
            record("b", "/settings.json", UpsertOutcome::Added),
            record("a", "/settings.json", UpsertOutcome::Added),
            record("a", "/mcp.json", UpsertOutcome::AlreadyPresent),
        ];
        report.sort();

        let order: Vec<_> = report
            .entries
            .iter()
            .map(|r| (r.server.as_str(), r.path.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a", "/mcp.json".to_string()),
                ("a", "/settings.json".to_string()),
                ("b", "/settings.json".to_string()),
            ]
        );
    }

    #[test]
    fn test_json_shape() {
        let mut report = SyncReport::new(ClientType::Cursor);
        report.entries.push(record(
            "fetch",
            "/home/u/.cursor/mcp.json",
            UpsertOutcome::Failed {
                reason: "locked".into(),
            },
        ));
        report.skipped.push(SkippedWorkload {
            workload: "db".into(),
            reason: SkipReason::MissingPort,
        });

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "client": "cursor",
                "entries": [{
                    "server": "fetch",
                    "path": "/home/u/.cursor/mcp.json",
                    "url": "http://127.0.0.1:8080/sse#fetch",
                    "outcome": { "status": "failed", "reason": "locked" }
                }],
                "skipped": [{ "workload": "db", "reason": { "kind": "missing-port" } }]
            })
        );
    }
}
