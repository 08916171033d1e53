//! Locked, idempotent insertion of one server entry into a client file.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{extract_map_at_path, jsonc, serializer_for, set_map_at_path};
use crate::client::ClientConfigFile;
use crate::endpoint::ResolvedEndpoint;
use crate::error::UpsertError;
use crate::fs::{FileLocks, atomic_write, resolve_target};

/// Result of a successful upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpsertStatus {
    /// The entry was inserted and the file rewritten.
    Added,
    /// An entry with this name already existed; the file was not touched.
    AlreadyPresent,
}

/// Inserts endpoints into client config files under a per-file lock.
#[derive(Debug, Clone)]
pub struct ConfigUpserter {
    locks: FileLocks,
}

impl ConfigUpserter {
    pub fn new(locks: FileLocks) -> Self {
        Self { locks }
    }

    pub fn locks(&self) -> &FileLocks {
        &self.locks
    }

    /// Ensure `file` has an entry named `endpoint.name`.
    ///
    /// Existing entries are never overwritten. The lock is held from the
    /// read through the write. A symlinked file is locked and written at its
    /// target, leaving the link in place.
    pub async fn upsert(
        &self,
        file: &ClientConfigFile,
        endpoint: &ResolvedEndpoint,
        cancel: &CancellationToken,
    ) -> Result<UpsertStatus, UpsertError> {
        let target = resolve_target(&file.path);
        let guard = self.locks.acquire(&target, cancel).await?;

        let file = file.clone();
        let endpoint = endpoint.clone();
        let status = tokio::task::spawn_blocking(move || {
            let status = upsert_locked(&file, &target, &endpoint);
            drop(guard);
            status
        })
        .await
        .map_err(|err| UpsertError::Task(err.to_string()))??;

        Ok(status)
    }
}

fn upsert_locked(
    file: &ClientConfigFile,
    target: &Path,
    endpoint: &ResolvedEndpoint,
) -> anyhow::Result<UpsertStatus> {
    let serializer = serializer_for(file);
    let content = serializer.read(target)?;
    let mut root = serializer
        .parse(&content)
        .with_context(|| format!("Failed to parse JSON config: {}", file.path.display()))?;
    let servers_path = file.layout.servers_path;
    let mut servers = extract_map_at_path(&root, servers_path)
        .with_context(|| format!("Invalid servers section in: {}", file.path.display()))?;

    if servers.contains_key(&endpoint.name) {
        debug!(
            server = %endpoint.name,
            path = %file.path.display(),
            "Server entry already present"
        );
        return Ok(UpsertStatus::AlreadyPresent);
    }

    let entry = file.layout.render_entry(endpoint);
    if serializer.tolerates_comments() {
        let updated = jsonc::insert_entry(&content, servers_path, &endpoint.name, &entry)
            .with_context(|| format!("Failed to edit config file: {}", file.path.display()))?;
        atomic_write(target, updated.as_bytes())?;
    } else {
        servers.insert(endpoint.name.clone(), entry);
        set_map_at_path(&mut root, servers_path, servers)
            .with_context(|| format!("Invalid servers section in: {}", file.path.display()))?;
        serializer.save(target, &root)?;
    }

    debug!(
        server = %endpoint.name,
        path = %file.path.display(),
        url = %endpoint.url,
        "Server entry added"
    );
    Ok(UpsertStatus::Added)
}
