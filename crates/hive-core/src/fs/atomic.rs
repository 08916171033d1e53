//! Crash-safe file replacement.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Upper bound on symlink hops followed for a dangling link.
const MAX_LINK_HOPS: usize = 40;

/// File that a write to `path` should replace, after following symlinks.
///
/// Renaming over a symlink would replace the link, so callers write to the
/// target instead. A dangling link resolves to where it points. Any other
/// path that cannot be resolved is returned unchanged.
pub fn resolve_target(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }
    let mut current = path.to_path_buf();
    for _ in 0..MAX_LINK_HOPS {
        let Ok(next) = std::fs::read_link(&current) else {
            break;
        };
        current = match current.parent() {
            Some(parent) if next.is_relative() => parent.join(next),
            _ => next,
        };
    }
    current
}

/// Write `data` to `path` via a temp file in the same directory + rename.
///
/// Readers see either the old contents or the new ones, never a prefix.
/// Parent directories are created as needed. `path` itself is replaced, so
/// pass it through [`resolve_target`] first to keep symlinks.
pub fn atomic_write(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;
    tmp.write_all(data)
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temp file for: {}", path.display()))?;

    // Keep the original file's permissions; client configs may hold secrets.
    if let Ok(meta) = std::fs::metadata(path) {
        let _ = std::fs::set_permissions(tmp.path(), meta.permissions());
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace config file: {}", path.display()))?;
    Ok(())
}
