//! Per-path advisory locks for client config files.
//!
//! Each protected path gets a sidecar lock file under a hive-owned
//! directory, named by the blake3 hash of the protected path. The client's
//! own file is replaced by rename on write, so it cannot carry the lock
//! itself.
//!
//! # Synchronization protocol
//!
//! - **What is protected**: the read-modify-write cycle of one target path.
//! - **Who can mutate**: only the holder of the exclusive `flock` on the
//!   sidecar file.
//! - **Lock ordering**: one lock per target; never nested.
//! - **Release**: when the [`FileLockGuard`] is dropped, on every exit path.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::resolve_target;
use crate::error::UpsertError;

/// Default upper bound on waiting for a contended lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay between non-blocking lock attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct FileLocks {
    lock_dir: PathBuf,
    timeout: Duration,
    poll_interval: Duration,
}

impl FileLocks {
    pub fn new(lock_dir: PathBuf) -> Self {
        Self {
            lock_dir,
            timeout: DEFAULT_LOCK_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    /// Sidecar lock file guarding `target`.
    ///
    /// Symlinks are resolved first, so a link and its target share one lock.
    pub fn lock_path_for(&self, target: &Path) -> PathBuf {
        let resolved = resolve_target(target);
        let absolute = std::path::absolute(&resolved).unwrap_or(resolved);
        let hash = blake3::hash(absolute.to_string_lossy().as_bytes());
        self.lock_dir.join(format!("{}.lock", hash.to_hex()))
    }

    /// Acquire the exclusive lock for `target`.
    ///
    /// Fails with [`UpsertError::Cancelled`] if `cancel` fires first and with
    /// [`UpsertError::LockTimeout`] once the configured timeout elapses.
    pub async fn acquire(
        &self,
        target: &Path,
        cancel: &CancellationToken,
    ) -> Result<FileLockGuard, UpsertError> {
        if cancel.is_cancelled() {
            return Err(UpsertError::Cancelled);
        }

        let lock_path = self.lock_path_for(target);
        let file = self
            .open_lock_file(&lock_path)
            .map_err(|source| UpsertError::Lock {
                path: target.to_path_buf(),
                source,
            })?;

        let started = Instant::now();
        loop {
            let acquired =
                try_acquire_exclusive_nonblocking(&file).map_err(|source| UpsertError::Lock {
                    path: target.to_path_buf(),
                    source,
                })?;
            if acquired {
                return Ok(FileLockGuard {
                    file,
                    target: target.to_path_buf(),
                });
            }

            if started.elapsed() >= self.timeout {
                return Err(UpsertError::LockTimeout {
                    path: target.to_path_buf(),
                    timeout: self.timeout,
                });
            }

            tokio::select! {
                () = cancel.cancelled() => return Err(UpsertError::Cancelled),
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    fn open_lock_file(&self, lock_path: &Path) -> io::Result<File> {
        std::fs::create_dir_all(&self.lock_dir)?;
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(lock_path)
    }
}

/// Held lock on one target path. Dropping it releases the lock.
#[derive(Debug)]
pub struct FileLockGuard {
    file: File,
    target: PathBuf,
}

impl FileLockGuard {
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        // Closing the descriptor would release it too.
        let _ = release(&self.file);
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn try_acquire_exclusive_nonblocking(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    // SAFETY: `fd` comes from an open `std::fs::File` that outlives this call.
    // `LOCK_EX | LOCK_NB` is a valid `flock` operation.
    let rc = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        return Ok(false);
    }
    Err(err)
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn release(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    // SAFETY: `fd` is valid for the lifetime of `file`; `LOCK_UN` cannot cause UB.
    let rc = unsafe { libc::flock(fd, libc::LOCK_UN) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

// TODO: use LockFileEx on Windows; until then only the atomic rename protects writers.
#[cfg(not(unix))]
fn try_acquire_exclusive_nonblocking(_: &File) -> io::Result<bool> {
    Ok(true)
}

#[cfg(not(unix))]
fn release(_: &File) -> io::Result<()> {
    Ok(())
}
