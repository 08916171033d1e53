//! Filesystem primitives shared across features.

pub mod atomic;
pub mod lock;

pub use atomic::{atomic_write, resolve_target};
pub use lock::{FileLockGuard, FileLocks};
