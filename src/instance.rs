//! Single-instance guard.
//!
//! A second launcher started while the first still runs must quit before it
//! resolves or spawns anything, so the bundled app is never started twice.

use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Process-wide lock keyed by the application identity.
pub trait InstanceLock {
    /// Try to take the lock without blocking.
    ///
    /// `Ok(true)` when this process now holds it, `Ok(false)` when another
    /// instance does. Once acquired the lock is held until the process exits.
    fn acquire(&mut self) -> std::io::Result<bool>;
}

/// Advisory exclusive lock on `<dir>/<app id>.lock`.
#[derive(Debug)]
pub struct FileInstanceLock {
    path: PathBuf,
    held: Option<File>,
}

impl FileInstanceLock {
    pub fn new(dir: &Path, app_id: &str) -> Self {
        Self {
            path: dir.join(format!("{app_id}.lock")),
            held: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InstanceLock for FileInstanceLock {
    fn acquire(&mut self) -> std::io::Result<bool> {
        if self.held.is_some() {
            return Ok(true);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.path)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "single-instance lock acquired");
                self.held = Some(file);
                Ok(true)
            }
            Err(e) if is_contended(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Another process holds the lock, as opposed to locking being broken.
fn is_contended(e: &std::io::Error) -> bool {
    let contended = fs2::lock_contended_error().raw_os_error();
    contended.is_some() && e.raw_os_error() == contended
}
