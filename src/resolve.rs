use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::config::ExecutableConfig;
use crate::environment::Environment;

/// Read-only view of the filesystem used for path resolution.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Production and development locations of the bundled executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub production: PathBuf,
    pub development: PathBuf,
}

impl Candidates {
    pub fn new(env: &Environment, exe: &ExecutableConfig) -> Self {
        Self {
            production: env.resources_dir.join(&exe.bundle),
            development: env.install_dir.join(&exe.dev_root).join(&exe.bundle),
        }
    }
}

/// Outcome of path resolution for one launcher run.
#[derive(Debug, Clone)]
pub struct LaunchAttempt {
    pub candidate_path: PathBuf,
    pub exists: bool,
    pub timestamp: DateTime<Utc>,
}

/// Pick the executable to launch from the current filesystem state.
///
/// Production wins when present, then development. When neither exists the
/// production path is returned with `exists == false`.
pub fn resolve_executable(fs: &impl FileSystem, candidates: &Candidates) -> LaunchAttempt {
    let timestamp = Utc::now();
    for path in [&candidates.production, &candidates.development] {
        if fs.exists(path) {
            return LaunchAttempt {
                candidate_path: path.clone(),
                exists: true,
                timestamp,
            };
        }
    }
    LaunchAttempt {
        candidate_path: candidates.production.clone(),
        exists: false,
        timestamp,
    }
}
