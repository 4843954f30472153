//! One launcher run: lock, resolve, spawn, report.
//!
//! Every branch ends in exactly one [`LaunchOutcome`]; the caller quits once
//! it has one. Nothing here loops, retries, or restarts the child.

use std::path::PathBuf;

use crate::child::{ExitInfo, ProcessSpawner, SpawnRequest};
use crate::config::LauncherConfig;
use crate::dialog::DialogPresenter;
use crate::environment::Environment;
use crate::instance::InstanceLock;
use crate::log_dir::LogDir;
use crate::resolve::{resolve_executable, Candidates, FileSystem};
use crate::sink::{AppendFile, LaunchLog};

/// Terminal state of a launcher run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Another instance holds the lock. Nothing was logged or shown.
    AlreadyRunning,
    /// Neither candidate exists; `path` is the one that was tried.
    ExecutableNotFound { path: PathBuf },
    /// The OS refused to start the child.
    SpawnFailed { path: PathBuf, error: String },
    /// The child ran and exited, successfully or not.
    Exited(ExitInfo),
}

/// Capabilities and inputs for a run.
pub struct Launcher<'a, F, S, D> {
    pub env: &'a Environment,
    pub config: &'a LauncherConfig,
    /// Variables merged into the child's environment.
    pub extra_env: Vec<(String, String)>,
    pub fs: &'a F,
    pub spawner: &'a S,
    pub dialogs: &'a D,
}

impl<F, S, D> Launcher<'_, F, S, D>
where
    F: FileSystem,
    S: ProcessSpawner,
    D: DialogPresenter,
{
    /// Take the single-instance lock and, if acquired, launch the child.
    pub async fn run(&self, lock: &mut impl InstanceLock) -> LaunchOutcome {
        match lock.acquire() {
            Ok(true) => {}
            Ok(false) => return LaunchOutcome::AlreadyRunning,
            Err(e) => {
                // An unusable lock directory must not stop the app from starting
                tracing::warn!(error = %e, "single-instance lock unavailable, continuing");
            }
        }
        self.launch().await
    }

    async fn launch(&self) -> LaunchOutcome {
        let app = &self.config.app.name;
        let logs = LogDir::new(&self.env.logs_dir, &self.config.app.log_prefix);
        let launch_log = LaunchLog::new(logs.launch_log());
        tracing::debug!(path = %launch_log.path().display(), "launch log");

        let candidates = Candidates::new(self.env, &self.config.executable);
        let attempt = resolve_executable(self.fs, &candidates);
        tracing::debug!(
            path = %attempt.candidate_path.display(),
            exists = attempt.exists,
            resolved_at = %attempt.timestamp,
            "executable resolved"
        );
        let exe = attempt.candidate_path;
        launch_log.line(&format!("Trying to spawn: {}", exe.display()));

        if !attempt.exists {
            self.dialogs
                .show_error(&format!("{app} not found"), &format!("Path:\n{}", exe.display()));
            return LaunchOutcome::ExecutableNotFound { path: exe };
        }

        let request = SpawnRequest {
            program: exe.clone(),
            args: Vec::new(),
            extra_env: self.extra_env.clone(),
        };
        let stdout = AppendFile::new(logs.stdout_log());
        let stderr = AppendFile::new(logs.stderr_log());

        match self.spawner.spawn_and_wait(&request, &stdout, &stderr).await {
            Err(e) => {
                let error = e.to_string();
                launch_log.line(&format!("Spawn error: {error}"));
                self.dialogs
                    .show_error(&format!("Failed to start {app}"), &error);
                LaunchOutcome::SpawnFailed { path: exe, error }
            }
            Ok(info) => {
                tracing::debug!(pid = info.pid, "child process reaped");
                launch_log.line(&format!(
                    "Child exited code={} signal={}",
                    or_null(info.code.map(|c| c.to_string())),
                    or_null(info.signal.clone()),
                ));
                if !info.is_success() {
                    self.dialogs.show_error(
                        &format!("{app} exited unexpectedly"),
                        &exit_summary(&info, &logs.stderr_log()),
                    );
                }
                LaunchOutcome::Exited(info)
            }
        }
    }
}

fn or_null(value: Option<String>) -> String {
    value.unwrap_or_else(|| "null".to_string())
}

/// Dialog body for an abnormal exit: code, signal, and where to look.
pub fn exit_summary(info: &ExitInfo, stderr_log: &std::path::Path) -> String {
    let code = info
        .code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string());
    let signal = info.signal.as_deref().unwrap_or("none");
    format!(
        "Exit code: {code}\nSignal: {signal}\nSee log:\n{}",
        stderr_log.display()
    )
}
