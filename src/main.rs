#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod child;
mod config;
mod dialog;
mod environment;
mod instance;
mod launcher;
mod log_dir;
mod resolve;
mod signals;
mod sink;

use child::TokioSpawner;
use config::LauncherConfig;
use dialog::SystemDialog;
use environment::Environment;
use instance::FileInstanceLock;
use launcher::{LaunchOutcome, Launcher};
use resolve::OsFileSystem;

/// Starts the bundled desktop app detached, forwards its output to log
/// files, and exits once the app exits or fails to start.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bundle_launcher=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = LauncherConfig::load_embedded();
    tracing::debug!(?config, "loaded launcher config");

    let env = Environment::detect(&config.app.name);
    tracing::debug!(?env, "launcher environment");

    let mut lock = FileInstanceLock::new(&env.lock_dir, &config.app.id);
    tracing::debug!(lock = %lock.path().display(), "single-instance lock file");

    let switch = std::env::var(config::DEBUG_SWITCH).ok();
    let launcher = Launcher {
        env: &env,
        config: &config,
        extra_env: config.debug_env(switch.as_deref()),
        fs: &OsFileSystem,
        spawner: &TokioSpawner,
        dialogs: &SystemDialog,
    };

    match launcher.run(&mut lock).await {
        LaunchOutcome::AlreadyRunning => {}
        LaunchOutcome::ExecutableNotFound { path } => {
            tracing::error!(path = %path.display(), "bundled executable not found");
        }
        LaunchOutcome::SpawnFailed { path, error } => {
            tracing::error!(path = %path.display(), %error, "bundled executable failed to start");
        }
        LaunchOutcome::Exited(info) => {
            tracing::info!(code = ?info.code, signal = ?info.signal, "launcher exiting");
        }
    }
    // Returning drops the lock; the child's exit code is not propagated
}
