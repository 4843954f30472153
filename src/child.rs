/// Child process lifecycle: spawn the bundled executable detached, drain its
/// stdout/stderr into sinks, report how it exited.
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::signals;
use crate::sink::LogSink;

const READ_CHUNK: usize = 8 * 1024;

/// How long to keep draining after the child exits before giving up on its pipes.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// What to run.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub program: PathBuf,
    /// Always empty for the bundled app; the launcher passes no arguments.
    pub args: Vec<String>,
    /// Merged over the inherited environment.
    pub extra_env: Vec<(String, String)>,
}

/// How the child terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitInfo {
    pub pid: u32,
    /// Exit code (None if killed by signal).
    pub code: Option<i32>,
    /// Name of the terminating signal, e.g. `SIGKILL`.
    pub signal: Option<String>,
}

impl ExitInfo {
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Errors that can occur while running the child.
#[derive(Debug)]
pub enum SpawnError {
    /// The OS refused to create the process.
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Waiting on the running child failed.
    Wait { source: std::io::Error },
}

impl std::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpawnError::Spawn { path, source } => {
                write!(f, "failed to spawn {}: {}", path.display(), source)
            }
            SpawnError::Wait { source } => {
                write!(f, "failed waiting for child process: {}", source)
            }
        }
    }
}

impl std::error::Error for SpawnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpawnError::Spawn { source, .. } => Some(source),
            SpawnError::Wait { source } => Some(source),
        }
    }
}

/// Starts the child and resolves once it has exited.
pub trait ProcessSpawner {
    /// Spawn `request`, forward its output, and wait for it to exit.
    ///
    /// Output still buffered in the pipes when the child exits reaches its
    /// sink before the exit is reported. Pipes kept open by a background
    /// descendant are abandoned after a short grace period, so this returns
    /// promptly once the child itself has exited.
    async fn spawn_and_wait(
        &self,
        request: &SpawnRequest,
        stdout: &dyn LogSink,
        stderr: &dyn LogSink,
    ) -> Result<ExitInfo, SpawnError>;
}

/// Spawns real OS processes via tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSpawner;

impl ProcessSpawner for TokioSpawner {
    async fn spawn_and_wait(
        &self,
        request: &SpawnRequest,
        stdout: &dyn LogSink,
        stderr: &dyn LogSink,
    ) -> Result<ExitInfo, SpawnError> {
        let mut cmd = detached_command(&request.program);
        cmd.args(&request.args)
            .envs(request.extra_env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| SpawnError::Spawn {
            path: request.program.clone(),
            source: e,
        })?;

        let pid = child.id().unwrap_or(0);
        tracing::info!(pid, program = %request.program.display(), "child process started");

        let out = child.stdout.take();
        let err = child.stderr.take();
        let drains = async {
            tokio::join!(drain(out, stdout, "stdout"), drain(err, stderr, "stderr"));
        };
        tokio::pin!(drains);

        let (status, drained) = tokio::select! {
            status = child.wait() => (status, false),
            () = &mut drains => (child.wait().await, true),
        };
        let status = status.map_err(|e| SpawnError::Wait { source: e })?;

        // A background descendant may still hold the pipes open
        if !drained && tokio::time::timeout(DRAIN_GRACE, &mut drains).await.is_err() {
            tracing::warn!(
                pid,
                grace_ms = DRAIN_GRACE.as_millis() as u64,
                "child exited but its output pipes are still open, no longer forwarding"
            );
        }

        let info = ExitInfo {
            pid,
            code: status.code(),
            signal: signals::terminating_signal(&status),
        };
        tracing::info!(pid, code = ?info.code, signal = ?info.signal, "child process exited");
        Ok(info)
    }
}

/// Command for `program` in its own process group, so it outlives the
/// launcher and isn't hit by signals aimed at the launcher's group.
fn detached_command(program: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.kill_on_drop(false);
    #[cfg(unix)]
    cmd.process_group(0);
    #[cfg(windows)]
    {
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);
    }
    cmd
}

/// Copy `stream` chunk by chunk into `sink` until EOF or a read error.
async fn drain<R>(stream: Option<R>, sink: &dyn LogSink, name: &str)
where
    R: AsyncRead + Unpin,
{
    let Some(mut stream) = stream else {
        return;
    };
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => sink.append(&buf[..n]),
            Err(e) => {
                tracing::debug!(stream = name, error = %e, "stopped draining child stream");
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::sink::AppendFile;
    use std::cell::RefCell;
    use std::error::Error;

    #[derive(Default)]
    struct MemorySink(RefCell<Vec<u8>>);

    impl LogSink for MemorySink {
        fn append(&self, bytes: &[u8]) {
            self.0.borrow_mut().extend_from_slice(bytes);
        }
    }

    impl MemorySink {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn sh(body: &str) -> SpawnRequest {
        SpawnRequest {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), body.to_string()],
            extra_env: Vec::new(),
        }
    }

    fn request(program: PathBuf) -> SpawnRequest {
        SpawnRequest {
            program,
            args: Vec::new(),
            extra_env: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_forwards_stdout_and_stderr_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let req = sh("printf 'hello\\n'; printf 'warn\\n' >&2");
        let out = AppendFile::new(dir.path().join("logs/out.log"));
        let err = AppendFile::new(dir.path().join("logs/err.log"));

        let info = TokioSpawner
            .spawn_and_wait(&req, &out, &err)
            .await
            .unwrap();

        assert!(info.is_success());
        assert!(info.pid > 0);
        assert!(std::fs::read_to_string(out.path()).unwrap().ends_with("hello\n"));
        assert!(std::fs::read_to_string(err.path()).unwrap().ends_with("warn\n"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_code() {
        let (out, err) = (MemorySink::default(), MemorySink::default());

        let info = TokioSpawner
            .spawn_and_wait(&sh("exit 42"), &out, &err)
            .await
            .unwrap();
        assert_eq!(info.code, Some(42));
        assert_eq!(info.signal, None);
        assert!(!info.is_success());
    }

    #[tokio::test]
    async fn test_killed_by_signal() {
        let (out, err) = (MemorySink::default(), MemorySink::default());

        let info = TokioSpawner
            .spawn_and_wait(&sh("kill -KILL $$"), &out, &err)
            .await
            .unwrap();
        assert_eq!(info.code, None);
        assert_eq!(info.signal.as_deref(), Some("SIGKILL"));
        assert!(!info.is_success());
    }

    #[tokio::test]
    async fn test_output_flushed_before_exit_reported() {
        // Enough output to need several reads
        let req = sh("i=0; while [ $i -lt 2000 ]; do echo line-$i; i=$((i+1)); done");
        let (out, err) = (MemorySink::default(), MemorySink::default());

        TokioSpawner.spawn_and_wait(&req, &out, &err).await.unwrap();
        let text = out.text();
        assert_eq!(text.lines().count(), 2000);
        assert!(text.ends_with("line-1999\n"));
        assert!(err.text().is_empty());
    }

    #[tokio::test]
    async fn test_inherits_environment_and_merges_extra() {
        let mut req = sh("printf '%s|%s' \"$PATH\" \"$QT_DEBUG_PLUGINS\"");
        req.extra_env = vec![("QT_DEBUG_PLUGINS".to_string(), "1".to_string())];
        let (out, err) = (MemorySink::default(), MemorySink::default());

        TokioSpawner.spawn_and_wait(&req, &out, &err).await.unwrap();
        let path = std::env::var("PATH").unwrap_or_default();
        assert_eq!(out.text(), format!("{path}|1"));
    }

    #[tokio::test]
    async fn test_background_descendant_does_not_delay_exit() {
        let (out, err) = (MemorySink::default(), MemorySink::default());
        let start = std::time::Instant::now();

        let info = TokioSpawner
            .spawn_and_wait(&sh("sleep 30 & echo hi; exit 3"), &out, &err)
            .await
            .unwrap();

        assert_eq!(info.code, Some(3));
        assert!(out.text().contains("hi"));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_stdin_is_closed() {
        // `cat` sees EOF immediately instead of waiting on a terminal
        let (out, err) = (MemorySink::default(), MemorySink::default());

        TokioSpawner
            .spawn_and_wait(&sh("cat; echo done"), &out, &err)
            .await
            .unwrap();
        assert_eq!(out.text(), "done\n");
    }

    #[tokio::test]
    async fn test_non_executable_file_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-executable");
        std::fs::write(&path, "plain text").unwrap();
        let out = AppendFile::new(dir.path().join("out.log"));
        let err = AppendFile::new(dir.path().join("err.log"));

        let e = TokioSpawner
            .spawn_and_wait(&request(path.clone()), &out, &err)
            .await
            .unwrap_err();
        assert!(matches!(e, SpawnError::Spawn { .. }));
        assert!(e.to_string().contains("failed to spawn"));
        assert!(e.to_string().contains(&path.display().to_string()));
        assert!(!out.path().exists());
        assert!(!err.path().exists());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let (out, err) = (MemorySink::default(), MemorySink::default());
        let e = TokioSpawner
            .spawn_and_wait(&request(PathBuf::from("/nonexistent-dir/app")), &out, &err)
            .await
            .unwrap_err();
        assert!(matches!(e, SpawnError::Spawn { .. }));
        assert!(e.source().is_some());
    }
}
