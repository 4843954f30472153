use std::path::PathBuf;

/// Fixed log file layout under the platform logs directory.
///
/// All three files share a prefix (e.g. `sertifikita`) so several launchers
/// can log into the same directory. Nothing here touches the filesystem;
/// files are created lazily by the sinks that write them.
#[derive(Debug, Clone)]
pub struct LogDir {
    root: PathBuf,
    prefix: String,
}

impl LogDir {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Timestamped launcher events (e.g. `sertifikita-launch.log`).
    pub fn launch_log(&self) -> PathBuf {
        self.root.join(format!("{}-launch.log", self.prefix))
    }

    /// Raw bytes forwarded from the child's stdout.
    pub fn stdout_log(&self) -> PathBuf {
        self.root.join(format!("{}-child.out.log", self.prefix))
    }

    /// Raw bytes forwarded from the child's stderr.
    pub fn stderr_log(&self) -> PathBuf {
        self.root.join(format!("{}-child.err.log", self.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_paths() {
        let logs = LogDir::new("/var/log/app", "sertifikita");
        assert_eq!(
            logs.launch_log(),
            PathBuf::from("/var/log/app/sertifikita-launch.log")
        );
        assert_eq!(
            logs.stdout_log(),
            PathBuf::from("/var/log/app/sertifikita-child.out.log")
        );
        assert_eq!(
            logs.stderr_log(),
            PathBuf::from("/var/log/app/sertifikita-child.err.log")
        );
    }

    #[test]
    fn test_new_does_not_create_anything() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("logs");
        let logs = LogDir::new(&root, "x");
        let _ = logs.launch_log();
        assert!(!root.exists());
    }
}
