//! Platform directories the launcher reads from and writes to.

use std::path::{Path, PathBuf};

/// Process environment the launcher runs in, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Platform resource bundle directory (production executable location).
    pub resources_dir: PathBuf,
    /// Directory containing the launcher executable (development fallback root).
    pub install_dir: PathBuf,
    /// Destination for all log files.
    pub logs_dir: PathBuf,
    /// Per-user directory holding the single-instance lock file.
    pub lock_dir: PathBuf,
}

impl Environment {
    /// Resolve directories for the running launcher executable.
    ///
    /// Never fails: if the executable can't be located the candidates resolve
    /// against the working directory and the usual not-found dialog reports
    /// it, after the single-instance lock has been taken.
    pub fn detect(app_name: &str) -> Self {
        let install_dir = install_dir_from(std::env::current_exe());
        Self {
            resources_dir: resources_dir_for(&install_dir),
            logs_dir: logs_dir_for(app_name),
            lock_dir: lock_dir(),
            install_dir,
        }
    }
}

fn install_dir_from(exe: std::io::Result<PathBuf>) -> PathBuf {
    match exe {
        Ok(exe) => exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        Err(e) => {
            tracing::warn!(error = %e, "cannot locate launcher executable, using working directory");
            PathBuf::from(".")
        }
    }
}

/// On macOS the launcher runs from `<App>.app/Contents/MacOS`, with resources
/// in the sibling `Contents/Resources`. Elsewhere resources sit in a
/// `resources/` directory next to the executable.
pub fn resources_dir_for(install_dir: &Path) -> PathBuf {
    if cfg!(target_os = "macos") && install_dir.file_name().is_some_and(|n| n == "MacOS") {
        if let Some(contents) = install_dir.parent() {
            return contents.join("Resources");
        }
    }
    install_dir.join("resources")
}

pub fn logs_dir_for(app_name: &str) -> PathBuf {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Logs").join(app_name))
    } else if cfg!(windows) {
        dirs::data_dir().map(|d| d.join(app_name).join("logs"))
    } else {
        dirs::config_dir().map(|d| d.join(app_name).join("logs"))
    };
    base.unwrap_or_else(|| std::env::temp_dir().join(app_name).join("logs"))
}

fn lock_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_os = "macos"))]
    fn test_resources_dir_next_to_executable() {
        let dir = resources_dir_for(Path::new("/opt/app"));
        assert_eq!(dir, PathBuf::from("/opt/app/resources"));
    }

    #[test]
    #[cfg(target_os = "macos")]
    fn test_resources_dir_in_app_bundle() {
        let dir = resources_dir_for(Path::new("/Applications/X.app/Contents/MacOS"));
        assert_eq!(dir, PathBuf::from("/Applications/X.app/Contents/Resources"));
    }

    #[test]
    fn test_logs_dir_is_scoped_to_app() {
        let dir = logs_dir_for("Sertifikita");
        assert!(dir.components().any(|c| c.as_os_str() == "Sertifikita"));
    }

    #[test]
    fn test_detect_uses_current_exe_directory() {
        let env = Environment::detect("Sertifikita");
        let exe = std::env::current_exe().unwrap();
        assert_eq!(env.install_dir, exe.parent().unwrap());
        assert_eq!(env.resources_dir, resources_dir_for(&env.install_dir));
    }

    #[test]
    fn test_unknown_executable_location_falls_back_to_working_dir() {
        let err = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(install_dir_from(Err(err)), PathBuf::from("."));
        assert_eq!(
            install_dir_from(Ok(PathBuf::from("/opt/app/launcher"))),
            PathBuf::from("/opt/app")
        );
    }
}
