use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Shipped configuration, compiled in from `launcher.toml`.
const EMBEDDED: &str = include_str!("../launcher.toml");

/// Environment variable that turns on the debug environment extension at runtime.
pub const DEBUG_SWITCH: &str = "LAUNCHER_DEBUG";

/// Top-level configuration loaded from the embedded `launcher.toml`.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LauncherConfig {
    pub app: AppConfig,
    pub executable: ExecutableConfig,
    pub debug: DebugConfig,
}

/// Application identity: display name, lock identity, log file prefix.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub id: String,
    pub log_prefix: String,
}

/// Where the bundled executable lives, relative to the resources directory
/// (production) and to `dev_root` under the install directory (development).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExecutableConfig {
    pub bundle: PathBuf,
    pub dev_root: PathBuf,
}

/// Extra environment variables for the child, inert unless enabled.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub env: BTreeMap<String, String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Parse { source: toml::de::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse { source } => write!(f, "invalid launcher config: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse { source } => Some(source),
        }
    }
}

impl LauncherConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse { source: e })
    }

    /// Load the embedded config, falling back to defaults if it does not parse.
    pub fn load_embedded() -> Self {
        match Self::from_toml_str(EMBEDDED) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("{e}; using built-in defaults");
                Self::default()
            }
        }
    }

    /// Variables merged into the child's environment for this run.
    ///
    /// Empty unless debug mode is enabled in the config or `switch` is `"1"`.
    pub fn debug_env(&self, switch: Option<&str>) -> Vec<(String, String)> {
        let enabled = self.debug.enabled || switch.is_some_and(|v| v.trim() == "1");
        if !enabled {
            return Vec::new();
        }
        self.debug
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

// --- Default implementations ---

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Sertifikita".to_string(),
            id: "id.sertifikita.launcher".to_string(),
            log_prefix: "sertifikita".to_string(),
        }
    }
}

impl Default for ExecutableConfig {
    fn default() -> Self {
        Self {
            bundle: PathBuf::from("Sertifikita.app/Contents/MacOS/Sertifikita"),
            dev_root: PathBuf::from("../dist-python"),
        }
    }
}
