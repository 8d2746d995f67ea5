use serde::{Deserialize, Serialize};

use crate::error::WinsysError;

/// Top-level configuration, loaded from pvrsync.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PvrConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// DRM render node to open
    #[serde(default = "default_render_node")]
    pub render_node: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Priority of newly created transfer contexts
    #[serde(default)]
    pub priority: ContextPriorityConfig,
    /// Restrict transfer jobs to a single core
    #[serde(default)]
    pub single_core: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How long a host-side wait on a signal syncobj may block
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
}

/// Context priority as written in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextPriorityConfig {
    #[serde(rename = "low")]
    Low,
    #[default]
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            render_node: default_render_node(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

impl PvrConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, WinsysError> {
        toml::from_str(content).map_err(|e| WinsysError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, WinsysError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(WinsysError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring {}: {}", path, e);
                Self::default()
            }
        }
    }
}

/// Returns the default config file path.
/// Search order:
/// 1. System-wide config: `/etc/pvrsync/pvrsync.toml`
/// 2. Local fallback: `./pvrsync.toml`
pub fn default_config_path() -> String {
    let system_path = "/etc/pvrsync/pvrsync.toml";
    if std::path::Path::new(system_path).exists() {
        return system_path.to_string();
    }
    "pvrsync.toml".to_string()
}

fn default_render_node() -> String {
    pvr_common::platform::default_render_node()
}

fn default_wait_timeout_ms() -> u64 {
    5000
}
