//! Daemon configuration.
//!
//! Loaded from `$XDG_CONFIG_HOME/hyprattach/config.json`.  Every key is
//! optional and unknown keys are ignored, so `{}` is a valid file.
//!
//! # Example
//!
//! ```json
//! {
//!   "socket_path": "/run/user/1000/hyprattach.sock",
//!   "hyprland": {
//!     "poll_interval_ms": 50,
//!     "minimized_workspace": "special:minimized"
//!   },
//!   "session": {
//!     "container": { "top": 0, "left": 0, "width": 2560, "height": 1440 },
//!     "windows": [
//!       { "id": "0x5a1", "widthFraction": 2, "isPrimary": true, "type": "normal" },
//!       { "id": "0x5a2", "widthFraction": 1, "type": "popup" }
//!     ]
//!   }
//! }
//! ```

use crate::hyprland::HyprlandConfig;
use crate::model::SessionConfig;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Command socket path.  Defaults to `$XDG_RUNTIME_DIR/hyprattach.sock`.
    #[serde(default)]
    pub socket_path: Option<String>,

    /// Hyprland backend settings.
    #[serde(default)]
    pub hyprland: HyprlandConfig,

    /// Session to start tiling as soon as the daemon is up.
    #[serde(default)]
    pub session: Option<SessionConfig>,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }

    /// Like [`load`](Self::load), but a missing file means defaults.  A file
    /// that exists and does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Where the config file lives for this user, if that can be told.
    pub fn default_path() -> Option<PathBuf> {
        config_file(|key| std::env::var_os(key))
    }

    /// The command socket to bind.
    pub fn command_socket(&self) -> PathBuf {
        match &self.socket_path {
            Some(path) => PathBuf::from(path),
            None => runtime_socket(|key| std::env::var_os(key)),
        }
    }
}

fn config_file(env: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    let base = match env("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(env("HOME")?).join(".config"),
    };
    Some(base.join("hyprattach").join("config.json"))
}

fn runtime_socket(env: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    env("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join("hyprattach.sock")
}

/// Load a standalone [`SessionConfig`] (the `--session <path>` argument).
pub fn load_session(path: &Path) -> Result<SessionConfig, ConfigError> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
