//! TOML configuration for the bridge daemon.
//!
//! The file lives at `$XDG_CONFIG_HOME/tvremote-bridge/config.toml`, falling
//! back to `~/.config/tvremote-bridge/config.toml`.  A missing file is not an
//! error: every field has a default, so the daemon runs with no config at all.
//!
//! ```toml
//! [bridge]
//! log_level = "info"
//!
//! [network]
//! bind_address = "127.0.0.1"
//! control_port = 24900
//! max_payload_bytes = 4096
//!
//! [uinput]
//! device_path = "/dev/uinput"
//! ```
//!
//! Command-line flags override whatever the file says; that merge happens in
//! `main.rs`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub bridge: BridgeSection,
    #[serde(default)]
    pub network: NetworkSection,
    #[serde(default)]
    pub uinput: UinputSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeSection {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkSection {
    /// Address the control server listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Frames declaring a larger payload end the session.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UinputSection {
    #[serde(default = "default_device_path")]
    pub device_path: PathBuf,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}
fn default_control_port() -> u16 {
    24900
}
fn default_max_payload_bytes() -> u32 {
    4096
}
fn default_device_path() -> PathBuf {
    PathBuf::from("/dev/uinput")
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            control_port: default_control_port(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

impl Default for UinputSection {
    fn default() -> Self {
        Self {
            device_path: default_device_path(),
        }
    }
}

impl AppConfig {
    /// Renders the config as TOML, e.g. for `--print-config`.
    pub fn to_toml(&self) -> Result<String, StorageError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves `config.toml` inside the XDG config directory.
pub fn config_file_path() -> Result<PathBuf, StorageError> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or(StorageError::NoConfigDir)?;
    Ok(base.join("tvremote-bridge").join("config.toml"))
}

/// Loads the config from `path`, or from the default location when `None`.
///
/// A missing file yields [`AppConfig::default`].
///
/// # Errors
///
/// [`StorageError::Io`] for file-system errors other than "not found",
/// [`StorageError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, StorageError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(StorageError::Io { path, source }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
