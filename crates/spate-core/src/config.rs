//! Configuration system for spate.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $SPATE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/spate/config.toml
//!   3. ~/.config/spate/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpateConfig {
    pub network: NetworkConfig,
    pub stream: StreamConfig,
    pub sessions: SessionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the HTTP listener binds to.
    pub listen_addr: String,
    /// TCP port for the measurement API. 0 = OS-assigned.
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Hard ceiling on bytes served by a single download request.
    pub download_max_bytes: u64,
    /// Size of the reusable pseudorandom download buffer.
    pub download_buffer_bytes: usize,
    /// Read size while draining upload bodies.
    pub upload_chunk_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Seconds between idle-session sweeps.
    pub sweep_interval_secs: u64,
    /// Evict after this many seconds without download activity.
    pub download_idle_secs: u64,
    /// Evict after this many seconds without upload activity.
    pub upload_idle_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for SpateConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            stream: StreamConfig::default(),
            sessions: SessionsConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            download_max_bytes: 50_000_000,
            download_buffer_bytes: 4_194_304, // 4 MiB
            upload_chunk_bytes: 16_384,
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 30,
            download_idle_secs: 180,
            upload_idle_secs: 60,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("spate")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl SpateConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            SpateConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("SPATE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&SpateConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text)
                .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply SPATE_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SPATE_NETWORK__LISTEN_ADDR") {
            self.network.listen_addr = v;
        }
        if let Ok(v) = std::env::var("SPATE_NETWORK__PORT") {
            if let Ok(p) = v.parse() {
                self.network.port = p;
            }
        }
        if let Ok(v) = std::env::var("SPATE_STREAM__DOWNLOAD_MAX_BYTES") {
            if let Ok(n) = v.parse() {
                self.stream.download_max_bytes = n;
            }
        }
        if let Ok(v) = std::env::var("SPATE_SESSIONS__SWEEP_INTERVAL_SECS") {
            if let Ok(n) = v.parse() {
                self.sessions.sweep_interval_secs = n;
            }
        }
        if let Ok(v) = std::env::var("SPATE_SESSIONS__DOWNLOAD_IDLE_SECS") {
            if let Ok(n) = v.parse() {
                self.sessions.download_idle_secs = n;
            }
        }
        if let Ok(v) = std::env::var("SPATE_SESSIONS__UPLOAD_IDLE_SECS") {
            if let Ok(n) = v.parse() {
                self.sessions.upload_idle_secs = n;
            }
        }
    }
}
