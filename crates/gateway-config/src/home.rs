//! Per-user relay home directory.

use gateway_core::{GatewayError, GatewayResult};
use std::path::{Path, PathBuf};

/// Environment variable overriding the relay home directory
pub const HOME_ENV: &str = "LLM_RELAY_HOME";

/// Directory name under the user's home directory
pub const HOME_DIR_NAME: &str = ".llm-relay";

/// Well-known files under the relay home directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayHome {
    root: PathBuf,
}

impl RelayHome {
    /// Use an explicit directory
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve from `LLM_RELAY_HOME`, falling back to `~/.llm-relay`
    pub fn resolve() -> GatewayResult<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(dir));
        }

        let base = directories::BaseDirs::new()
            .ok_or_else(|| GatewayError::config("could not determine the user home directory"))?;
        Ok(Self::new(base.home_dir().join(HOME_DIR_NAME)))
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configuration document
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Persisted service state (pid and reference count)
    #[must_use]
    pub fn state_file(&self) -> PathBuf {
        self.root.join("service.json")
    }

    /// Lock file guarding the service state
    #[must_use]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join("service.lock")
    }

    /// Log file of the background service
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.root.join("llm-relay.log")
    }

    /// Create the directory if it does not exist
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}
