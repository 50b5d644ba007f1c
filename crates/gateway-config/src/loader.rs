//! Configuration loading.

use crate::home::RelayHome;
use crate::model::Config;
use gateway_core::{GatewayError, GatewayResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Commented template written by `llm-relay config init`
pub const CONFIG_TEMPLATE: &str = r#"// llm-relay configuration
//
// JSON with comments and trailing commas.
{
  // Shared secret callers must send as "Authorization: Bearer <secret>"
  // or "x-api-key". Leave empty to disable authentication.
  "secret": "",
  "host": "127.0.0.1",
  "port": 3456,
  "timeoutMs": 600000,
  "logLevel": "info",
  "providers": [
    {
      "name": "openai",
      // Full chat-completions endpoint
      "baseUrl": "https://api.openai.com/v1/chat/completions",
      "apiKey": "sk-replace-me",
      "models": ["gpt-4o", "gpt-4o-mini"],
      "transformerNames": [],
    },
  ],
  "router": {
    "default": "openai,gpt-4o",
    "background": "openai,gpt-4o-mini",
    "think": "",
    "longContext": "",
    "webSearch": "",
    "longContextThreshold": 60000,
  },
}
"#;

/// Parse a configuration document
///
/// Strict JSON is tried first, then JSON5 (`//` and `/* */` comments,
/// trailing commas, unquoted keys), then YAML for documents commented with
/// `#`. The result is validated.
pub fn parse_config(source: &str) -> GatewayResult<Config> {
    let config = match serde_json::from_str::<Config>(source) {
        Ok(config) => config,
        Err(json_err) => {
            debug!(error = %json_err, "Document is not strict JSON, trying JSON5");
            match json5::from_str::<Config>(source) {
                Ok(config) => config,
                Err(json5_err) => serde_yaml::from_str::<Config>(source).map_err(|yaml_err| {
                    debug!(error = %yaml_err, "Document is not YAML either");
                    GatewayError::config(format!("failed to parse configuration: {json5_err}"))
                })?,
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Loads the configuration document from disk
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Load from an explicit path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load `config.json` from the relay home directory
    #[must_use]
    pub fn from_home(home: &RelayHome) -> Self {
        Self::new(home.config_file())
    }

    /// Path of the document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, parse and validate the document
    pub async fn load(&self) -> GatewayResult<Config> {
        let source = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            GatewayError::config(format!(
                "failed to read configuration file {}: {e}",
                self.path.display()
            ))
        })?;

        let config = parse_config(&source).map_err(|e| match e {
            GatewayError::Config { message } => {
                GatewayError::config(format!("{}: {message}", self.path.display()))
            }
            other => other,
        })?;

        info!(
            path = %self.path.display(),
            providers = config.providers.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Write the commented template unless a document already exists
    ///
    /// Returns `false` when the file was left untouched.
    pub async fn write_template(&self) -> GatewayResult<bool> {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                GatewayError::config(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        tokio::fs::write(&self.path, CONFIG_TEMPLATE)
            .await
            .map_err(|e| {
                GatewayError::config(format!("failed to write {}: {e}", self.path.display()))
            })?;
        Ok(true)
    }
}
