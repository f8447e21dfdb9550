use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AdkarError, Result};

/// Default inference endpoint for the fine-tuned ADKAR model.
pub const DEFAULT_INFERENCE_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/mleekw/deepseek-adkar-qlora";

/// Top-level configuration for the ADKAR assistant.
///
/// Loaded from `~/.adkar/config.toml` by default. Credentials are never
/// stored here; the inference section only names the environment variable
/// that holds the bearer token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdkarConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

impl AdkarConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AdkarConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) if e.is_not_found() => {
                info!("No config file at {}. Using defaults.", path.display());
                Self::default()
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AdkarError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Which reply resolver answers user messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatBackend {
    /// Local first-match keyword lookup over the reply catalog.
    #[default]
    Keyword,
    /// Remote text-generation endpoint.
    Remote,
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub backend: ChatBackend,
    /// Optional custom reply catalog (TOML). Empty means the built-in catalog.
    pub catalog_path: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            backend: ChatBackend::Keyword,
            catalog_path: String::new(),
        }
    }
}

impl ChatConfig {
    /// The custom catalog path, if one is configured.
    pub fn catalog_path(&self) -> Option<&Path> {
        if self.catalog_path.trim().is_empty() {
            None
        } else {
            Some(Path::new(&self.catalog_path))
        }
    }
}

/// Remote inference backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub endpoint: String,
    /// Name of the environment variable holding the bearer token.
    pub api_token_env: String,
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INFERENCE_ENDPOINT.to_string(),
            api_token_env: "ADKAR_INFERENCE_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

impl InferenceConfig {
    /// Per-request timeout. `timeout_secs = 0` means no timeout.
    pub fn timeout(&self) -> Option<Duration> {
        timeout_from_secs(self.timeout_secs)
    }

    /// Read the bearer token from the configured environment variable.
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn api_token(&self) -> Option<String> {
        if self.api_token_env.is_empty() {
            return None;
        }
        std::env::var(&self.api_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Feedback sink settings. `endpoint` wins over `log_path` when both are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub endpoint: String,
    pub log_path: String,
    /// Timeout for the HTTP endpoint. 0 disables it.
    pub timeout_secs: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            log_path: String::new(),
            timeout_secs: 10,
        }
    }
}

impl FeedbackConfig {
    pub fn timeout(&self) -> Option<Duration> {
        timeout_from_secs(self.timeout_secs)
    }

    pub fn endpoint(&self) -> Option<&str> {
        Some(self.endpoint.trim()).filter(|e| !e.is_empty())
    }

    pub fn log_path(&self) -> Option<&Path> {
        Some(self.log_path.trim())
            .filter(|p| !p.is_empty())
            .map(Path::new)
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
