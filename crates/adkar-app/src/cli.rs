//! CLI argument definitions for the `adkar` binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use adkar_core::config::{AdkarConfig, ChatBackend};

/// ADKAR assistant: answers change-management questions in the terminal.
#[derive(Parser, Debug, Default)]
#[command(name = "adkar", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Answer with the remote inference backend instead of the keyword catalog.
    #[arg(long = "remote")]
    pub remote: bool,

    /// Append feedback to this JSON file.
    #[arg(long = "feedback-log")]
    pub feedback_log: Option<PathBuf>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ADKAR_CONFIG env var > platform default (~/.adkar/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ADKAR_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Fold CLI overrides into a loaded configuration.
    pub fn apply(&self, config: &mut AdkarConfig) {
        if self.remote {
            config.chat.backend = ChatBackend::Remote;
        }
        if let Some(ref path) = self.feedback_log {
            config.feedback.log_path = path.to_string_lossy().to_string();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".adkar").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".adkar").join("config.toml");
    }
    PathBuf::from("config.toml")
}
