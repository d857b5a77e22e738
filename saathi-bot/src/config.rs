//! Bot configuration: JSON config file plus environment secrets.
//!
//! Non-secret settings (model, timeouts, generation parameters,
//! allowlists) live in `~/.saathi/config.json`; the two required secrets
//! are read from `TELEGRAM_BOT_TOKEN` and `GEMINI_API_KEY` and are
//! startup-fatal when absent.

use crate::completion::GenerationParams;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable holding the completion-service API key.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Channel settings.
    pub channels: ChannelsConfig,
    /// Completion-service settings.
    pub completion: CompletionConfig,
}

/// Settings for all channels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsConfig {
    /// Telegram channel settings.
    pub telegram: TelegramConfig,
}

/// Telegram channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Whether the channel is enabled.
    pub enabled: bool,
    /// Bot token. Usually left unset here and provided via the
    /// environment.
    pub token: Option<String>,
    /// Allowed user IDs. Empty means allow all.
    pub allowed_users: Vec<i64>,
    /// Allowed chat IDs. Empty means allow all.
    pub allowed_chats: Vec<i64>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: None,
            allowed_users: Vec::new(),
            allowed_chats: Vec::new(),
        }
    }
}

/// Completion-service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// API key. Usually left unset here and provided via the environment.
    pub api_key: Option<String>,
    /// Model ID.
    pub model: String,
    /// Call deadline in seconds.
    pub timeout_secs: u64,
    /// Sampling parameters.
    pub params: GenerationParams,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro".to_string(),
            timeout_secs: 30,
            params: GenerationParams::default(),
        }
    }
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Service cannot start.
    Error,
    /// Service can start but something looks off.
    Warning,
}

/// A single configuration issue found during validation.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Severity.
    pub level: IssueLevel,
    /// Human-readable description.
    pub message: String,
}

impl BotConfig {
    /// Fill unset secrets from the environment.
    pub fn apply_env(&mut self) {
        if self.channels.telegram.token.is_none() {
            self.channels.telegram.token = std::env::var(TELEGRAM_TOKEN_ENV).ok();
        }
        if self.completion.api_key.is_none() {
            self.completion.api_key = std::env::var(GEMINI_KEY_ENV).ok();
        }
    }

    /// Validate the configuration, returning any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.channels.telegram.enabled && self.channels.telegram.token.is_none() {
            issues.push(ConfigIssue {
                level: IssueLevel::Error,
                message: format!("telegram enabled but no token set ({TELEGRAM_TOKEN_ENV})"),
            });
        }
        if self.completion.api_key.is_none() {
            issues.push(ConfigIssue {
                level: IssueLevel::Error,
                message: format!("completion API key not set ({GEMINI_KEY_ENV})"),
            });
        }
        if self.completion.timeout_secs == 0 {
            issues.push(ConfigIssue {
                level: IssueLevel::Warning,
                message: "completion timeout of 0s will fail every call".to_string(),
            });
        }

        issues
    }

    /// Fail if any required secret is missing. Called once at startup.
    pub fn require_secrets(&self) -> ConfigResult<()> {
        if self.channels.telegram.enabled && self.channels.telegram.token.is_none() {
            return Err(ConfigError::missing(TELEGRAM_TOKEN_ENV));
        }
        if self.completion.api_key.is_none() {
            return Err(ConfigError::missing(GEMINI_KEY_ENV));
        }
        Ok(())
    }
}

/// Path of the configuration file (`~/.saathi/config.json`).
#[must_use]
pub fn config_path() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".saathi")
        .join("config.json")
}

/// Load the configuration file, falling back to defaults when absent,
/// then fill secrets from the environment.
pub async fn load_config() -> ConfigResult<BotConfig> {
    let path = config_path();

    let mut config = if path.exists() {
        let content = tokio::fs::read_to_string(&path).await?;
        let config: BotConfig = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "loaded config file");
        config
    } else {
        BotConfig::default()
    };

    config.apply_env();
    Ok(config)
}

/// Save the configuration file.
pub async fn save_config(config: &BotConfig) -> ConfigResult<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(&path, content).await?;
    debug!(path = %path.display(), "saved config file");
    Ok(())
}

/// Write a default configuration file.
pub async fn init_config() -> ConfigResult<()> {
    save_config(&BotConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BotConfig::default();
        assert!(config.channels.telegram.enabled);
        assert_eq!(config.completion.model, "gemini-pro");
        assert_eq!(config.completion.timeout_secs, 30);
    }

    #[test]
    fn test_validate_flags_missing_secrets() {
        let config = BotConfig::default();
        let issues = config.validate();
        assert_eq!(
            issues
                .iter()
                .filter(|i| i.level == IssueLevel::Error)
                .count(),
            2
        );
        assert!(config.require_secrets().is_err());
    }

    #[test]
    fn test_secrets_satisfy_validation() {
        let mut config = BotConfig::default();
        config.channels.telegram.token = Some("token".to_string());
        config.completion.api_key = Some("key".to_string());

        assert!(config.require_secrets().is_ok());
        assert!(
            config
                .validate()
                .iter()
                .all(|i| i.level != IssueLevel::Error)
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = BotConfig::default();
        config.channels.telegram.allowed_users = vec![42];
        config.completion.model = "gemini-1.5-flash".to_string();

        let json = serde_json::to_string(&config).unwrap();
        let parsed: BotConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.channels.telegram.allowed_users, vec![42]);
        assert_eq!(parsed.completion.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: BotConfig =
            serde_json::from_str(r#"{"completion": {"model": "gemini-pro-vision"}}"#).unwrap();
        assert_eq!(parsed.completion.model, "gemini-pro-vision");
        assert_eq!(parsed.completion.timeout_secs, 30);
        assert!(parsed.channels.telegram.enabled);
    }
}
