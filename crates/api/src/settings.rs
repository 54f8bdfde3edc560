//! Layered Configuration
//!
//! Defaults, then an optional `brake-monitor.toml` (or the file named by
//! `BRAKE_MONITOR_CONFIG`), then `BRAKE_MONITOR__SECTION__KEY` variables.

use alerting::{AlertConfig, Language, SmsConfig, WhatsAppConfig};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Streaming session settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Processed feature table (CSV)
    pub data_path: PathBuf,
    /// Target column to drop before prediction
    pub label_column: Option<String>,
    /// Maximum samples replayed per session
    pub max_samples: usize,
    /// Delay between samples (milliseconds)
    pub delay_ms: u64,
    /// Display and alert language
    pub language: Language,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/processed/processed_data.csv"),
            label_column: Some(sample_source::DEFAULT_LABEL_COLUMN.to_string()),
            max_samples: 50,
            delay_ms: 500,
            language: Language::English,
        }
    }
}

/// Exported model location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub path: PathBuf,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/brake_model.json"),
        }
    }
}

/// Dashboard API server
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub enabled: bool,
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Log output
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application settings, read once at startup
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub session: SessionSettings,
    pub alerting: AlertConfig,
    pub whatsapp: WhatsAppConfig,
    pub sms: SmsConfig,
    pub model: ModelSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load settings from `path` (or `brake-monitor.toml` if present) and
    /// the environment
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name("brake-monitor").required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("BRAKE_MONITOR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("alerting.channels")
                    .with_list_parse_key("sms.numbers")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.server.enabled {
            self.bind_addr()?;
        }
        if self.alerting.channel_timeout_ms == 0 {
            return Err(SettingsError::Invalid(
                "alerting.channel_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed server bind address
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.server.bind.parse().map_err(|e| {
            SettingsError::Invalid(format!("server.bind '{}': {}", self.server.bind, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::ChannelKind;
    use std::io::Write;

    #[test]
    fn test_defaults_match_demo_session() {
        let settings = Settings::default();
        assert_eq!(settings.session.max_samples, 50);
        assert_eq!(settings.session.delay_ms, 500);
        assert_eq!(settings.session.label_column.as_deref(), Some("class"));
        assert_eq!(settings.alerting.cooldown_samples, 5);
        assert_eq!(
            settings.alerting.channels,
            vec![ChannelKind::WhatsApp, ChannelKind::Sms]
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir()
            .join(format!("brake-monitor-test-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[session]
max_samples = 10
language = "ta"

[alerting]
cooldown_samples = 3
channels = ["sms"]

[sms]
numbers = ["8100000001"]
"#
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.session.max_samples, 10);
        assert_eq!(settings.session.language, Language::Tamil);
        assert_eq!(settings.alerting.cooldown_samples, 3);
        assert_eq!(settings.alerting.channels, vec![ChannelKind::Sms]);
        assert_eq!(settings.sms.numbers, vec!["8100000001"]);
        // Untouched sections keep their defaults
        assert_eq!(settings.sms.route, "v3");
        assert_eq!(settings.session.delay_ms, 500);
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let mut settings = Settings::default();
        settings.server.bind = "not-an-address".to_string();
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        settings.server.enabled = false;
        assert!(settings.validate().is_ok());
    }
}
