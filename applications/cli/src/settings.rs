/// CLI configuration
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use zen_backend::{BackendConfig, RetryPolicy};
use zen_playback::TransportConfig;

pub const DEFAULT_LOG_FILTER: &str = "zen=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_backend")]
    pub backend: BackendSettings,

    #[serde(default = "default_retry")]
    pub retry: RetrySettings,

    #[serde(default = "default_logging")]
    pub logging: LoggingSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub anon_key: String,

    /// Where confirmation and recovery emails link back to
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// `path` defaults to `config.toml` in the working directory and may be
    /// absent. Environment variables use the `ZEN_` prefix with `__`
    /// between sections, e.g. `ZEN_BACKEND__ANON_KEY`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from("config.toml"), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(ConfigError::Load(format!(
                "config file not found: {}",
                config_path.display()
            )));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ZEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "backend URL is required (set ZEN_BACKEND__URL)".to_string(),
            ));
        }

        if self.backend.anon_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "anon key is required (set ZEN_BACKEND__ANON_KEY)".to_string(),
            ));
        }

        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".to_string()));
        }

        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err(ConfigError::Invalid(format!(
                "playback.volume must be within 0.0-1.0, got {}",
                self.playback.volume
            )));
        }

        Ok(())
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig::new(&self.backend.url, &self.backend.anon_key)
            .with_timeout(Duration::from_secs(self.backend.timeout_secs))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            ..RetryPolicy::default()
        }
    }

    pub fn redirect_url(&self) -> Option<String> {
        let url = self.backend.redirect_url.trim();
        (!url.is_empty()).then(|| url.to_string())
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            volume: self.playback.volume,
            ..TransportConfig::default()
        }
    }
}

// Default values
fn default_backend() -> BackendSettings {
    BackendSettings {
        url: String::new(),
        anon_key: String::new(),
        redirect_url: default_redirect_url(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_redirect_url() -> String {
    "desertzen://auth/callback".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry() -> RetrySettings {
    RetrySettings {
        max_attempts: default_max_attempts(),
        initial_backoff_ms: default_initial_backoff_ms(),
        max_backoff_ms: default_max_backoff_ms(),
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    200
}

fn default_max_backoff_ms() -> u64 {
    2000
}

fn default_logging() -> LoggingSettings {
    LoggingSettings {
        filter: default_log_filter(),
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        volume: default_volume(),
    }
}

fn default_volume() -> f32 {
    1.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            retry: default_retry(),
            logging: default_logging(),
            playback: default_playback(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.logging.filter, "zen=info");
        assert_eq!(config.redirect_url().as_deref(), Some("desertzen://auth/callback"));
        // URL and key have no usable default
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_fills_missing_fields() {
        let file = write_config(
            r#"
            [backend]
            url = "https://abc.supabase.co"
            anon_key = "anon"

            [playback]
            volume = 0.5
            "#,
        );

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.backend.url, "https://abc.supabase.co");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.transport_config().volume, 0.5);
        assert_eq!(config.retry_policy().initial_backoff, Duration::from_millis(200));
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/zen.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.backend.url = "https://abc.supabase.co".into();
        config.backend.anon_key = "anon".into();
        config.validate().unwrap();

        config.playback.volume = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.playback.volume = 1.0;
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_redirect_is_none() {
        let mut config = AppConfig::default();
        config.backend.redirect_url = "  ".into();
        assert!(config.redirect_url().is_none());
    }
}
