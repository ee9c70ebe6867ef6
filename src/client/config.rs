use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::client::retry::RetryPolicy;
use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Environment variable overriding the server URL
pub const API_URL_ENV: &str = "PARLEY_API_URL";

/// Optional settings file, every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    server_url: Option<String>,
    poll_interval_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    max_send_retries: Option<u32>,
    retry_base_delay_ms: Option<u64>,
}

impl FileConfig {
    fn apply(self, mut builder: AppConfigBuilder) -> AppConfigBuilder {
        if let Some(url) = self.server_url {
            builder = builder.server_url(url);
        }
        if let Some(ms) = self.poll_interval_ms {
            builder = builder.poll_interval(Duration::from_millis(ms));
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(retries) = self.max_send_retries {
            builder = builder.max_send_retries(retries);
        }
        if let Some(ms) = self.retry_base_delay_ms {
            builder = builder.retry_base_delay(Duration::from_millis(ms));
        }
        builder
    }
}

/// Client configuration wrapper.
///
/// Layers, lowest first: defaults, `config.toml`, `PARLEY_API_URL`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    app: AppConfig,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_app(app: AppConfig) -> Self {
        Self { app }
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self {
            app: builder.build()?,
        })
    }

    /// `<config dir>/parley/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("parley").join("config.toml"))
    }

    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        Self::from_sources(path.as_deref(), std::env::var(API_URL_ENV).ok())
    }

    /// Merge an optional file and an optional URL override onto the defaults
    ///
    /// A missing file is skipped; an unreadable or malformed one is an error.
    pub fn from_sources(file: Option<&Path>, api_url: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = AppConfig::builder();

        if let Some(path) = file {
            match std::fs::read_to_string(path) {
                Ok(raw) => {
                    let parsed: FileConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                        path: path.display().to_string(),
                        source,
                    })?;
                    tracing::debug!(path = %path.display(), "Loaded client config file");
                    builder = parsed.apply(builder);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(ConfigError::Io {
                        path: path.display().to_string(),
                        source,
                    })
                }
            }
        }

        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            builder = builder.server_url(url.trim().to_string());
        }

        Self::with_builder(builder)
    }

    /// Override the server URL
    pub fn with_server_url(self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let mut app = self.app;
        app.server_url = url.into();
        app.validate()?;
        Ok(Self { app })
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Get the full URL for an API endpoint, e.g. `api_url("/auth/login")`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.app.api_base(), path)
    }

    pub fn server_url(&self) -> &str {
        &self.app.server_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.app.poll_interval
    }

    pub fn request_timeout(&self) -> Duration {
        self.app.request_timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.server_url(), "http://127.0.0.1:3000");
        assert_eq!(config.poll_interval(), Duration::from_millis(3000));
    }

    #[test]
    fn test_api_url() {
        let config = Config::new();
        assert_eq!(
            config.api_url("/auth/login"),
            "http://127.0.0.1:3000/api/auth/login"
        );
    }

    #[test]
    fn test_file_then_env_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "server_url = \"http://files.example:4000\"\npoll_interval_ms = 500\nmax_send_retries = 1\n",
        )
        .unwrap();

        let from_file = Config::from_sources(Some(&path), None).unwrap();
        assert_eq!(from_file.server_url(), "http://files.example:4000");
        assert_eq!(from_file.poll_interval(), Duration::from_millis(500));
        assert_eq!(from_file.retry_policy().max_retries, 1);

        let overridden =
            Config::from_sources(Some(&path), Some("http://env.example".to_string())).unwrap();
        assert_eq!(overridden.server_url(), "http://env.example");
        assert_eq!(overridden.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_sources(Some(&dir.path().join("absent.toml")), None).unwrap();
        assert_eq!(config.app(), &AppConfig::default());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();
        assert!(matches!(
            Config::from_sources(Some(&path), None),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_load_reads_env_override() {
        std::env::set_var(API_URL_ENV, "http://from-env.example:9000");
        let config = Config::load();
        std::env::remove_var(API_URL_ENV);
        assert_eq!(config.unwrap().server_url(), "http://from-env.example:9000");
    }
}
