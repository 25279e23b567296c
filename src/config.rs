use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Deserialize;

const DEFAULT_LISTEN_PORT: u16 = 60000;
const DEFAULT_APPS_TIMEOUT_SECS: u64 = 30;

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub apps: AppsSection,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Load configuration from disk and environment.
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("GET_ANALYSIS_ID_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let mut builder = config::Config::builder();

        if Path::new(&config_path).exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(&config_path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("GET_ANALYSIS_ID")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        let mut config: Self = settings.try_deserialize()?;

        if config.logging.level.trim().is_empty() {
            config.logging.level = "info".to_string();
        }

        Ok(config)
    }

    /// Reject configurations the server must not start with. Called before
    /// any socket is bound.
    pub fn validate(&self) -> Result<()> {
        if self.apps.user.trim().is_empty() {
            bail!("apps.user must be set");
        }

        self.server.tls.identity()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls: TlsSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_LISTEN_PORT,
            tls: TlsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsSection {
    pub cert: Option<String>,
    pub key: Option<String>,
}

impl TlsSection {
    /// The configured certificate/key file pair, or `None` when the server
    /// should speak plain HTTP. Empty paths count as unset; setting one half
    /// of the pair without the other is an error.
    pub fn identity(&self) -> Result<Option<(&str, &str)>> {
        let cert = self.cert.as_deref().filter(|s| !s.trim().is_empty());
        let key = self.key.as_deref().filter(|s| !s.trim().is_empty());

        match (cert, key) {
            (None, None) => Ok(None),
            (Some(cert), Some(key)) => Ok(Some((cert, key))),
            (Some(_), None) => bail!("server.tls.key is required when server.tls.cert is set"),
            (None, Some(_)) => bail!("server.tls.cert is required when server.tls.key is set"),
        }
    }
}

/// Connection settings for the upstream apps service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppsSection {
    /// Base URL of the apps service.
    pub url: String,

    /// Username presented to the apps service on every lookup. Required.
    pub user: String,

    /// Per-request timeout in seconds. Zero disables the timeout.
    pub timeout: u64,
}

impl Default for AppsSection {
    fn default() -> Self {
        Self {
            url: "http://apps".to_string(),
            user: String::new(),
            timeout: DEFAULT_APPS_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}
