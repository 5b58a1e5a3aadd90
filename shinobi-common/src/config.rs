//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments
//! 2. Environment variables (1 and 2 are merged by the binary into [`ConfigOverrides`])
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing config file in the default locations is not an error: a warning
//! is logged and compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Primary upstream: supports `/{id}` lookups and `page`/`limit` paging
pub const DEFAULT_PRIMARY_URL: &str = "https://dattebayo-api.onrender.com/characters";
/// Fallback upstream: returns the full collection
pub const DEFAULT_FALLBACK_URL: &str = "https://naruto-api.fly.dev/characters";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5790;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_USER_AGENT: &str = concat!("shinobi-roster/", env!("CARGO_PKG_VERSION"));

/// Config file name inside the per-user/system config folder
const CONFIG_DIR_NAME: &str = "shinobi";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Complete service configuration
///
/// Deserialized from TOML; every section and key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Upstream character APIs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Timeout applied to each outbound request
    pub timeout_secs: u64,
    pub user_agent: String,
    pub primary: SourceConfig,
    pub fallback: SourceConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            primary: SourceConfig {
                url: DEFAULT_PRIMARY_URL.to_string(),
                native_pagination: true,
            },
            fallback: SourceConfig {
                url: DEFAULT_FALLBACK_URL.to_string(),
                native_pagination: false,
            },
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One upstream collection endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct SourceConfig {
    /// Collection URL, e.g. `https://host/characters`
    pub url: String,
    /// Upstream accepts `?page=&limit=`; otherwise the full collection is
    /// fetched and sliced locally
    pub native_pagination: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub primary_url: Option<String>,
    pub fallback_url: Option<String>,
    pub log_level: Option<String>,
}

impl ServiceConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the effective configuration
    ///
    /// An explicit `config_path` must exist. Without one, the default
    /// locations are searched and compiled defaults are used when none exists.
    pub fn resolve(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let base = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                info!("Loading config from {}", path.display());
                Self::load(path)?
            }
            None => match default_config_path() {
                Some(path) => {
                    info!("Loading config from {}", path.display());
                    Self::load(&path)?
                }
                None => {
                    warn!("No config file found, using compiled defaults");
                    Self::default()
                }
            },
        };

        let config = base.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line/environment values on top of this config
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(host) = &overrides.host {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(url) = &overrides.primary_url {
            self.upstream.primary.url = url.clone();
        }
        if let Some(url) = &overrides.fallback_url {
            self.upstream.fallback.url = url.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        self
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<()> {
        for (label, source) in [
            ("primary", &self.upstream.primary),
            ("fallback", &self.upstream.fallback),
        ] {
            let url = source.url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "{} upstream URL must be http(s): {:?}",
                    label, source.url
                )));
            }
        }
        if self.upstream.timeout_secs == 0 {
            return Err(Error::Config("upstream.timeout_secs must be > 0".to_string()));
        }
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host must not be empty".to_string()));
        }
        Ok(())
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// First existing config file in the platform locations
///
/// `<config dir>/shinobi/config.toml`, then `/etc/shinobi/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = dirs::config_dir()
        .map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .into_iter()
        .collect();
    if cfg!(target_os = "linux") {
        candidates.push(
            PathBuf::from("/etc")
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }
    candidates.into_iter().find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5790);
        assert_eq!(config.upstream.primary.url, DEFAULT_PRIMARY_URL);
        assert!(config.upstream.primary.native_pagination);
        assert_eq!(config.upstream.fallback.url, DEFAULT_FALLBACK_URL);
        assert!(!config.upstream.fallback.native_pagination);
        assert_eq!(config.upstream.timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServiceConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [upstream.fallback]
            url = "http://localhost:9000/characters"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.upstream.fallback.url, "http://localhost:9000/characters");
        assert!(!config.upstream.fallback.native_pagination);
        assert_eq!(config.upstream.primary.url, DEFAULT_PRIMARY_URL);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let err = ServiceConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, Error::TomlParse(_)));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides {
            port: Some(6000),
            primary_url: Some("http://primary.test/characters".to_string()),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        let config = ServiceConfig::default().with_overrides(&overrides);
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.upstream.primary.url, "http://primary.test/characters");
        assert_eq!(config.upstream.fallback.url, DEFAULT_FALLBACK_URL);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.bind_address(), "127.0.0.1:6000");
    }

    #[test]
    fn test_validate_rejects_bad_url_and_timeout() {
        let mut config = ServiceConfig::default();
        config.upstream.fallback.url = "ftp://nope".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = ServiceConfig::default();
        config.upstream.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
