//! Configuration loading and typed config structures for the SafetyNet service.
//!
//! The configuration lives in `safetynet-config.yaml` at the project root.
//! Every section and field is optional; anything omitted takes the default
//! documented on its field. A handful of environment variables override the
//! file so deployments can relocate data and rebind without editing it.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "safetynet-config.yaml";

/// Overrides `server.host`.
pub const ENV_HOST: &str = "SAFETYNET_HOST";
/// Overrides `server.port`.
pub const ENV_PORT: &str = "SAFETYNET_PORT";
/// Overrides `data.seed_path`.
pub const ENV_SEED_PATH: &str = "SAFETYNET_SEED_PATH";
/// Overrides `data.writable_path`.
pub const ENV_DATA_PATH: &str = "SAFETYNET_DATA_PATH";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Data file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Log filter and format.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the YAML is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the YAML is malformed.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides apply either way.
    ///
    /// # Errors
    ///
    /// Returns an error only when the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring unparseable SAFETYNET_PORT"),
            }
        }
        if let Some(path) = lookup(ENV_SEED_PATH) {
            self.data.seed_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_DATA_PATH) {
            self.data.writable_path = PathBuf::from(path);
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where the data document is seeded from and written to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// Read-only seed copied on first start.
    #[serde(default = "default_seed_path")]
    pub seed_path: PathBuf,

    /// Working copy every mutation is written through to.
    #[serde(default = "default_writable_path")]
    pub writable_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            seed_path: default_seed_path(),
            writable_path: default_writable_path(),
        }
    }
}

/// Log filter and output format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_seed_path() -> PathBuf {
    PathBuf::from("data/data.json")
}

fn default_writable_path() -> PathBuf {
    PathBuf::from("target/data/data.json")
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let yaml = r"
server:
  host: 127.0.0.1
  port: 9090
data:
  seed_path: fixtures/seed.json
  writable_path: /var/lib/safetynet/data.json
logging:
  level: debug
  json: true
";
        let config = ServiceConfig::parse_without_env(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.data.seed_path, PathBuf::from("fixtures/seed.json"));
        assert_eq!(
            config.data.writable_path,
            PathBuf::from("/var/lib/safetynet/data.json")
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = ServiceConfig::parse_without_env("server:\n  port: 3000\n").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.data, DataConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn empty_yaml_is_all_defaults() {
        let config = ServiceConfig::parse_without_env("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.data.writable_path, PathBuf::from("target/data/data.json"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = ServiceConfig::parse_without_env("server: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = ServiceConfig::default();
        config.apply_overrides(|name| match name {
            ENV_HOST => Some("localhost".to_owned()),
            ENV_PORT => Some("7070".to_owned()),
            ENV_DATA_PATH => Some("/tmp/data.json".to_owned()),
            _ => None,
        });
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 7070);
        assert_eq!(config.data.writable_path, PathBuf::from("/tmp/data.json"));
        assert_eq!(config.data.seed_path, PathBuf::from("data/data.json"));
    }

    #[test]
    fn unparseable_port_override_is_ignored() {
        let mut config = ServiceConfig::default();
        config.apply_overrides(|name| (name == ENV_PORT).then(|| "eighty".to_owned()));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ServiceConfig::load_or_default(Path::new("does/not/exist.yaml")).unwrap();
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
