//! Runtime configuration
//!
//! Loaded from a JSON file (`errlens.json` by convention): where the
//! dataset bundles live, which dataset to serve, where the statistics
//! backend listens, the mining pre-filter, and the HTTP bind settings.
//! Every field except the dataset name has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::MiningFilter;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("Malformed config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Config parsed but fails a validation rule
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// HTTP bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty means permissive
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding one subdirectory per dataset bundle
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Name of the dataset to serve (required)
    pub data_name: String,

    /// Base URL of the statistics backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Mining pre-filter applied while parsing rule artifacts
    #[serde(default)]
    pub mining: MiningFilter,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

impl AppConfig {
    /// Load configuration from file and validate it
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: AppConfig =
            serde_json::from_str(&content).map_err(|err| ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the parsed configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_name.trim().is_empty() {
            return Err(ConfigError::Invalid("data_name must not be empty".into()));
        }

        if self.mining.min_support == 0 {
            return Err(ConfigError::Invalid("mining.min_support must be > 0".into()));
        }

        if self.mining.max_conditions == 0 {
            return Err(ConfigError::Invalid(
                "mining.max_conditions must be > 0".into(),
            ));
        }

        let url = reqwest::Url::parse(&self.backend_url)
            .map_err(|err| ConfigError::Invalid(format!("backend_url: {}", err)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid(format!(
                "backend_url: unsupported scheme '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// Directory of the configured dataset bundle
    pub fn bundle_dir(&self) -> PathBuf {
        self.data_dir.join(&self.data_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"data_name": "twitter"}"#).unwrap();
        config.validate().unwrap();

        assert_eq!(config.data_name, "twitter");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.backend_url, "http://localhost:5000");
        assert_eq!(config.mining.min_support, 20);
        assert_eq!(config.mining.max_conditions, 3);
        assert_eq!(config.server.socket_addr(), "0.0.0.0:8080");
        assert_eq!(config.bundle_dir(), PathBuf::from("./data/twitter"));
    }

    #[test]
    fn test_missing_data_name_is_a_parse_error() {
        let result = serde_json::from_str::<AppConfig>(r#"{"data_dir": "./data"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_data_name_is_rejected() {
        let config: AppConfig = serde_json::from_str(r#"{"data_name": "  "}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("data_name"));
    }

    #[test]
    fn test_zero_thresholds_are_rejected() {
        let config: AppConfig = serde_json::from_str(
            r#"{"data_name": "twitter", "mining": {"min_support": 0}}"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config: AppConfig = serde_json::from_str(
            r#"{"data_name": "twitter", "mining": {"max_conditions": 0}}"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_backend_url_is_rejected() {
        let config: AppConfig = serde_json::from_str(
            r#"{"data_name": "twitter", "backend_url": "not a url"}"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config: AppConfig = serde_json::from_str(
            r#"{"data_name": "twitter", "backend_url": "ftp://stats.local"}"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errlens.json");
        fs::write(
            &path,
            r#"{
                "data_name": "boolq",
                "data_dir": "/srv/errlens",
                "backend_url": "https://stats.internal:8443",
                "mining": {"min_support": 10, "max_conditions": 4},
                "server": {"host": "127.0.0.1", "port": 9000, "cors_origins": ["http://localhost:5173"]}
            }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.data_name, "boolq");
        assert_eq!(config.mining.min_support, 10);
        assert_eq!(config.server.socket_addr(), "127.0.0.1:9000");
        assert_eq!(config.server.cors_origins.len(), 1);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = AppConfig::load(Path::new("/nonexistent/errlens.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("errlens.json"));
    }
}
