//! Configuration loading for hemoscan.
//! Reads hemoscan.toml from the current directory or the path in the HEMOSCAN_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "HEMOSCAN_CONFIG";
pub const MODEL_PATH_ENV: &str = "HEMOSCAN_MODEL_PATH";
pub const DEFAULT_CONFIG_FILE: &str = "hemoscan.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid listen address {0}")]
    Address(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16    { 5000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// JSON export of the trained classifier.
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

fn default_model_path() -> PathBuf { PathBuf::from("model.json") }

impl Default for ModelConfig {
    fn default() -> Self {
        Self { path: default_model_path() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize { 16 * 1024 * 1024 }

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_bytes: default_max_bytes() }
    }
}

impl Config {
    /// Load configuration.
    /// An explicit HEMOSCAN_CONFIG path must exist; a missing hemoscan.toml
    /// in the working directory means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };

        if let Ok(model_path) = std::env::var(MODEL_PATH_ENV) {
            config.model.path = PathBuf::from(model_path);
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.model.path, PathBuf::from("model.json"));
        assert_eq!(config.upload.max_bytes, 16 * 1024 * 1024);
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [model]
            path = "/srv/models/leukemia.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.model.path, PathBuf::from("/srv/models/leukemia.json"));
        assert_eq!(config.upload, UploadConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upload]\nmax_bytes = 1024").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.upload.max_bytes, 1024);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file(Path::new("/nonexistent/hemoscan.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let err = toml::from_str::<Config>("[server]\nport = \"eighty\"").unwrap_err();
        assert!(ConfigError::from(err).to_string().starts_with("Invalid config"));
    }

    #[test]
    fn test_bad_listen_addr() {
        let mut config = Config::default();
        config.server.host = "not a host".to_string();
        assert!(matches!(config.listen_addr(), Err(ConfigError::Address(_))));
    }
}
