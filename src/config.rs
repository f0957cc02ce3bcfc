//! Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::http::auth::parse_algorithm;
use crate::http::DEFAULT_HTTP_VERSION;
use crate::rules::MatchMode;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Request text codec settings
    pub codec: CodecConfig,

    /// Match/hide rule settings
    pub rules: RulesConfig,

    /// JWT signing settings for generate mode
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Version written on encoded request lines
    pub http_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Mode used when a rule document does not name one
    pub mode: MatchMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Shared secret (HS*) or PEM private key; generation is disabled when unset
    pub secret: Option<String>,

    /// Signing algorithm
    pub algorithm: String,

    /// Token lifetime in seconds
    pub expiration_secs: i64,

    /// `sub` claim
    pub subject: Option<String>,

    /// `iss` claim
    pub issuer: Option<String>,

    /// Extra claims merged into every token
    pub claims: HashMap<String, serde_json::Value>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            http_version: DEFAULT_HTTP_VERSION.to_string(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            algorithm: "HS256".to_string(),
            expiration_secs: 3600, // 1 hour
            subject: None,
            issuer: None,
            claims: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            let config = Self::from_toml(&contents)?;

            tracing::info!("Loaded configuration from {:?}", config_path);
            Ok(config)
        } else if path.is_some() {
            Err(ConfigError::NotFound(config_path.display().to_string()).into())
        } else {
            tracing::info!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        tracing::info!("Saved configuration to {:?}", config_path);
        Ok(())
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.codec.http_version.starts_with("HTTP/") {
            return Err(ConfigError::ValidationError {
                field: "codec.http_version".to_string(),
                reason: format!("'{}' must start with HTTP/", self.codec.http_version),
            });
        }

        if self.jwt.expiration_secs <= 0 {
            return Err(ConfigError::ValidationError {
                field: "jwt.expiration_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if parse_algorithm(&self.jwt.algorithm).is_none() {
            return Err(ConfigError::ValidationError {
                field: "jwt.algorithm".to_string(),
                reason: format!("unsupported algorithm '{}'", self.jwt.algorithm),
            });
        }

        Ok(())
    }

    /// Get default configuration file path
    fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("io", "apifuzz", "apifuzz")
            .context("Failed to determine config directory")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("io", "apifuzz", "apifuzz")
            .context("Failed to determine data directory")?;

        Ok(dirs.data_dir().to_path_buf())
    }
}
