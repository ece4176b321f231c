use serde::{Deserialize, Serialize};
use std::path::Path;
use std::fs;
use std::env;
use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.coincap.io/v2";
pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 80;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WalletConfig {
    /// Minimum 0-100 score a fuzzy name match must reach.
    pub similarity_threshold: u8,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise starts from defaults, then
    /// applies environment overrides.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Config::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = env::var("COINCAP_BASE_URL") {
            self.api.base_url = url;
        }
        if let Ok(port) = env::var("WALLET_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::ConfigError(format!("WALLET_PORT is not a port: {}", port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::ConfigError("api.base_url cannot be empty".to_string()));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(Error::ConfigError("api.request_timeout_secs must be positive".to_string()));
        }
        if self.wallet.similarity_threshold > 100 {
            return Err(Error::ConfigError(format!(
                "wallet.similarity_threshold must be within 0-100, got {}",
                self.wallet.similarity_threshold
            )));
        }
        Ok(())
    }
}
