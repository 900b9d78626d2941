//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/retail-siting/config.toml
//!
//! Provider credentials and the database URL can be overridden from the
//! environment so secrets never need to live in the config file.

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Persistence settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// External provider endpoints and credentials
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Backfill worker settings
    #[serde(default)]
    pub backfill: BackfillConfig,

    /// Projected coordinate system of the bulk address file
    #[serde(default)]
    pub projection: ProjectionConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under /static
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Bulk address file loaded when the table is empty
    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    /// Whether the bulk file coordinates are projected (true) or WGS84 (false)
    #[serde(default = "default_csv_projected")]
    pub csv_projected: bool,
}

/// External provider endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Base URL of the geocode / reverse geocode gateway
    #[serde(default = "default_maps_url")]
    pub maps_url: String,

    /// Base URL of the keyword search API
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Per-call connect/read timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maps gateway key id
    #[serde(default)]
    pub ncp_client_id: String,

    /// Maps gateway key
    #[serde(default)]
    pub ncp_client_secret: String,

    /// Search API client id
    #[serde(default)]
    pub search_client_id: String,

    /// Search API client secret
    #[serde(default)]
    pub search_client_secret: String,
}

/// Backfill worker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillConfig {
    /// Start a backfill run when the server starts
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,

    /// Delay between geocoding calls in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

/// Transverse Mercator parameters of the bulk file's projected CRS
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProjectionConfig {
    #[serde(default = "default_semi_major_axis")]
    pub semi_major_axis: f64,
    #[serde(default = "default_inverse_flattening")]
    pub inverse_flattening: f64,
    #[serde(default = "default_latitude_of_origin")]
    pub latitude_of_origin: f64,
    #[serde(default = "default_central_meridian")]
    pub central_meridian: f64,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default = "default_false_easting")]
    pub false_easting: f64,
    #[serde(default = "default_false_northing")]
    pub false_northing: f64,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_static_dir() -> String {
    DEFAULT_STATIC_DIR.to_string()
}
fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}
fn default_csv_path() -> String {
    DEFAULT_CSV_PATH.to_string()
}
fn default_csv_projected() -> bool {
    DEFAULT_CSV_PROJECTED
}
fn default_maps_url() -> String {
    crate::constants::api::NCP_MAPS_URL.to_string()
}
fn default_search_url() -> String {
    crate::constants::api::NAVER_SEARCH_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_run_on_startup() -> bool {
    DEFAULT_RUN_ON_STARTUP
}
fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}
fn default_semi_major_axis() -> f64 {
    DEFAULT_SEMI_MAJOR_AXIS
}
fn default_inverse_flattening() -> f64 {
    DEFAULT_INVERSE_FLATTENING
}
fn default_latitude_of_origin() -> f64 {
    DEFAULT_LATITUDE_OF_ORIGIN
}
fn default_central_meridian() -> f64 {
    DEFAULT_CENTRAL_MERIDIAN
}
fn default_scale_factor() -> f64 {
    DEFAULT_SCALE_FACTOR
}
fn default_false_easting() -> f64 {
    DEFAULT_FALSE_EASTING
}
fn default_false_northing() -> f64 {
    DEFAULT_FALSE_NORTHING
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            csv_path: default_csv_path(),
            csv_projected: default_csv_projected(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            maps_url: default_maps_url(),
            search_url: default_search_url(),
            timeout_secs: default_timeout_secs(),
            ncp_client_id: String::new(),
            ncp_client_secret: String::new(),
            search_client_id: String::new(),
            search_client_secret: String::new(),
        }
    }
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            run_on_startup: default_run_on_startup(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            semi_major_axis: default_semi_major_axis(),
            inverse_flattening: default_inverse_flattening(),
            latitude_of_origin: default_latitude_of_origin(),
            central_meridian: default_central_meridian(),
            scale_factor: default_scale_factor(),
            false_easting: default_false_easting(),
            false_northing: default_false_northing(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path and apply environment overrides
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from the default path without environment overrides
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Overlay credentials and the database URL from environment variables
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("NCP_CLIENT_ID") {
            self.providers.ncp_client_id = v;
        }
        if let Some(v) = get("NCP_CLIENT_SECRET") {
            self.providers.ncp_client_secret = v;
        }
        if let Some(v) = get("NAVER_CLIENT_ID") {
            self.providers.search_client_id = v;
        }
        if let Some(v) = get("NAVER_CLIENT_SECRET") {
            self.providers.search_client_secret = v;
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database.url = v;
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Secrets are masked.
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        let mask = |s: &str| if s.is_empty() { String::new() } else { "********".to_string() };

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "static_dir"] => Some(self.server.static_dir.clone()),

            ["database", "url"] => Some(self.database.url.clone()),
            ["database", "csv_path"] => Some(self.database.csv_path.clone()),
            ["database", "csv_projected"] => Some(self.database.csv_projected.to_string()),

            ["providers", "maps_url"] => Some(self.providers.maps_url.clone()),
            ["providers", "search_url"] => Some(self.providers.search_url.clone()),
            ["providers", "timeout_secs"] => Some(self.providers.timeout_secs.to_string()),
            ["providers", "ncp_client_id"] => Some(self.providers.ncp_client_id.clone()),
            ["providers", "ncp_client_secret"] => Some(mask(&self.providers.ncp_client_secret)),
            ["providers", "search_client_id"] => Some(self.providers.search_client_id.clone()),
            ["providers", "search_client_secret"] => {
                Some(mask(&self.providers.search_client_secret))
            }

            ["backfill", "run_on_startup"] => Some(self.backfill.run_on_startup.to_string()),
            ["backfill", "delay_ms"] => Some(self.backfill.delay_ms.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }
            ["server", "static_dir"] => {
                self.server.static_dir = value.to_string();
            }

            ["database", "url"] => {
                self.database.url = value.to_string();
            }
            ["database", "csv_path"] => {
                self.database.csv_path = value.to_string();
            }
            ["database", "csv_projected"] => {
                self.database.csv_projected = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }

            ["providers", "maps_url"] => {
                self.providers.maps_url = value.to_string();
            }
            ["providers", "search_url"] => {
                self.providers.search_url = value.to_string();
            }
            ["providers", "timeout_secs"] => {
                self.providers.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }
            ["providers", "ncp_client_id"] => {
                self.providers.ncp_client_id = value.to_string();
            }
            ["providers", "ncp_client_secret"] => {
                self.providers.ncp_client_secret = value.to_string();
            }
            ["providers", "search_client_id"] => {
                self.providers.search_client_id = value.to_string();
            }
            ["providers", "search_client_secret"] => {
                self.providers.search_client_secret = value.to_string();
            }

            ["backfill", "run_on_startup"] => {
                self.backfill.run_on_startup = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }
            ["backfill", "delay_ms"] => {
                self.backfill.delay_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid delay value: {}", value))
                })?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "server.static_dir",
            "database.url",
            "database.csv_path",
            "database.csv_projected",
            "providers.maps_url",
            "providers.search_url",
            "providers.timeout_secs",
            "providers.ncp_client_id",
            "providers.ncp_client_secret",
            "providers.search_client_id",
            "providers.search_client_secret",
            "backfill.run_on_startup",
            "backfill.delay_ms",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.providers.timeout_secs, 10);
        assert_eq!(config.backfill.delay_ms, 100);
        assert!(config.backfill.run_on_startup);
        assert_eq!(config.projection.central_meridian, 127.0);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("backfill.delay_ms"), Some("100".to_string()));

        config.set("backfill.delay_ms", "250").unwrap();
        assert_eq!(config.backfill.delay_ms, 250);

        config.set("database.csv_projected", "false").unwrap();
        assert_eq!(config.get("database.csv_projected"), Some("false".to_string()));
    }

    #[test]
    fn test_get_masks_secrets() {
        let mut config = Config::default();
        assert_eq!(config.get("providers.ncp_client_secret"), Some(String::new()));

        config.set("providers.ncp_client_secret", "s3cret").unwrap();
        assert_eq!(
            config.get("providers.ncp_client_secret"),
            Some("********".to_string())
        );
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("server.port", "not_a_port").is_err());
        assert!(config.set("backfill.run_on_startup", "maybe").is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NCP_CLIENT_ID", "ncp-id"),
            ("NAVER_CLIENT_SECRET", "search-secret"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("NCP_CLIENT_SECRET", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.providers.ncp_client_secret = "from-file".to_string();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.providers.ncp_client_id, "ncp-id");
        assert_eq!(config.providers.search_client_secret, "search-secret");
        assert_eq!(config.database.url, "sqlite::memory:");
        // empty values do not clobber the file
        assert_eq!(config.providers.ncp_client_secret, "from-file");
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.server.port = 5050;
            config.database.csv_path = "/tmp/addresses.csv".to_string();
            config.save().unwrap();

            let loaded = Config::load_file().unwrap();
            assert_eq!(loaded.server.port, 5050);
            assert_eq!(loaded.database.csv_path, "/tmp/addresses.csv");
        });
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(loaded.server.port, 9000);
        assert_eq!(loaded.server.host, "127.0.0.1");
        assert_eq!(loaded.projection, ProjectionConfig::default());
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[server]"));
        assert!(toml.contains("[database]"));
        assert!(toml.contains("[providers]"));
        assert!(toml.contains("[backfill]"));
        assert!(toml.contains("[projection]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn test_available_keys() {
        let keys = Config::available_keys();
        assert!(keys.contains(&"server.port"));
        assert!(keys.contains(&"providers.search_client_id"));
        assert!(keys.contains(&"backfill.delay_ms"));
    }
}
