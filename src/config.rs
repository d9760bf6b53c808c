//! Configuration for routevault

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the SQLite database file
    #[serde(default = "default_database_url")]
    pub database_url: PathBuf,

    /// Database file name (without extension)
    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Shared secret used to sign and verify tokens
    #[serde(default)]
    pub token_key: Option<String>,

    /// Secret that must be passed as `deleteKey` to wipe all routes
    #[serde(default)]
    pub delete_key: Option<String>,

    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Connection pool settings
    #[serde(default)]
    pub pool: PoolSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Maximum number of pooled connections
    #[serde(default = "default_pool_max_size")]
    pub max_size: u32,

    /// Seconds to wait for a free connection
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_url: default_database_url(),
            database_name: default_database_name(),
            token_key: None,
            delete_key: None,
            token_ttl_secs: default_token_ttl_secs(),
            pool: PoolSettings::default(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: default_pool_max_size(),
            connection_timeout_secs: default_connection_timeout_secs(),
        }
    }
}

impl Config {
    /// Load config from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            Some(path) => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            None => Config::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(url) = lookup("FINAL_URL").or_else(|| lookup("DATABASE_URL")) {
            self.database_url = PathBuf::from(url);
        }
        if let Some(name) = lookup("DBNAME") {
            self.database_name = name;
        }
        if let Some(key) = lookup("TOKEN_KEY") {
            self.token_key = Some(key);
        }
        if let Some(key) = lookup("DELETE_KEY") {
            self.delete_key = Some(key);
        }
        if let Some(ttl) = lookup("TOKEN_TTL_SECS") {
            self.token_ttl_secs = ttl.parse().map_err(|_| {
                Error::Config(format!("TOKEN_TTL_SECS is not a number: {}", ttl))
            })?;
        }
        Ok(())
    }

    /// Path to the SQLite database file
    pub fn db_path(&self) -> PathBuf {
        self.database_url.join(format!("{}.db", self.database_name))
    }

    /// The token signing secret, required to serve
    pub fn token_key(&self) -> Result<&str> {
        self.token_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("TOKEN_KEY is not set".into()))
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.pool.connection_timeout_secs)
    }
}

// Default value functions

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> PathBuf {
    PathBuf::from("./data")
}

fn default_database_name() -> String {
    "routevault".to_string()
}

fn default_token_ttl_secs() -> u64 {
    2 * 60 * 60
}

fn default_pool_max_size() -> u32 {
    10
}

fn default_connection_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path(), PathBuf::from("./data/routevault.db"));
        assert!(config.token_key().is_err());
        assert_eq!(config.token_ttl(), Duration::from_secs(7200));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("PORT", "8080"),
                ("FINAL_URL", "/var/lib/routes"),
                ("DBNAME", "prod"),
                ("TOKEN_KEY", "s3cret"),
                ("DELETE_KEY", "wipe"),
            ]))
            .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path(), PathBuf::from("/var/lib/routes/prod.db"));
        assert_eq!(config.token_key().unwrap(), "s3cret");
        assert_eq!(config.delete_key.as_deref(), Some("wipe"));
    }

    #[test]
    fn test_final_url_wins_over_database_url() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[("DATABASE_URL", "/b"), ("FINAL_URL", "/a")]))
            .unwrap();
        assert_eq!(config.database_url, PathBuf::from("/a"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup_from(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_token_key_is_missing() {
        let config = Config {
            token_key: Some(String::new()),
            ..Config::default()
        };
        assert!(config.token_key().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            port = 4000
            database_name = "routes"
            delete_key = "k"

            [pool]
            max_size = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.database_name, "routes");
        assert_eq!(config.pool.max_size, 4);
        assert_eq!(config.pool.connection_timeout_secs, 30);
    }
}
