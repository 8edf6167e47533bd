//! Environment-driven configuration, read once at startup.

use std::net::SocketAddr;

use sqlx::mysql::MySqlConnectOptions;

/// MySQL port. Fixed in this deployment, not configurable.
const MYSQL_PORT: u16 = 3306;

/// Default bind address when `BIND_ADDR` is unset.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid bind address '{value}'")]
    InvalidBindAddr { value: String },
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbConfig {
    /// Read `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: get("DB_HOST").ok_or(ConfigError::MissingVar("DB_HOST"))?,
            user: get("DB_USER").ok_or(ConfigError::MissingVar("DB_USER"))?,
            password: get("DB_PASSWORD").ok_or(ConfigError::MissingVar("DB_PASSWORD"))?,
            database: get("DB_NAME").ok_or(ConfigError::MissingVar("DB_NAME"))?,
        })
    }

    /// Driver connect options for these settings.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(MYSQL_PORT)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Full server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub bind_addr: SocketAddr,
    /// Use a connection pool instead of per-request connections (`DB_POOL=1`).
    pub pooled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db = DbConfig::from_lookup(&get)?;

        let bind = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr { value: bind })?;

        let pooled = matches!(
            get("DB_POOL").as_deref(),
            Some("1") | Some("true") | Some("yes")
        );

        Ok(Self {
            db,
            bind_addr,
            pooled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn base_env() -> HashMap<String, String> {
        env(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "contacts"),
        ])
    }

    #[test]
    fn reads_all_database_variables() {
        let vars = base_env();
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.db.host, "db.internal");
        assert_eq!(config.db.user, "app");
        assert_eq!(config.db.database, "contacts");
        assert!(!config.pooled);
    }

    #[test]
    fn missing_variable_is_an_error() {
        let mut vars = base_env();
        vars.remove("DB_PASSWORD");

        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DB_PASSWORD")));
    }

    #[test]
    fn default_bind_addr() {
        let vars = base_env();
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
    }

    #[test]
    fn invalid_bind_addr_is_an_error() {
        let mut vars = base_env();
        vars.insert("BIND_ADDR".into(), "not-an-addr".into());

        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    }

    #[test]
    fn pool_flag() {
        let mut vars = base_env();
        vars.insert("DB_POOL".into(), "1".into());

        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert!(config.pooled);
    }
}
