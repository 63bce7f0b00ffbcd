use std::time::Duration;

use anyhow::Context;
use bridge_db::resolver::DEFAULT_CONNECT_TIMEOUT;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to the desktop client
/// on the same machine. Command-line flags override the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `5001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Budget for each database connect attempt in seconds (default: `10`).
    pub db_connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            cors_origins: vec!["http://localhost:5001".to_string()],
            request_timeout_secs: 120,
            db_connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `HOST`                    | `127.0.0.1`              |
    /// | `PORT`                    | `5001`                   |
    /// | `CORS_ORIGINS`            | `http://localhost:5001`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `120`                    |
    /// | `DB_CONNECT_TIMEOUT_SECS` | `10`                     |
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port = env_parse("PORT", defaults.port)?;

        let cors_origins: Vec<String> = match std::env::var("CORS_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.cors_origins,
        };

        let request_timeout_secs = env_parse("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?;
        let db_connect_timeout_secs =
            env_parse("DB_CONNECT_TIMEOUT_SECS", defaults.db_connect_timeout_secs)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            db_connect_timeout_secs,
        })
    }

    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout_secs)
    }
}

fn env_parse<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a valid number (got '{raw}')")),
        Err(_) => Ok(default),
    }
}
