//! Connection settings for the catalog database and the Horus media service.
//!
//! Settings are plain values: the bridge holds one [`BridgeSettings`] and
//! replaces it wholesale whenever a [`SettingsUpdate`] is applied. Secrets are
//! kept out of `Debug` output and out of the [`RedactedSettings`] view that
//! diagnostics endpoints return.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default PostgreSQL port when none is configured.
pub const DEFAULT_DB_PORT: &str = "5432";

/// Default Horus web service base URL.
pub const DEFAULT_HORUS_URL: &str = "http://localhost:5050/web/";

/// Default per-request timeout against the Horus service, in seconds.
pub const DEFAULT_HORUS_TIMEOUT_SECS: u64 = 20;

/* --------------------------------------------------------------------------
Database
-------------------------------------------------------------------------- */

/// Parameters for the catalog database connection.
///
/// All fields are strings as received from the client. `host`, `database`
/// and `user` are required; `password` may be empty.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: String,
    #[serde(default, alias = "dbname")]
    pub database: String,
    #[serde(default, alias = "dbuser")]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

fn default_db_port() -> String {
    DEFAULT_DB_PORT.to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_db_port(),
            database: String::new(),
            user: String::new(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl ConnectionConfig {
    /// Names of required fields that are blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<String> {
        [
            ("host", &self.host),
            ("database", &self.database),
            ("user", &self.user),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect()
    }

    /// Validate the config and return the parsed TCP port.
    ///
    /// Reports every absent required field at once. A blank port falls back
    /// to [`DEFAULT_DB_PORT`].
    pub fn validate(&self) -> Result<u16, CoreError> {
        let fields = self.missing_fields();
        if !fields.is_empty() {
            return Err(CoreError::MissingField { fields });
        }

        let port = self.port.trim();
        let port = if port.is_empty() { DEFAULT_DB_PORT } else { port };
        match port.parse::<u16>() {
            Ok(0) | Err(_) => Err(CoreError::Validation(format!(
                "Database port must be a number between 1 and 65535 (got '{port}')"
            ))),
            Ok(p) => Ok(p),
        }
    }

    /// `host:port/database` label for log lines.
    pub fn target_label(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

/* --------------------------------------------------------------------------
Horus
-------------------------------------------------------------------------- */

/// Parameters for the Horus media web service.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct HorusConfig {
    #[serde(default = "default_horus_url")]
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_horus_timeout")]
    pub timeout_secs: u64,
}

fn default_horus_url() -> String {
    DEFAULT_HORUS_URL.to_string()
}

fn default_horus_timeout() -> u64 {
    DEFAULT_HORUS_TIMEOUT_SECS
}

impl Default for HorusConfig {
    fn default() -> Self {
        Self {
            url: default_horus_url(),
            username: None,
            password: None,
            timeout_secs: DEFAULT_HORUS_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for HorusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HorusConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl HorusConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(CoreError::MissingField {
                fields: vec!["url".to_string()],
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::Validation(format!(
                "Horus URL must start with http:// or https:// (got '{url}')"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::Validation(
                "Horus timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/* --------------------------------------------------------------------------
Combined settings
-------------------------------------------------------------------------- */

/// Everything the bridge needs to open a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeSettings {
    pub database: ConnectionConfig,
    pub horus: HorusConfig,
}

/// Partial database settings; `None` leaves the current value in place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionConfigUpdate {
    pub host: Option<String>,
    pub port: Option<String>,
    #[serde(alias = "dbname")]
    pub database: Option<String>,
    #[serde(alias = "dbuser")]
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Partial Horus settings; `None` leaves the current value in place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HorusConfigUpdate {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Body of a settings change: `{ "database": {...}, "horus": {...} }`.
///
/// Also the shape of the JSON settings file accepted on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub database: Option<ConnectionConfigUpdate>,
    pub horus: Option<HorusConfigUpdate>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.database.is_none() && self.horus.is_none()
    }
}

impl BridgeSettings {
    /// Produce new settings with `update` merged over `self`.
    pub fn merged(&self, update: &SettingsUpdate) -> BridgeSettings {
        let mut next = self.clone();

        if let Some(db) = &update.database {
            merge_field(&mut next.database.host, &db.host);
            merge_field(&mut next.database.port, &db.port);
            merge_field(&mut next.database.database, &db.database);
            merge_field(&mut next.database.user, &db.user);
            if let Some(password) = &db.password {
                next.database.password = password.clone();
            }
        }

        if let Some(horus) = &update.horus {
            merge_field(&mut next.horus.url, &horus.url);
            if horus.username.is_some() {
                next.horus.username = horus.username.clone().filter(|u| !u.is_empty());
            }
            if horus.password.is_some() {
                next.horus.password = horus.password.clone().filter(|p| !p.is_empty());
            }
            if let Some(timeout) = horus.timeout_secs {
                next.horus.timeout_secs = timeout;
            }
        }

        next
    }

    /// Secret-free view for health and diagnostics responses.
    pub fn redacted(&self) -> RedactedSettings {
        RedactedSettings {
            database: RedactedDatabase {
                host: self.database.host.clone(),
                port: self.database.port.clone(),
                database: self.database.database.clone(),
                user: self.database.user.clone(),
                password_set: !self.database.password.is_empty(),
            },
            horus: RedactedHorus {
                url: self.horus.url.clone(),
                username: self.horus.username.clone(),
                password_set: self.horus.password.is_some(),
                timeout_secs: self.horus.timeout_secs,
            },
        }
    }
}

fn merge_field(target: &mut String, value: &Option<String>) {
    if let Some(v) = value {
        *target = v.trim().to_string();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RedactedSettings {
    pub database: RedactedDatabase,
    pub horus: RedactedHorus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedactedDatabase {
    pub host: String,
    pub port: String,
    pub database: String,
    pub user: String,
    pub password_set: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedactedHorus {
    pub url: String,
    pub username: Option<String>,
    pub password_set: bool,
    pub timeout_secs: u64,
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
