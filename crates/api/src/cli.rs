//! Command-line flags for the `horus-bridge` binary.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bridge_core::config::{BridgeSettings, SettingsUpdate};
use clap::Parser;

use crate::config::ServerConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "horus-bridge")]
#[command(about = "Bridge between a recordings catalog, the Horus media service and a desktop client")]
pub struct Cli {
    /// Bind address (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// JSON file with initial `database` and `horus` settings
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Apply flag overrides on top of the environment configuration.
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }

    /// Initial settings: defaults, merged with the settings file if one was given.
    pub fn initial_settings(&self) -> anyhow::Result<BridgeSettings> {
        let defaults = BridgeSettings::default();
        match &self.config {
            Some(path) => Ok(defaults.merged(&load_settings_file(path)?)),
            None => Ok(defaults),
        }
    }
}

/// Read a settings file in the `PUT /config` body shape.
pub fn load_settings_file(path: &Path) -> anyhow::Result<SettingsUpdate> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Settings file {} is not valid JSON settings", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from(["horus-bridge", "--host", "0.0.0.0", "--port", "8080"]);
        let mut config = ServerConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn absent_flags_keep_environment() {
        let cli = Cli::parse_from(["horus-bridge"]);
        let mut config = ServerConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5001);
    }

    #[test]
    fn settings_file_seeds_initial_settings() {
        let path = std::env::temp_dir().join(format!("horus-bridge-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"database": {"host": "db.local", "port": "5433", "user": "horus"},
                "horus": {"url": "http://horus.local/web/"}}"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(path.clone()),
            ..Cli::default()
        };
        let settings = cli.initial_settings().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.database.host, "db.local");
        assert_eq!(settings.database.port, "5433");
        assert_eq!(settings.database.user, "horus");
        assert_eq!(settings.horus.url, "http://horus.local/web/");
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/horus-bridge.json")),
            ..Cli::default()
        };
        assert!(cli.initial_settings().is_err());
    }
}
