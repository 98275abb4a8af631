//! Configuration for poolctl

use pool_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Ledger tunables and trusted identities
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Snapshot file holding ledger state and journal
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            state_path: default_state_path(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("pool-ledger.json")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    /// Layer compiled defaults, an optional file and `POOL_*` variables.
    ///
    /// Nested keys use a double underscore: `POOL_LEDGER__ACCURACY_FACTOR=10`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("POOL")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("ledger.administrators")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.state_path, PathBuf::from("pool-ledger.json"));
        assert_eq!(config.ledger.max_participants_per_wallet, 100);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("poolctl.json");
        std::fs::write(
            &path,
            r#"{ "ledger": { "accuracy_factor": 10 }, "state_path": "custom.json" }"#,
        )
        .unwrap();

        let config = CliConfig::load(path.to_str()).unwrap();
        assert_eq!(config.ledger.accuracy_factor, 10);
        assert_eq!(config.ledger.max_participants_per_wallet, 100);
        assert_eq!(config.state_path, PathBuf::from("custom.json"));
    }
}
