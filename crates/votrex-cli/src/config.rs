//! Configuration for the votrex CLI

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use votrex_access::AccessConfig;
use votrex_types::WalletAddress;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Owner of the whole system
    #[serde(default)]
    pub system_admin_address: Option<String>,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ledger backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LedgerConfig {
    /// In-memory contract double, optionally seeded from a JSON fixture
    Memory {
        #[serde(default)]
        fixture: Option<PathBuf>,
    },

    /// JSON relay in front of the deployed contracts
    Http {
        endpoint: String,

        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig::Memory { fixture: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

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

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CliConfig {
    /// Defaults, then the optional file, then `VOTREX_`-prefixed environment.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // VOTREX_LEDGER__ENDPOINT sets ledger.endpoint
        builder = builder.add_source(
            config::Environment::with_prefix("VOTREX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Access settings derived from this config.
    pub fn access(&self) -> AccessConfig {
        match &self.system_admin_address {
            Some(address) => AccessConfig::default().with_system_admin(WalletAddress::new(address)),
            None => AccessConfig::default(),
        }
    }
}
