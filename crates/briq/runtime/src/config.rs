//! Configuration for the briq runtime

use std::path::Path;

use briq_types::{Address, EnumerationOrder, RegistrySettings};
use serde::{Deserialize, Serialize};

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Contract addresses
    #[serde(default)]
    pub contracts: ContractsConfig,

    /// Item ledger configuration
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Set registry configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where each contract is deployed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    #[serde(default = "default_ledger_address")]
    pub ledger_address: Address,

    #[serde(default = "default_registry_address")]
    pub registry_address: Address,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            ledger_address: default_ledger_address(),
            registry_address: default_registry_address(),
        }
    }
}

/// Item ledger configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Order of `get_all_tokens_for_owner` results
    #[serde(default)]
    pub enumeration_order: EnumerationOrder,
}

/// Set registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Only address allowed to bind the item ledger
    #[serde(default)]
    pub admin: Option<Address>,

    /// Initialize the registry and bind the configured ledger at startup
    #[serde(default)]
    pub auto_initialize: bool,
}

impl RegistryConfig {
    pub fn settings(&self) -> RegistrySettings {
        RegistrySettings { admin: self.admin }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, used when `RUST_LOG` is unset
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

fn default_ledger_address() -> Address {
    Address(0x1)
}

fn default_registry_address() -> Address {
    Address(0x2)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RuntimeConfig {
    /// Load configuration: defaults, then the optional file, then `BRIQ_`
    /// environment variables (`BRIQ_LEDGER__ENUMERATION_ORDER=newest_first`).
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&RuntimeConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BRIQ")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
