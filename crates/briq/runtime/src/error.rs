use briq_ledger::LedgerError;
use briq_set_registry::RegistryError;
use briq_storage::StorageError;
use briq_types::ErrorCode;
use thiserror::Error;

/// Result type for runtime entry points.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors surfaced by the runtime to callers.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("telemetry error: {0}")]
    Telemetry(String),

    #[error("commit gate poisoned")]
    GatePoisoned,
}

impl RuntimeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Ledger(err) => err.code(),
            Self::Registry(err) => err.code(),
            Self::Storage(_) | Self::GatePoisoned => ErrorCode::Storage,
            Self::Config(_) | Self::Telemetry(_) => ErrorCode::Config,
        }
    }
}

impl From<config::ConfigError> for RuntimeError {
    fn from(value: config::ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
