use briq_storage::StorageError;
use briq_types::{Address, ErrorCode, ItemId};
use thiserror::Error;

/// Item ledger errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("item {0} already minted")]
    DuplicateId(ItemId),

    #[error("item {0} does not exist")]
    UnknownItem(ItemId),

    #[error("caller {caller} may not change item groups")]
    ForeignCaller { caller: Address },

    #[error("batch of {count} items starting at {start} overflows the id space")]
    IdOverflow { start: ItemId, count: u64 },

    #[error("owner index for {owner} references missing item {item}")]
    IndexInconsistent { owner: Address, item: ItemId },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LedgerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateId(_) => ErrorCode::DuplicateId,
            Self::UnknownItem(_) => ErrorCode::UnknownItem,
            Self::ForeignCaller { .. } => ErrorCode::ForeignCaller,
            Self::IdOverflow { .. } => ErrorCode::IdOverflow,
            Self::IndexInconsistent { .. } | Self::Storage(_) => ErrorCode::Storage,
        }
    }
}
