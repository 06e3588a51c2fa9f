use briq_ledger::LedgerError;
use briq_storage::StorageError;
use briq_types::{Address, CompositeId, ErrorCode, ItemId};
use thiserror::Error;

/// Set registry errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("item {0} appears more than once in the member list")]
    DuplicateMember(ItemId),

    #[error("item {item} is missing, not owned by {owner}, or already grouped")]
    NotOwnedOrGrouped { item: ItemId, owner: Address },

    #[error("composite {0} is already active")]
    AlreadyActive(CompositeId),

    #[error("composite {0} was dissolved and cannot be reassembled")]
    Dissolved(CompositeId),

    #[error("composite {0} needs at least one member")]
    EmptyComposite(CompositeId),

    #[error("composite id 0 is reserved for ungrouped items")]
    InvalidCompositeId,

    #[error("{caller} is not the owner of active composite {composite}")]
    Unauthorized {
        caller: Address,
        composite: CompositeId,
    },

    #[error("{caller} is not the registry admin")]
    NotAdmin { caller: Address },

    #[error("member list does not match the members of composite {0}")]
    MembershipMismatch(CompositeId),

    #[error("item {item} is not grouped under composite {composite}")]
    InvalidMember { composite: CompositeId, item: ItemId },

    #[error("registry already initialized")]
    AlreadyInitialized,

    #[error("registry not initialized")]
    NotInitialized,

    #[error("item ledger already bound to {0}")]
    AlreadyBound(Address),

    #[error("no item ledger bound")]
    LedgerNotBound,

    #[error("no item ledger deployed at {0}")]
    UnknownContract(Address),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateMember(_) => ErrorCode::DuplicateMember,
            Self::NotOwnedOrGrouped { .. } => ErrorCode::NotOwnedOrGrouped,
            Self::AlreadyActive(_) => ErrorCode::AlreadyActive,
            Self::Dissolved(_) => ErrorCode::Dissolved,
            Self::EmptyComposite(_) => ErrorCode::EmptyComposite,
            Self::InvalidCompositeId => ErrorCode::InvalidCompositeId,
            Self::Unauthorized { .. } | Self::NotAdmin { .. } => ErrorCode::Unauthorized,
            Self::MembershipMismatch(_) => ErrorCode::MembershipMismatch,
            Self::InvalidMember { .. } => ErrorCode::InvalidMember,
            Self::AlreadyInitialized => ErrorCode::AlreadyInitialized,
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyBound(_) => ErrorCode::AlreadyBound,
            Self::LedgerNotBound => ErrorCode::LedgerNotBound,
            Self::UnknownContract(_) => ErrorCode::UnknownContract,
            Self::Ledger(err) => err.code(),
            Self::Storage(_) => ErrorCode::Storage,
        }
    }
}
