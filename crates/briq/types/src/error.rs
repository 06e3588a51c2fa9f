use serde::{Deserialize, Serialize};

/// Stable classification of every rejected call.
///
/// Each crate keeps its own error enum; all of them map onto one of these
/// codes so callers can branch on the rejection class without matching
/// across crate boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    DuplicateId,
    DuplicateMember,
    NotOwnedOrGrouped,
    AlreadyActive,
    Unauthorized,
    MembershipMismatch,
    InvalidMember,
    AlreadyInitialized,
    AlreadyBound,
    UnknownItem,
    ForeignCaller,
    IdOverflow,
    EmptyComposite,
    Dissolved,
    InvalidCompositeId,
    NotInitialized,
    LedgerNotBound,
    UnknownContract,
    Storage,
    Config,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateId => "duplicate_id",
            Self::DuplicateMember => "duplicate_member",
            Self::NotOwnedOrGrouped => "not_owned_or_grouped",
            Self::AlreadyActive => "already_active",
            Self::Unauthorized => "unauthorized",
            Self::MembershipMismatch => "membership_mismatch",
            Self::InvalidMember => "invalid_member",
            Self::AlreadyInitialized => "already_initialized",
            Self::AlreadyBound => "already_bound",
            Self::UnknownItem => "unknown_item",
            Self::ForeignCaller => "foreign_caller",
            Self::IdOverflow => "id_overflow",
            Self::EmptyComposite => "empty_composite",
            Self::Dissolved => "dissolved",
            Self::InvalidCompositeId => "invalid_composite_id",
            Self::NotInitialized => "not_initialized",
            Self::LedgerNotBound => "ledger_not_bound",
            Self::UnknownContract => "unknown_contract",
            Self::Storage => "storage",
            Self::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
