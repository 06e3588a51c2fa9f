//! Serializable form of every runtime entry point.

use briq_types::{Address, Composite, CompositeId, ItemId, Material, OwnedItem};
use serde::{Deserialize, Serialize};

/// One external call, as submitted by a transaction or a replay script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call {
    /// Ledger: mint one item.
    Mint {
        owner: Address,
        token_id: ItemId,
        material: Material,
    },
    /// Ledger: mint `nb` items with consecutive ids.
    MintMultiple {
        owner: Address,
        token_start: ItemId,
        material: Material,
        nb: u64,
    },
    /// Ledger: enumerate `owner`'s items.
    GetAllTokensForOwner { owner: Address },
    /// Registry: one-time setup using the configured settings.
    Initialize,
    /// Registry: bind the item ledger.
    SetBriqContract {
        address: Address,
        #[serde(default)]
        caller: Address,
    },
    /// Registry: assemble a composite.
    #[serde(alias = "mint_set")]
    Assemble {
        owner: Address,
        token_id: CompositeId,
        bricks: Vec<ItemId>,
    },
    /// Registry: dissolve a composite.
    Disassemble {
        user: Address,
        token_id: CompositeId,
        bricks: Vec<ItemId>,
    },
}

impl Call {
    pub fn entry_point(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::MintMultiple { .. } => "mint_multiple",
            Self::GetAllTokensForOwner { .. } => "get_all_tokens_for_owner",
            Self::Initialize => "initialize",
            Self::SetBriqContract { .. } => "set_briq_contract",
            Self::Assemble { .. } => "assemble",
            Self::Disassemble { .. } => "disassemble",
        }
    }

    /// The account whose holdings this call reads or changes.
    pub fn subject(&self) -> Option<Address> {
        match self {
            Self::Mint { owner, .. }
            | Self::MintMultiple { owner, .. }
            | Self::GetAllTokensForOwner { owner }
            | Self::Assemble { owner, .. } => Some(*owner),
            Self::Disassemble { user, .. } => Some(*user),
            Self::Initialize | Self::SetBriqContract { .. } => None,
        }
    }
}

/// Result of a dispatched call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "output", rename_all = "snake_case")]
pub enum CallOutput {
    Done,
    Minted { ids: Vec<ItemId> },
    Tokens { owner: Address, items: Vec<OwnedItem> },
    Composite { composite: Composite },
}
