use serde::{Deserialize, Serialize};

use crate::ids::{Address, CompositeId, ItemId, Material};

/// A minted item. Only `group` ever changes after minting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub owner: Address,
    pub material: Material,
    /// Composite currently holding the item, `None` when ungrouped.
    #[serde(default)]
    pub group: Option<CompositeId>,
}

impl Item {
    pub fn new(id: ItemId, owner: Address, material: Material) -> Self {
        Self {
            id,
            owner,
            material,
            group: None,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }

    pub fn to_owned_item(&self) -> OwnedItem {
        OwnedItem {
            id: self.id,
            material: self.material,
            group: self.group,
        }
    }
}

/// Composite lifecycle. A composite id with no record is uninitialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeStatus {
    Active,
    /// Terminal. The id can never be assembled again.
    Dissolved,
}

/// A composite (set) grouping a fixed list of items under one owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composite {
    pub id: CompositeId,
    pub owner: Address,
    /// Members in the order they were supplied at assembly.
    pub members: Vec<ItemId>,
    pub status: CompositeStatus,
}

impl Composite {
    pub fn is_active(&self) -> bool {
        matches!(self.status, CompositeStatus::Active)
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.members.contains(&item)
    }
}

/// One row of an owner enumeration: `(id, material, group)`.
///
/// On the wire this is the array `[id, material, group]`, with `0x0` for an
/// ungrouped item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OwnedTriple", from = "OwnedTriple")]
pub struct OwnedItem {
    pub id: ItemId,
    pub material: Material,
    pub group: Option<CompositeId>,
}

#[derive(Serialize, Deserialize)]
struct OwnedTriple(ItemId, Material, CompositeId);

impl From<OwnedItem> for OwnedTriple {
    fn from(item: OwnedItem) -> Self {
        Self(
            item.id,
            item.material,
            item.group.unwrap_or(CompositeId(CompositeId::UNGROUPED)),
        )
    }
}

impl From<OwnedTriple> for OwnedItem {
    fn from(OwnedTriple(id, material, group): OwnedTriple) -> Self {
        Self {
            id,
            material,
            group: group.is_valid().then_some(group),
        }
    }
}

impl OwnedItem {
    /// Raw triple with the ungrouped state encoded as `0`.
    pub fn as_triple(&self) -> (u128, u64, u128) {
        (
            self.id.get(),
            self.material.0,
            self.group.map_or(CompositeId::UNGROUPED, CompositeId::get),
        )
    }
}

/// Ordering policy applied to owner enumerations.
///
/// The owner index always records ids in mint order; a batch mint appends its
/// ids in ascending order exactly as the equivalent sequence of single mints
/// would. Group changes never move an item within the index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationOrder {
    /// Oldest mint first.
    #[default]
    MintOrder,
    /// Most recent mint first.
    NewestFirst,
}

/// Registry-local configuration fixed by `initialize`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// When set, only this address may bind the item ledger.
    #[serde(default)]
    pub admin: Option<Address>,
}
