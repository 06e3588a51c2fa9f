use std::collections::BTreeMap;

use briq_types::{Address, Composite, CompositeId, Item, ItemId, Material, RegistrySettings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted set-registry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMeta {
    pub settings: RegistrySettings,
    /// Item ledger bound through `bind_item_ledger`.
    pub ledger: Option<Address>,
    pub initialized_at: DateTime<Utc>,
}

/// Domain events emitted by the ledger and registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    Minted {
        owner: Address,
        item: ItemId,
        material: Material,
    },
    GroupChanged {
        item: ItemId,
        group: Option<CompositeId>,
    },
    RegistryInitialized {
        settings: RegistrySettings,
    },
    LedgerBound {
        ledger: Address,
    },
    Assembled {
        composite: CompositeId,
        owner: Address,
        members: Vec<ItemId>,
    },
    Disassembled {
        composite: CompositeId,
        owner: Address,
        members: Vec<ItemId>,
    },
}

/// Event append payload. Sequencing and hashes are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAppend {
    pub timestamp: DateTime<Utc>,
    /// Contract that emitted the event.
    pub emitter: Address,
    pub event: LedgerEvent,
}

/// Persistent tamper-evident event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: String,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub emitter: Address,
    pub event: LedgerEvent,
    pub previous_hash: Option<String>,
    pub hash: String,
}

/// Writes staged by one unit of work.
///
/// Owner index entries hold the complete list for the owner, so applying a
/// write set is a plain overwrite per key.
#[derive(Debug, Clone, Default)]
pub struct WriteSet {
    pub items: BTreeMap<ItemId, Item>,
    pub owner_index: BTreeMap<Address, Vec<ItemId>>,
    pub composites: BTreeMap<CompositeId, Composite>,
    pub registry_meta: Option<RegistryMeta>,
    pub events: Vec<EventAppend>,
}

impl WriteSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.owner_index.is_empty()
            && self.composites.is_empty()
            && self.registry_meta.is_none()
            && self.events.is_empty()
    }
}

/// Generic query window for paged reads. A zero limit means "no limit".
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

impl QueryWindow {
    pub fn all() -> Self {
        Self::default()
    }

    pub(crate) fn apply<T>(self, values: Vec<T>) -> Vec<T> {
        let iter = values.into_iter().skip(self.offset);
        if self.limit == 0 {
            iter.collect()
        } else {
            iter.take(self.limit).collect()
        }
    }
}
