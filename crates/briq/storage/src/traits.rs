use briq_types::{Address, Composite, CompositeId, Item, ItemId};

use crate::model::{EventRecord, QueryWindow, RegistryMeta, WriteSet};
use crate::StorageResult;

/// Read access to persisted ledger and registry state.
pub trait StateReader {
    /// Get one item by id.
    fn item(&self, id: ItemId) -> StorageResult<Option<Item>>;

    /// Ids owned by `owner`, in mint order.
    fn owner_items(&self, owner: Address) -> StorageResult<Vec<ItemId>>;

    /// Get one composite by id, active or dissolved.
    fn composite(&self, id: CompositeId) -> StorageResult<Option<Composite>>;

    fn registry_meta(&self) -> StorageResult<Option<RegistryMeta>>;
}

/// Read access to the append-only event log.
pub trait EventLog {
    /// Read events oldest-first.
    fn events(&self, window: QueryWindow) -> StorageResult<Vec<EventRecord>>;

    /// Hash of the newest event, if any.
    fn latest_event_hash(&self) -> StorageResult<Option<String>>;
}

/// A store that applies whole write sets atomically.
pub trait StateStore: StateReader + EventLog + Send + Sync {
    /// Monotonic counter bumped by every non-empty commit.
    fn version(&self) -> StorageResult<u64>;

    /// Apply `writes` if the store is still at `base_version`.
    ///
    /// Either every write and event lands, or nothing does. Returns the
    /// appended event records.
    fn commit(&self, base_version: u64, writes: WriteSet) -> StorageResult<Vec<EventRecord>>;
}
