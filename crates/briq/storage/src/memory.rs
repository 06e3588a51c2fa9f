//! In-memory reference implementation of the briq store.
//!
//! Deterministic and test-friendly. All state lives behind one lock so a
//! commit is observed either completely or not at all.

use std::collections::HashMap;
use std::sync::RwLock;

use briq_types::{Address, Composite, CompositeId, Item, ItemId};
use tracing::debug;

use crate::events::seal_event;
use crate::model::{EventRecord, QueryWindow, RegistryMeta, WriteSet};
use crate::traits::{EventLog, StateReader, StateStore};
use crate::{StorageError, StorageResult};

/// In-memory briq storage adapter.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    version: u64,
    items: HashMap<ItemId, Item>,
    owner_index: HashMap<Address, Vec<ItemId>>,
    composites: HashMap<CompositeId, Composite>,
    registry_meta: Option<RegistryMeta>,
    events: Vec<EventRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> StorageResult<T> {
        let guard = self
            .state
            .read()
            .map_err(|_| StorageError::Backend("store lock poisoned".to_string()))?;
        Ok(f(&guard))
    }
}

impl StateReader for InMemoryStore {
    fn item(&self, id: ItemId) -> StorageResult<Option<Item>> {
        self.read(|state| state.items.get(&id).cloned())
    }

    fn owner_items(&self, owner: Address) -> StorageResult<Vec<ItemId>> {
        self.read(|state| state.owner_index.get(&owner).cloned().unwrap_or_default())
    }

    fn composite(&self, id: CompositeId) -> StorageResult<Option<Composite>> {
        self.read(|state| state.composites.get(&id).cloned())
    }

    fn registry_meta(&self) -> StorageResult<Option<RegistryMeta>> {
        self.read(|state| state.registry_meta.clone())
    }
}

impl EventLog for InMemoryStore {
    fn events(&self, window: QueryWindow) -> StorageResult<Vec<EventRecord>> {
        self.read(|state| window.apply(state.events.clone()))
    }

    fn latest_event_hash(&self) -> StorageResult<Option<String>> {
        self.read(|state| state.events.last().map(|e| e.hash.clone()))
    }
}

impl StateStore for InMemoryStore {
    fn version(&self) -> StorageResult<u64> {
        self.read(|state| state.version)
    }

    fn commit(&self, base_version: u64, writes: WriteSet) -> StorageResult<Vec<EventRecord>> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| StorageError::Backend("store lock poisoned".to_string()))?;

        if writes.is_empty() {
            return Ok(Vec::new());
        }

        if guard.version != base_version {
            return Err(StorageError::Conflict(format!(
                "unit of work based on version {}, store is at {}",
                base_version, guard.version
            )));
        }

        // Seal every event before touching state so a serialization failure
        // leaves the store untouched.
        let mut previous = guard.events.last().map(|e| e.hash.clone());
        let mut sequence = guard.events.len() as u64;
        let mut sealed = Vec::with_capacity(writes.events.len());
        for event in writes.events {
            sequence += 1;
            let record = seal_event(event, previous.take(), sequence)?;
            previous = Some(record.hash.clone());
            sealed.push(record);
        }

        let state = &mut *guard;
        state.items.extend(writes.items);
        state.owner_index.extend(writes.owner_index);
        state.composites.extend(writes.composites);
        if let Some(meta) = writes.registry_meta {
            state.registry_meta = Some(meta);
        }
        state.events.extend(sealed.iter().cloned());
        state.version += 1;

        debug!(
            version = state.version,
            events = sealed.len(),
            "Write set committed"
        );
        Ok(sealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::verify_event_chain;
    use crate::model::{EventAppend, LedgerEvent};
    use briq_types::Material;
    use chrono::Utc;

    fn mint_writes(id: u128) -> WriteSet {
        let item = Item::new(ItemId(id), Address(0x11), Material(1));
        let mut writes = WriteSet::default();
        writes.owner_index.insert(Address(0x11), vec![item.id]);
        writes.events.push(EventAppend {
            timestamp: Utc::now(),
            emitter: Address(0x1),
            event: LedgerEvent::Minted {
                owner: item.owner,
                item: item.id,
                material: item.material,
            },
        });
        writes.items.insert(item.id, item);
        writes
    }

    #[test]
    fn commit_applies_all_writes_and_bumps_version() {
        let store = InMemoryStore::new();
        let records = store.commit(0, mint_writes(0x123)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(store.version().unwrap(), 1);
        assert!(store.item(ItemId(0x123)).unwrap().is_some());
        assert_eq!(store.owner_items(Address(0x11)).unwrap(), vec![ItemId(0x123)]);
        assert_eq!(
            store.latest_event_hash().unwrap(),
            Some(records[0].hash.clone())
        );
    }

    #[test]
    fn stale_base_version_is_rejected_without_effects() {
        let store = InMemoryStore::new();
        store.commit(0, mint_writes(1)).unwrap();

        let err = store.commit(0, mint_writes(2)).unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        assert!(store.item(ItemId(2)).unwrap().is_none());
        assert_eq!(store.events(QueryWindow::all()).unwrap().len(), 1);
    }

    #[test]
    fn empty_commit_is_a_no_op() {
        let store = InMemoryStore::new();
        assert!(store.commit(7, WriteSet::default()).unwrap().is_empty());
        assert_eq!(store.version().unwrap(), 0);
    }

    #[test]
    fn events_chain_across_commits() {
        let store = InMemoryStore::new();
        store.commit(0, mint_writes(1)).unwrap();
        store.commit(1, mint_writes(2)).unwrap();
        store.commit(2, mint_writes(3)).unwrap();

        let events = store.events(QueryWindow::all()).unwrap();
        assert_eq!(events.len(), 3);
        verify_event_chain(&events).unwrap();

        let page = store
            .events(QueryWindow {
                limit: 1,
                offset: 1,
            })
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].sequence, 2);
    }
}
