use briq_types::{Address, Composite, CompositeId, Item, ItemId};
use chrono::Utc;

use crate::model::{EventAppend, EventRecord, LedgerEvent, RegistryMeta, WriteSet};
use crate::traits::{StateReader, StateStore};
use crate::StorageResult;

/// Transactional boundary shared by every component touched by one call.
///
/// Reads see this unit's own staged writes layered over the store. Nothing
/// reaches the store until [`UnitOfWork::commit`]; dropping the unit discards
/// every staged write.
pub struct UnitOfWork<'s> {
    store: &'s dyn StateStore,
    base_version: u64,
    writes: WriteSet,
}

impl<'s> UnitOfWork<'s> {
    pub fn begin(store: &'s dyn StateStore) -> StorageResult<Self> {
        Ok(Self {
            store,
            base_version: store.version()?,
            writes: WriteSet::default(),
        })
    }

    pub fn put_item(&mut self, item: Item) {
        self.writes.items.insert(item.id, item);
    }

    /// Append `id` to the end of `owner`'s index.
    pub fn push_owner_item(&mut self, owner: Address, id: ItemId) -> StorageResult<()> {
        if !self.writes.owner_index.contains_key(&owner) {
            let base = self.store.owner_items(owner)?;
            self.writes.owner_index.insert(owner, base);
        }
        self.writes.owner_index.entry(owner).or_default().push(id);
        Ok(())
    }

    pub fn put_composite(&mut self, composite: Composite) {
        self.writes.composites.insert(composite.id, composite);
    }

    pub fn put_registry_meta(&mut self, meta: RegistryMeta) {
        self.writes.registry_meta = Some(meta);
    }

    pub fn emit(&mut self, emitter: Address, event: LedgerEvent) {
        self.writes.events.push(EventAppend {
            timestamp: Utc::now(),
            emitter,
            event,
        });
    }

    pub fn is_dirty(&self) -> bool {
        !self.writes.is_empty()
    }

    /// Staged events, oldest first.
    pub fn pending_events(&self) -> &[EventAppend] {
        &self.writes.events
    }

    pub fn commit(self) -> StorageResult<Vec<EventRecord>> {
        self.store.commit(self.base_version, self.writes)
    }
}

impl StateReader for UnitOfWork<'_> {
    fn item(&self, id: ItemId) -> StorageResult<Option<Item>> {
        match self.writes.items.get(&id) {
            Some(item) => Ok(Some(item.clone())),
            None => self.store.item(id),
        }
    }

    fn owner_items(&self, owner: Address) -> StorageResult<Vec<ItemId>> {
        match self.writes.owner_index.get(&owner) {
            Some(ids) => Ok(ids.clone()),
            None => self.store.owner_items(owner),
        }
    }

    fn composite(&self, id: CompositeId) -> StorageResult<Option<Composite>> {
        match self.writes.composites.get(&id) {
            Some(composite) => Ok(Some(composite.clone())),
            None => self.store.composite(id),
        }
    }

    fn registry_meta(&self) -> StorageResult<Option<RegistryMeta>> {
        match &self.writes.registry_meta {
            Some(meta) => Ok(Some(meta.clone())),
            None => self.store.registry_meta(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::model::QueryWindow;
    use crate::traits::EventLog;
    use briq_types::Material;

    fn seed(store: &InMemoryStore) {
        let mut uow = UnitOfWork::begin(store).unwrap();
        uow.put_item(Item::new(ItemId(1), Address(0x11), Material(1)));
        uow.push_owner_item(Address(0x11), ItemId(1)).unwrap();
        uow.commit().unwrap();
    }

    #[test]
    fn reads_see_staged_writes_before_commit() {
        let store = InMemoryStore::new();
        seed(&store);

        let mut uow = UnitOfWork::begin(&store).unwrap();
        uow.put_item(Item::new(ItemId(2), Address(0x11), Material(2)));
        uow.push_owner_item(Address(0x11), ItemId(2)).unwrap();

        assert!(uow.item(ItemId(2)).unwrap().is_some());
        assert_eq!(
            uow.owner_items(Address(0x11)).unwrap(),
            vec![ItemId(1), ItemId(2)]
        );
        assert!(store.item(ItemId(2)).unwrap().is_none());
        assert_eq!(store.owner_items(Address(0x11)).unwrap(), vec![ItemId(1)]);
    }

    #[test]
    fn dropping_discards_everything() {
        let store = InMemoryStore::new();
        seed(&store);

        {
            let mut uow = UnitOfWork::begin(&store).unwrap();
            let mut item = uow.item(ItemId(1)).unwrap().unwrap();
            item.group = Some(CompositeId(0x100));
            uow.put_item(item);
            uow.emit(
                Address(0x2),
                LedgerEvent::GroupChanged {
                    item: ItemId(1),
                    group: Some(CompositeId(0x100)),
                },
            );
            assert!(uow.is_dirty());
            assert_eq!(uow.pending_events().len(), 1);
        }

        assert_eq!(store.item(ItemId(1)).unwrap().unwrap().group, None);
        assert_eq!(store.version().unwrap(), 1);
        assert!(store.events(QueryWindow::all()).unwrap().is_empty());
    }

    #[test]
    fn commit_lands_registry_meta_and_composites() {
        let store = InMemoryStore::new();
        let mut uow = UnitOfWork::begin(&store).unwrap();
        uow.put_registry_meta(RegistryMeta {
            settings: Default::default(),
            ledger: Some(Address(0x1)),
            initialized_at: Utc::now(),
        });
        uow.put_composite(Composite {
            id: CompositeId(0x100),
            owner: Address(0x11),
            members: vec![ItemId(1)],
            status: briq_types::CompositeStatus::Active,
        });
        uow.commit().unwrap();

        assert_eq!(
            store.registry_meta().unwrap().unwrap().ledger,
            Some(Address(0x1))
        );
        assert!(store.composite(CompositeId(0x100)).unwrap().is_some());
    }
}
