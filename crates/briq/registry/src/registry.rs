use std::collections::HashSet;
use std::sync::Arc;

use briq_ledger::GroupLedger;
use briq_storage::{LedgerEvent, RegistryMeta, StateReader, UnitOfWork};
use briq_types::{Address, Composite, CompositeId, CompositeStatus, ItemId, RegistrySettings};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::RegistryError;
use crate::guard;
use crate::resolver::LedgerResolver;

/// Set registry: assembles owned items into composites and dissolves them.
///
/// Lifecycle per composite id:
/// `Uninitialized --assemble--> Active --disassemble--> Dissolved`.
/// Every precondition is checked before the first write, and all writes go
/// through the caller's unit of work, so a rejected call leaves no trace in
/// either the registry or the item ledger.
pub struct SetRegistry {
    address: Address,
    resolver: Arc<dyn LedgerResolver>,
}

impl SetRegistry {
    pub fn new(address: Address, resolver: Arc<dyn LedgerResolver>) -> Self {
        Self { address, resolver }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// One-time setup of registry-local configuration.
    pub fn initialize(
        &self,
        uow: &mut UnitOfWork<'_>,
        settings: RegistrySettings,
    ) -> Result<(), RegistryError> {
        if uow.registry_meta()?.is_some() {
            return Err(RegistryError::AlreadyInitialized);
        }

        uow.put_registry_meta(RegistryMeta {
            settings: settings.clone(),
            ledger: None,
            initialized_at: Utc::now(),
        });
        uow.emit(
            self.address,
            LedgerEvent::RegistryInitialized {
                settings: settings.clone(),
            },
        );
        info!(registry = %self.address, admin = ?settings.admin, "Set registry initialized");
        Ok(())
    }

    /// Bind the item ledger this registry drives. Can only happen once.
    pub fn bind_item_ledger(
        &self,
        uow: &mut UnitOfWork<'_>,
        caller: Address,
        ledger: Address,
    ) -> Result<(), RegistryError> {
        let mut meta = uow.registry_meta()?.ok_or(RegistryError::NotInitialized)?;
        guard::authorize_admin(&meta.settings, caller)?;
        if let Some(bound) = meta.ledger {
            return Err(RegistryError::AlreadyBound(bound));
        }

        meta.ledger = Some(ledger);
        uow.put_registry_meta(meta);
        uow.emit(self.address, LedgerEvent::LedgerBound { ledger });
        info!(registry = %self.address, ledger = %ledger, "Item ledger bound");
        Ok(())
    }

    /// Group `item_ids`, all owned by `owner` and currently free, into a new
    /// active composite `composite_id`.
    pub fn assemble(
        &self,
        uow: &mut UnitOfWork<'_>,
        owner: Address,
        composite_id: CompositeId,
        item_ids: &[ItemId],
    ) -> Result<Composite, RegistryError> {
        if !composite_id.is_valid() {
            return Err(RegistryError::InvalidCompositeId);
        }
        let ledger = self.bound_ledger(uow)?;

        if item_ids.is_empty() {
            return Err(RegistryError::EmptyComposite(composite_id));
        }
        ensure_distinct(item_ids)?;

        for id in item_ids {
            let item = ledger.item(uow, *id)?;
            guard::authorize_member(item.as_ref(), *id, owner)?;
        }

        match uow.composite(composite_id)? {
            Some(existing) if existing.is_active() => {
                warn!(composite = %composite_id, "Assemble rejected: composite already active");
                return Err(RegistryError::AlreadyActive(composite_id));
            }
            Some(_) => {
                warn!(composite = %composite_id, "Assemble rejected: composite dissolved");
                return Err(RegistryError::Dissolved(composite_id));
            }
            None => {}
        }

        for id in item_ids {
            ledger.set_group(uow, self.address, *id, Some(composite_id))?;
        }

        let composite = Composite {
            id: composite_id,
            owner,
            members: item_ids.to_vec(),
            status: CompositeStatus::Active,
        };
        uow.put_composite(composite.clone());
        uow.emit(
            self.address,
            LedgerEvent::Assembled {
                composite: composite_id,
                owner,
                members: composite.members.clone(),
            },
        );

        info!(
            composite = %composite_id,
            owner = %owner,
            members = composite.members.len(),
            "Composite assembled"
        );
        Ok(composite)
    }

    /// Dissolve active composite `composite_id`. `item_ids` must name exactly
    /// its members, in any order.
    pub fn disassemble(
        &self,
        uow: &mut UnitOfWork<'_>,
        user: Address,
        composite_id: CompositeId,
        item_ids: &[ItemId],
    ) -> Result<Composite, RegistryError> {
        let ledger = self.bound_ledger(uow)?;
        let mut composite =
            guard::authorize_dissolve(uow.composite(composite_id)?, user, composite_id)?;

        // Both lists are duplicate-free, so equal length plus containment
        // means the same set.
        ensure_distinct(item_ids)?;
        let exact = item_ids.len() == composite.members.len()
            && item_ids.iter().all(|id| composite.contains(*id));
        if !exact {
            warn!(composite = %composite_id, "Disassemble rejected: member list mismatch");
            return Err(RegistryError::MembershipMismatch(composite_id));
        }

        for id in &composite.members {
            let grouped_here = ledger
                .item(uow, *id)?
                .is_some_and(|item| item.group == Some(composite_id));
            if !grouped_here {
                warn!(composite = %composite_id, item = %id, "Disassemble rejected: member out of sync");
                return Err(RegistryError::InvalidMember {
                    composite: composite_id,
                    item: *id,
                });
            }
        }

        for id in &composite.members {
            ledger.set_group(uow, self.address, *id, None)?;
        }

        composite.status = CompositeStatus::Dissolved;
        uow.put_composite(composite.clone());
        uow.emit(
            self.address,
            LedgerEvent::Disassembled {
                composite: composite_id,
                owner: composite.owner,
                members: composite.members.clone(),
            },
        );

        info!(
            composite = %composite_id,
            owner = %composite.owner,
            members = composite.members.len(),
            "Composite dissolved"
        );
        Ok(composite)
    }

    pub fn composite<R>(&self, state: &R, id: CompositeId) -> Result<Option<Composite>, RegistryError>
    where
        R: StateReader + ?Sized,
    {
        Ok(state.composite(id)?)
    }

    /// Owner of `id` while it is active.
    pub fn owner_of<R>(&self, state: &R, id: CompositeId) -> Result<Option<Address>, RegistryError>
    where
        R: StateReader + ?Sized,
    {
        Ok(state
            .composite(id)?
            .filter(Composite::is_active)
            .map(|composite| composite.owner))
    }

    /// Address recorded by `bind_item_ledger`, if any.
    pub fn ledger_address<R>(&self, state: &R) -> Result<Option<Address>, RegistryError>
    where
        R: StateReader + ?Sized,
    {
        Ok(state.registry_meta()?.and_then(|meta| meta.ledger))
    }

    fn bound_ledger(&self, uow: &UnitOfWork<'_>) -> Result<Arc<dyn GroupLedger>, RegistryError> {
        let meta = uow.registry_meta()?.ok_or(RegistryError::NotInitialized)?;
        let address = meta.ledger.ok_or(RegistryError::LedgerNotBound)?;
        self.resolver
            .resolve(address)
            .ok_or(RegistryError::UnknownContract(address))
    }
}

fn ensure_distinct(item_ids: &[ItemId]) -> Result<(), RegistryError> {
    let mut seen = HashSet::with_capacity(item_ids.len());
    for id in item_ids {
        if !seen.insert(*id) {
            warn!(item = %id, "Member list contains a duplicate");
            return Err(RegistryError::DuplicateMember(*id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use briq_ledger::{ItemLedger, LedgerError};
    use briq_storage::{InMemoryStore, StateStore};
    use briq_types::{ErrorCode, Item, Material};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LEDGER: Address = Address(0x1);
    const REGISTRY: Address = Address(0x2);
    const OWNER: Address = Address(0x11);
    const SET: CompositeId = CompositeId(0x100);

    struct Resolver(Arc<dyn GroupLedger>);

    impl LedgerResolver for Resolver {
        fn resolve(&self, address: Address) -> Option<Arc<dyn GroupLedger>> {
            (address == self.0.address()).then(|| Arc::clone(&self.0))
        }
    }

    /// Delegates to a real ledger but fails the n-th group change.
    struct FlakyLedger {
        inner: ItemLedger,
        fail_on: usize,
        calls: AtomicUsize,
    }

    impl GroupLedger for FlakyLedger {
        fn address(&self) -> Address {
            self.inner.address()
        }

        fn item(&self, uow: &UnitOfWork<'_>, id: ItemId) -> Result<Option<Item>, LedgerError> {
            GroupLedger::item(&self.inner, uow, id)
        }

        fn set_group(
            &self,
            uow: &mut UnitOfWork<'_>,
            caller: Address,
            id: ItemId,
            group: Option<CompositeId>,
        ) -> Result<(), LedgerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.fail_on {
                return Err(LedgerError::UnknownItem(id));
            }
            self.inner.set_group(uow, caller, id, group)
        }
    }

    struct Fixture {
        store: InMemoryStore,
        ledger: ItemLedger,
        registry: SetRegistry,
    }

    impl Fixture {
        fn with_group_ledger(group_ledger: Arc<dyn GroupLedger>) -> Self {
            let fixture = Self {
                store: InMemoryStore::new(),
                ledger: ItemLedger::new(LEDGER).with_group_authority(REGISTRY),
                registry: SetRegistry::new(REGISTRY, Arc::new(Resolver(group_ledger))),
            };
            fixture
                .call(|uow, registry| {
                    registry.initialize(uow, RegistrySettings::default())?;
                    registry.bind_item_ledger(uow, OWNER, LEDGER)
                })
                .unwrap();
            fixture.mint(&[1, 2, 3, 4]);
            fixture
        }

        fn new() -> Self {
            Self::with_group_ledger(Arc::new(ItemLedger::new(LEDGER).with_group_authority(REGISTRY)))
        }

        fn mint(&self, ids: &[u128]) {
            let mut uow = UnitOfWork::begin(&self.store).unwrap();
            for id in ids {
                self.ledger.mint(&mut uow, OWNER, ItemId(*id), Material(1)).unwrap();
            }
            uow.commit().unwrap();
        }

        fn call<T>(
            &self,
            f: impl FnOnce(&mut UnitOfWork<'_>, &SetRegistry) -> Result<T, RegistryError>,
        ) -> Result<T, RegistryError> {
            let mut uow = UnitOfWork::begin(&self.store)?;
            let value = f(&mut uow, &self.registry)?;
            uow.commit()?;
            Ok(value)
        }

        fn assemble(&self, owner: Address, id: CompositeId, items: &[u128]) -> Result<Composite, RegistryError> {
            let items: Vec<ItemId> = items.iter().copied().map(ItemId).collect();
            self.call(|uow, registry| registry.assemble(uow, owner, id, &items))
        }

        fn disassemble(&self, user: Address, id: CompositeId, items: &[u128]) -> Result<Composite, RegistryError> {
            let items: Vec<ItemId> = items.iter().copied().map(ItemId).collect();
            self.call(|uow, registry| registry.disassemble(uow, user, id, &items))
        }

        fn group(&self, id: u128) -> Option<CompositeId> {
            self.store.item(ItemId(id)).unwrap().unwrap().group
        }
    }

    #[test]
    fn initialize_and_bind_are_one_shot() {
        let fx = Fixture::new();
        let err = fx
            .call(|uow, registry| registry.initialize(uow, RegistrySettings::default()))
            .unwrap_err();
        assert_eq!(err, RegistryError::AlreadyInitialized);

        let err = fx
            .call(|uow, registry| registry.bind_item_ledger(uow, OWNER, Address(0x9)))
            .unwrap_err();
        assert_eq!(err, RegistryError::AlreadyBound(LEDGER));
        assert_eq!(fx.registry.ledger_address(&fx.store).unwrap(), Some(LEDGER));
    }

    #[test]
    fn calls_before_setup_are_rejected() {
        let store = InMemoryStore::new();
        let ledger: Arc<dyn GroupLedger> = Arc::new(ItemLedger::new(LEDGER));
        let registry = SetRegistry::new(REGISTRY, Arc::new(Resolver(ledger)));

        let mut uow = UnitOfWork::begin(&store).unwrap();
        assert_eq!(
            registry.bind_item_ledger(&mut uow, OWNER, LEDGER),
            Err(RegistryError::NotInitialized)
        );
        assert_eq!(
            registry.assemble(&mut uow, OWNER, SET, &[ItemId(1)]),
            Err(RegistryError::NotInitialized)
        );

        registry.initialize(&mut uow, RegistrySettings::default()).unwrap();
        assert_eq!(
            registry.disassemble(&mut uow, OWNER, SET, &[ItemId(1)]),
            Err(RegistryError::LedgerNotBound)
        );

        registry.bind_item_ledger(&mut uow, OWNER, Address(0x77)).unwrap();
        assert_eq!(
            registry.assemble(&mut uow, OWNER, SET, &[ItemId(1)]),
            Err(RegistryError::UnknownContract(Address(0x77)))
        );
    }

    #[test]
    fn admin_guards_binding() {
        let store = InMemoryStore::new();
        let ledger: Arc<dyn GroupLedger> = Arc::new(ItemLedger::new(LEDGER));
        let registry = SetRegistry::new(REGISTRY, Arc::new(Resolver(ledger)));
        let mut uow = UnitOfWork::begin(&store).unwrap();
        registry
            .initialize(
                &mut uow,
                RegistrySettings {
                    admin: Some(Address(0xAD)),
                },
            )
            .unwrap();

        let err = registry.bind_item_ledger(&mut uow, OWNER, LEDGER).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        registry.bind_item_ledger(&mut uow, Address(0xAD), LEDGER).unwrap();
    }

    #[test]
    fn assemble_groups_members_and_records_owner() {
        let fx = Fixture::new();
        let composite = fx.assemble(OWNER, SET, &[1, 2, 4]).unwrap();

        assert_eq!(composite.members, vec![ItemId(1), ItemId(2), ItemId(4)]);
        assert_eq!(fx.group(1), Some(SET));
        assert_eq!(fx.group(3), None);
        assert_eq!(fx.registry.owner_of(&fx.store, SET).unwrap(), Some(OWNER));
    }

    #[test]
    fn assemble_rejections_leave_no_trace() {
        let fx = Fixture::new();
        let version = fx.store.version().unwrap();

        let cases: Vec<(Address, CompositeId, Vec<u128>, ErrorCode)> = vec![
            (OWNER, SET, vec![1, 2, 1], ErrorCode::DuplicateMember),
            (OWNER, SET, vec![1, 99], ErrorCode::NotOwnedOrGrouped),
            (Address(0x12), SET, vec![1, 2], ErrorCode::NotOwnedOrGrouped),
            (OWNER, SET, vec![], ErrorCode::EmptyComposite),
            (OWNER, CompositeId(0), vec![1], ErrorCode::InvalidCompositeId),
        ];
        for (owner, id, items, code) in cases {
            let err = fx.assemble(owner, id, &items).unwrap_err();
            assert_eq!(err.code(), code, "{:?}", items);
        }

        assert_eq!(fx.store.version().unwrap(), version);
        assert!((1..=4).all(|id| fx.group(id).is_none()));
    }

    #[test]
    fn grouped_items_and_active_ids_cannot_be_reused() {
        let fx = Fixture::new();
        fx.assemble(OWNER, SET, &[1, 2]).unwrap();

        let err = fx.assemble(OWNER, CompositeId(0x101), &[2, 3]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotOwnedOrGrouped);

        let err = fx.assemble(OWNER, SET, &[3, 4]).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyActive(SET));
        assert_eq!(fx.group(3), None);
    }

    #[test]
    fn disassemble_round_trip_then_terminal() {
        let fx = Fixture::new();
        fx.assemble(OWNER, SET, &[1, 2, 3]).unwrap();

        let dissolved = fx.disassemble(OWNER, SET, &[3, 1, 2]).unwrap();
        assert_eq!(dissolved.status, CompositeStatus::Dissolved);
        assert!((1..=3).all(|id| fx.group(id).is_none()));
        assert_eq!(fx.registry.owner_of(&fx.store, SET).unwrap(), None);

        assert_eq!(
            fx.assemble(OWNER, SET, &[1]).unwrap_err(),
            RegistryError::Dissolved(SET)
        );
        assert_eq!(
            fx.disassemble(OWNER, SET, &[1, 2, 3]).unwrap_err().code(),
            ErrorCode::Unauthorized
        );
    }

    #[test]
    fn disassemble_rejections() {
        let fx = Fixture::new();
        fx.assemble(OWNER, SET, &[1, 2]).unwrap();
        let version = fx.store.version().unwrap();

        let cases: Vec<(Address, CompositeId, Vec<u128>, ErrorCode)> = vec![
            (Address(0x12), SET, vec![1, 2], ErrorCode::Unauthorized),
            (OWNER, CompositeId(0xDEAD), vec![1, 2], ErrorCode::Unauthorized),
            (OWNER, SET, vec![1, 2, 2], ErrorCode::DuplicateMember),
            (OWNER, SET, vec![1], ErrorCode::MembershipMismatch),
            (OWNER, SET, vec![1, 2, 3], ErrorCode::MembershipMismatch),
            (OWNER, SET, vec![1, 3], ErrorCode::MembershipMismatch),
        ];
        for (user, id, items, code) in cases {
            let err = fx.disassemble(user, id, &items).unwrap_err();
            assert_eq!(err.code(), code, "{:?}", items);
        }

        assert_eq!(fx.store.version().unwrap(), version);
        assert_eq!(fx.group(1), Some(SET));
        assert_eq!(fx.group(2), Some(SET));
    }

    #[test]
    fn disassemble_accepts_members_in_any_order() {
        let fx = Fixture::new();
        fx.assemble(OWNER, SET, &[1, 2, 3]).unwrap();

        assert_eq!(
            fx.disassemble(OWNER, SET, &[3, 1, 4]).unwrap_err().code(),
            ErrorCode::MembershipMismatch
        );
        let dissolved = fx.disassemble(OWNER, SET, &[3, 1, 2]).unwrap();
        assert_eq!(dissolved.members, vec![ItemId(1), ItemId(2), ItemId(3)]);
        assert_eq!(fx.group(1), None);
        assert_eq!(fx.group(3), None);
    }

    #[test]
    fn out_of_sync_member_is_invalid() {
        let fx = Fixture::new();
        fx.assemble(OWNER, SET, &[1, 2]).unwrap();

        // Simulate a ledger whose record drifted from the registry.
        let mut uow = UnitOfWork::begin(&fx.store).unwrap();
        fx.ledger.set_group(&mut uow, REGISTRY, ItemId(2), None).unwrap();
        uow.commit().unwrap();

        let err = fx.disassemble(OWNER, SET, &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::InvalidMember {
                composite: SET,
                item: ItemId(2)
            }
        );
        assert_eq!(fx.group(1), Some(SET));
    }

    #[test]
    fn ledger_failure_mid_assemble_rolls_back_everything() {
        let flaky = Arc::new(FlakyLedger {
            inner: ItemLedger::new(LEDGER).with_group_authority(REGISTRY),
            fail_on: 3,
            calls: AtomicUsize::new(0),
        });
        let fx = Fixture::with_group_ledger(flaky);
        let version = fx.store.version().unwrap();

        let err = fx.assemble(OWNER, SET, &[1, 2, 3, 4]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownItem);

        assert_eq!(fx.store.version().unwrap(), version);
        assert!((1..=4).all(|id| fx.group(id).is_none()));
        assert!(fx.registry.composite(&fx.store, SET).unwrap().is_none());
    }
}
