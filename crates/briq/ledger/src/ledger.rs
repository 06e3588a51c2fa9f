use briq_storage::{LedgerEvent, StateReader, UnitOfWork};
use briq_types::{
    Address, CompositeId, EnumerationOrder, Item, ItemId, Material, OwnedItem,
};
use tracing::{debug, info, warn};

use crate::error::LedgerError;
use crate::traits::GroupLedger;

/// Item ledger: mints items and keeps the per-owner enumeration index.
///
/// The ledger holds no state of its own; every operation reads and writes
/// through the storage handed in by the caller, so one unit of work can span
/// the ledger and the registry.
#[derive(Debug, Clone)]
pub struct ItemLedger {
    address: Address,
    /// Only caller allowed to change item groups.
    group_authority: Option<Address>,
    order: EnumerationOrder,
}

impl ItemLedger {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            group_authority: None,
            order: EnumerationOrder::default(),
        }
    }

    /// Allow `registry` to call `set_group`.
    pub fn with_group_authority(mut self, registry: Address) -> Self {
        self.group_authority = Some(registry);
        self
    }

    pub fn with_enumeration_order(mut self, order: EnumerationOrder) -> Self {
        self.order = order;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn group_authority(&self) -> Option<Address> {
        self.group_authority
    }

    pub fn enumeration_order(&self) -> EnumerationOrder {
        self.order
    }

    /// Mint a single item to `owner`.
    pub fn mint(
        &self,
        uow: &mut UnitOfWork<'_>,
        owner: Address,
        id: ItemId,
        material: Material,
    ) -> Result<Item, LedgerError> {
        if uow.item(id)?.is_some() {
            warn!(item = %id, "Mint rejected: id already in use");
            return Err(LedgerError::DuplicateId(id));
        }

        let item = Item::new(id, owner, material);
        self.insert(uow, item.clone())?;
        info!(owner = %owner, item = %id, material = %material, "Item minted");
        Ok(item)
    }

    /// Mint `count` items with ids `start .. start + count`.
    ///
    /// All-or-nothing: every id is checked before the first one is written.
    pub fn mint_batch(
        &self,
        uow: &mut UnitOfWork<'_>,
        owner: Address,
        start: ItemId,
        material: Material,
        count: u64,
    ) -> Result<Vec<ItemId>, LedgerError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        start
            .checked_offset(count - 1)
            .ok_or(LedgerError::IdOverflow { start, count })?;

        let ids: Vec<ItemId> = (0..count)
            .filter_map(|offset| start.checked_offset(offset))
            .collect();

        for id in &ids {
            if uow.item(*id)?.is_some() {
                warn!(item = %id, start = %start, count, "Batch mint rejected: id already in use");
                return Err(LedgerError::DuplicateId(*id));
            }
        }

        for id in &ids {
            self.insert(uow, Item::new(*id, owner, material))?;
        }

        info!(
            owner = %owner,
            start = %start,
            count,
            material = %material,
            "Item batch minted"
        );
        Ok(ids)
    }

    /// Snapshot of everything `owner` holds, ordered by the configured policy.
    pub fn enumerate_owner<R>(&self, state: &R, owner: Address) -> Result<Vec<OwnedItem>, LedgerError>
    where
        R: StateReader + ?Sized,
    {
        let mut ids = state.owner_items(owner)?;
        if matches!(self.order, EnumerationOrder::NewestFirst) {
            ids.reverse();
        }

        ids.into_iter()
            .map(|id| {
                state
                    .item(id)?
                    .map(|item| item.to_owned_item())
                    .ok_or(LedgerError::IndexInconsistent { owner, item: id })
            })
            .collect()
    }

    pub fn item_of<R>(&self, state: &R, id: ItemId) -> Result<Option<Item>, LedgerError>
    where
        R: StateReader + ?Sized,
    {
        Ok(state.item(id)?)
    }

    /// Number of items ever minted to `owner`.
    pub fn balance_of<R>(&self, state: &R, owner: Address) -> Result<usize, LedgerError>
    where
        R: StateReader + ?Sized,
    {
        Ok(state.owner_items(owner)?.len())
    }

    fn insert(&self, uow: &mut UnitOfWork<'_>, item: Item) -> Result<(), LedgerError> {
        uow.push_owner_item(item.owner, item.id)?;
        uow.emit(
            self.address,
            LedgerEvent::Minted {
                owner: item.owner,
                item: item.id,
                material: item.material,
            },
        );
        uow.put_item(item);
        Ok(())
    }
}

impl GroupLedger for ItemLedger {
    fn address(&self) -> Address {
        self.address
    }

    fn item(&self, uow: &UnitOfWork<'_>, id: ItemId) -> Result<Option<Item>, LedgerError> {
        self.item_of(uow, id)
    }

    fn set_group(
        &self,
        uow: &mut UnitOfWork<'_>,
        caller: Address,
        id: ItemId,
        group: Option<CompositeId>,
    ) -> Result<(), LedgerError> {
        if self.group_authority != Some(caller) {
            warn!(caller = %caller, item = %id, "Group change rejected: foreign caller");
            return Err(LedgerError::ForeignCaller { caller });
        }

        let mut item = uow.item(id)?.ok_or(LedgerError::UnknownItem(id))?;
        item.group = group;
        uow.put_item(item);
        uow.emit(self.address, LedgerEvent::GroupChanged { item: id, group });

        match group {
            Some(composite) => debug!(item = %id, composite = %composite, "Item grouped"),
            None => debug!(item = %id, "Item ungrouped"),
        }
        Ok(())
    }
}
