use std::sync::{Arc, Mutex};

use briq_ledger::{GroupLedger, ItemLedger};
use briq_set_registry::SetRegistry;
use briq_storage::{
    verify_event_chain, EventLog, EventRecord, InMemoryStore, QueryWindow, StateReader,
    StateStore, UnitOfWork,
};
use briq_types::{Address, Composite, CompositeId, Item, ItemId, Material, OwnedItem};
use tracing::{debug, info, info_span, warn};

use crate::call::{Call, CallOutput};
use crate::config::RuntimeConfig;
use crate::contracts::ContractTable;
use crate::error::{RuntimeError, RuntimeResult};

/// Host for the item ledger and set registry.
///
/// Every entry point runs as one transaction: a fresh [`UnitOfWork`] shared
/// by both contracts, committed only if the whole call succeeds. Calls and
/// reads are serialized through a commit gate, so a read never observes a
/// half-applied call.
pub struct BriqRuntime {
    config: RuntimeConfig,
    store: Arc<dyn StateStore>,
    ledger: Arc<ItemLedger>,
    registry: SetRegistry,
    gate: Mutex<()>,
}

impl BriqRuntime {
    /// Runtime over a fresh in-memory store.
    pub fn new(config: RuntimeConfig) -> RuntimeResult<Self> {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    pub fn with_store(config: RuntimeConfig, store: Arc<dyn StateStore>) -> RuntimeResult<Self> {
        let contracts = &config.contracts;
        let ledger = Arc::new(
            ItemLedger::new(contracts.ledger_address)
                .with_group_authority(contracts.registry_address)
                .with_enumeration_order(config.ledger.enumeration_order),
        );
        let deployed: Arc<dyn GroupLedger> = ledger.clone();
        let table = ContractTable::new().with_ledger(deployed);
        let registry = SetRegistry::new(contracts.registry_address, Arc::new(table));

        let runtime = Self {
            config,
            store,
            ledger,
            registry,
            gate: Mutex::new(()),
        };

        if runtime.config.registry.auto_initialize {
            runtime.bootstrap()?;
        }

        info!(
            ledger = %runtime.ledger.address(),
            registry = %runtime.registry.address(),
            order = ?runtime.ledger.enumeration_order(),
            "briq runtime ready"
        );
        Ok(runtime)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn ledger_address(&self) -> Address {
        self.ledger.address()
    }

    pub fn registry_address(&self) -> Address {
        self.registry.address()
    }

    // Ledger entry points

    pub fn mint(&self, owner: Address, token_id: ItemId, material: Material) -> RuntimeResult<()> {
        self.transact("mint", |uow| {
            self.ledger.mint(uow, owner, token_id, material)?;
            Ok(())
        })
    }

    pub fn mint_multiple(
        &self,
        owner: Address,
        token_start: ItemId,
        material: Material,
        nb: u64,
    ) -> RuntimeResult<Vec<ItemId>> {
        self.transact("mint_multiple", |uow| {
            Ok(self.ledger.mint_batch(uow, owner, token_start, material, nb)?)
        })
    }

    pub fn get_all_tokens_for_owner(&self, owner: Address) -> RuntimeResult<Vec<OwnedItem>> {
        self.read(|store| Ok(self.ledger.enumerate_owner(store, owner)?))
    }

    pub fn item(&self, id: ItemId) -> RuntimeResult<Option<Item>> {
        self.read(|store| Ok(self.ledger.item_of(store, id)?))
    }

    // Registry entry points

    /// One-time registry setup with the configured settings.
    pub fn initialize(&self) -> RuntimeResult<()> {
        let settings = self.config.registry.settings();
        self.transact("initialize", |uow| {
            Ok(self.registry.initialize(uow, settings)?)
        })
    }

    pub fn set_briq_contract(&self, caller: Address, address: Address) -> RuntimeResult<()> {
        self.transact("set_briq_contract", |uow| {
            Ok(self.registry.bind_item_ledger(uow, caller, address)?)
        })
    }

    pub fn assemble(
        &self,
        owner: Address,
        token_id: CompositeId,
        bricks: &[ItemId],
    ) -> RuntimeResult<Composite> {
        self.transact("assemble", |uow| {
            Ok(self.registry.assemble(uow, owner, token_id, bricks)?)
        })
    }

    pub fn disassemble(
        &self,
        user: Address,
        token_id: CompositeId,
        bricks: &[ItemId],
    ) -> RuntimeResult<Composite> {
        self.transact("disassemble", |uow| {
            Ok(self.registry.disassemble(uow, user, token_id, bricks)?)
        })
    }

    pub fn composite(&self, id: CompositeId) -> RuntimeResult<Option<Composite>> {
        self.read(|store| Ok(self.registry.composite(store, id)?))
    }

    pub fn composite_owner(&self, id: CompositeId) -> RuntimeResult<Option<Address>> {
        self.read(|store| Ok(self.registry.owner_of(store, id)?))
    }

    /// Route a serialized call to its entry point.
    pub fn dispatch(&self, call: Call) -> RuntimeResult<CallOutput> {
        match call {
            Call::Mint {
                owner,
                token_id,
                material,
            } => {
                self.mint(owner, token_id, material)?;
                Ok(CallOutput::Minted {
                    ids: vec![token_id],
                })
            }
            Call::MintMultiple {
                owner,
                token_start,
                material,
                nb,
            } => Ok(CallOutput::Minted {
                ids: self.mint_multiple(owner, token_start, material, nb)?,
            }),
            Call::GetAllTokensForOwner { owner } => Ok(CallOutput::Tokens {
                owner,
                items: self.get_all_tokens_for_owner(owner)?,
            }),
            Call::Initialize => {
                self.initialize()?;
                Ok(CallOutput::Done)
            }
            Call::SetBriqContract { address, caller } => {
                self.set_briq_contract(caller, address)?;
                Ok(CallOutput::Done)
            }
            Call::Assemble {
                owner,
                token_id,
                bricks,
            } => Ok(CallOutput::Composite {
                composite: self.assemble(owner, token_id, &bricks)?,
            }),
            Call::Disassemble {
                user,
                token_id,
                bricks,
            } => Ok(CallOutput::Composite {
                composite: self.disassemble(user, token_id, &bricks)?,
            }),
        }
    }

    // Event log

    pub fn events(&self, window: QueryWindow) -> RuntimeResult<Vec<EventRecord>> {
        self.read(|store| Ok(store.events(window)?))
    }

    /// Verify the whole hash chain. Returns the number of events checked.
    pub fn verify_events(&self) -> RuntimeResult<usize> {
        let events = self.read(|store| Ok(store.events(QueryWindow::all())?))?;
        verify_event_chain(&events)?;
        Ok(events.len())
    }

    /// Initialize and bind the configured ledger unless already done.
    fn bootstrap(&self) -> RuntimeResult<()> {
        let settings = self.config.registry.settings();
        // Bound as the admin when one is configured.
        let caller = settings.admin.unwrap_or_default();
        let ledger = self.ledger.address();

        self.transact("bootstrap", |uow| {
            if self.registry.ledger_address(&*uow)?.is_some() {
                return Ok(());
            }
            if uow.registry_meta()?.is_none() {
                self.registry.initialize(uow, settings)?;
            }
            self.registry.bind_item_ledger(uow, caller, ledger)?;
            Ok(())
        })
    }

    /// Run a read against committed state only.
    ///
    /// Commits happen under the gate, so holding it keeps a multi-step read
    /// (index then items) from straddling one.
    fn read<T>(&self, f: impl FnOnce(&dyn StateStore) -> RuntimeResult<T>) -> RuntimeResult<T> {
        let _gate = self.gate.lock().map_err(|_| RuntimeError::GatePoisoned)?;
        f(self.store.as_ref())
    }

    fn transact<T>(
        &self,
        entry: &'static str,
        f: impl FnOnce(&mut UnitOfWork<'_>) -> RuntimeResult<T>,
    ) -> RuntimeResult<T> {
        let span = info_span!("call", entry);
        let _enter = span.enter();

        let _gate = self.gate.lock().map_err(|_| RuntimeError::GatePoisoned)?;
        let mut uow = UnitOfWork::begin(self.store.as_ref())?;

        match f(&mut uow) {
            Ok(value) => {
                let events = uow.commit()?;
                debug!(events = events.len(), "Call committed");
                Ok(value)
            }
            Err(err) => {
                warn!(code = %err.code(), error = %err, "Call rejected, state unchanged");
                Err(err)
            }
        }
    }
}
