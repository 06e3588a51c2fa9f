use std::collections::HashMap;
use std::sync::Arc;

use briq_ledger::GroupLedger;
use briq_set_registry::LedgerResolver;
use briq_types::Address;

/// Deployed ledgers, keyed by address.
///
/// Built once at startup; the registry resolves its bound ledger through it.
#[derive(Default)]
pub struct ContractTable {
    ledgers: HashMap<Address, Arc<dyn GroupLedger>>,
}

impl ContractTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn GroupLedger>) -> Self {
        self.ledgers.insert(ledger.address(), ledger);
        self
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}

impl LedgerResolver for ContractTable {
    fn resolve(&self, address: Address) -> Option<Arc<dyn GroupLedger>> {
        self.ledgers.get(&address).cloned()
    }
}
