use std::sync::Arc;

use briq_ledger::GroupLedger;
use briq_types::Address;

/// Resolves a bound ledger address to the ledger deployed there.
///
/// The registry persists only the address; the host supplies the resolver.
pub trait LedgerResolver: Send + Sync {
    fn resolve(&self, address: Address) -> Option<Arc<dyn GroupLedger>>;
}
