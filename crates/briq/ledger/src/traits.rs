use briq_storage::UnitOfWork;
use briq_types::{Address, CompositeId, Item, ItemId};

use crate::error::LedgerError;

/// The slice of the item ledger a set registry is allowed to drive.
///
/// The registry only ever sees this trait, so tests can bind a fake ledger.
/// Both methods run inside the caller's unit of work; a failure from either
/// aborts the whole call.
pub trait GroupLedger: Send + Sync {
    /// Address the ledger is deployed at.
    fn address(&self) -> Address;

    /// Current record for `id`, including writes staged in `uow`.
    fn item(&self, uow: &UnitOfWork<'_>, id: ItemId) -> Result<Option<Item>, LedgerError>;

    /// Overwrite the `group` field of `id`, leaving owner and material alone.
    fn set_group(
        &self,
        uow: &mut UnitOfWork<'_>,
        caller: Address,
        id: ItemId,
        group: Option<CompositeId>,
    ) -> Result<(), LedgerError>;
}
