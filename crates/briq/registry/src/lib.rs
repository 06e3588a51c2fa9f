//! briq set registry.
//!
//! Aggregates items from the item ledger into composite tokens under a single
//! owner and dissolves them again. The registry never touches item records
//! directly; it drives the ledger through [`briq_ledger::GroupLedger`], resolved
//! from the address persisted by `bind_item_ledger`.

#![deny(unsafe_code)]

mod error;
mod guard;
mod registry;
mod resolver;

pub use error::RegistryError;
pub use registry::SetRegistry;
pub use resolver::LedgerResolver;
