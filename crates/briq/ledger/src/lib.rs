//! briq item ledger.
//!
//! Mints uniquely identified items, keeps an owner-indexed enumeration and
//! exposes group mutation to the set registry through [`GroupLedger`].

#![deny(unsafe_code)]

mod error;
mod ledger;
mod traits;

pub use error::LedgerError;
pub use ledger::ItemLedger;
pub use traits::GroupLedger;
