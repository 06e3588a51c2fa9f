//! briq storage abstractions.
//!
//! This crate models the host's persistent key-value storage:
//! - item table keyed by item id, with a per-owner enumeration index
//! - composite table keyed by composite id
//! - set-registry metadata (settings, bound ledger)
//! - an append-only, hash-linked event log
//!
//! Components never write to a store directly. Each call stages its writes in
//! a [`UnitOfWork`] and commits them together, so writes made by the registry
//! and the ledger during one call land or vanish as a whole.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
mod events;
pub mod memory;
mod model;
mod traits;
mod unit_of_work;

pub use error::{StorageError, StorageResult};
pub use events::verify_event_chain;
pub use memory::InMemoryStore;
pub use model::{EventAppend, EventRecord, LedgerEvent, QueryWindow, RegistryMeta, WriteSet};
pub use traits::{EventLog, StateReader, StateStore};
pub use unit_of_work::UnitOfWork;
