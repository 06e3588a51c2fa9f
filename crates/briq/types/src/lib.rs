//! Core types for the briq item ledger and set registry.
//!
//! This crate has no IO and no storage concerns: it defines the identifiers,
//! the persisted item/composite records and the shared error classification.

#![deny(unsafe_code)]

pub mod error;
pub mod ids;
pub mod records;

pub use error::ErrorCode;
pub use ids::{Address, CompositeId, ItemId, Material, ParseIdError};
pub use records::{
    Composite, CompositeStatus, EnumerationOrder, Item, OwnedItem, RegistrySettings,
};
