//! briq runtime.
//!
//! Wires the item ledger and the set registry to a shared state store and
//! exposes their entry points as atomic calls. Also owns configuration
//! loading and tracing setup for binaries.

#![deny(unsafe_code)]

pub mod call;
pub mod config;
pub mod contracts;
pub mod error;
pub mod runtime;
pub mod telemetry;

pub use call::{Call, CallOutput};
pub use config::RuntimeConfig;
pub use contracts::ContractTable;
pub use error::{RuntimeError, RuntimeResult};
pub use runtime::BriqRuntime;
