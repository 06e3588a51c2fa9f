//! Ownership checks run at the top of every mutating registry call.

use briq_types::{Address, Composite, CompositeId, Item, ItemId, RegistrySettings};
use tracing::warn;

use crate::error::RegistryError;

/// Only the configured admin (if any) may change registry wiring.
pub(crate) fn authorize_admin(
    settings: &RegistrySettings,
    caller: Address,
) -> Result<(), RegistryError> {
    match settings.admin {
        Some(admin) if admin != caller => {
            warn!(caller = %caller, admin = %admin, "Admin check failed");
            Err(RegistryError::NotAdmin { caller })
        }
        _ => Ok(()),
    }
}

/// The effective owner of a composite is the owner captured at assembly.
/// Missing and dissolved composites have no effective owner.
pub(crate) fn authorize_dissolve(
    composite: Option<Composite>,
    caller: Address,
    id: CompositeId,
) -> Result<Composite, RegistryError> {
    match composite {
        Some(composite) if composite.is_active() && composite.owner == caller => Ok(composite),
        _ => {
            warn!(caller = %caller, composite = %id, "Disassemble not authorized");
            Err(RegistryError::Unauthorized {
                caller,
                composite: id,
            })
        }
    }
}

/// An item may join a composite only if `owner` holds it and it is free.
pub(crate) fn authorize_member(
    item: Option<&Item>,
    requested: ItemId,
    owner: Address,
) -> Result<(), RegistryError> {
    match item {
        Some(item) if item.owner == owner && !item.is_grouped() => Ok(()),
        _ => {
            warn!(item = %requested, owner = %owner, "Member not owned or already grouped");
            Err(RegistryError::NotOwnedOrGrouped {
                item: requested,
                owner,
            })
        }
    }
}
