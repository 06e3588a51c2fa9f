//! Strong typed identifiers used across the item ledger and set registry.
//!
//! All of them are 128-bit values rendered as `0x`-prefixed hex. Scripts and
//! config files may spell them as hex strings, decimal strings or integers.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when an identifier string is not valid hex or decimal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid identifier {input:?}: {reason}")]
pub struct ParseIdError {
    pub input: String,
    pub reason: String,
}

fn parse_u128(input: &str) -> Result<u128, ParseIdError> {
    let trimmed = input.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => trimmed.parse::<u128>(),
    };
    parsed.map_err(|e| ParseIdError {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

struct U128Visitor(&'static str);

impl<'de> Visitor<'de> for U128Visitor {
    type Value = u128;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as an unsigned integer or hex string", self.0)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
        Ok(u128::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
        u128::try_from(v).map_err(|_| E::custom(format!("negative {}: {}", self.0, v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
        parse_u128(v).map_err(E::custom)
    }
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u128);

        impl $name {
            pub const fn new(raw: u128) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u128 {
                self.0
            }
        }

        impl From<u128> for $name {
            fn from(raw: u128) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_u128(s).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(U128Visitor($label)).map(Self)
            }
        }
    };
}

hex_id!(
    /// Account or contract address.
    Address,
    "address"
);

hex_id!(
    /// Item (brick) identifier. Never reused once minted.
    ItemId,
    "item id"
);

hex_id!(
    /// Composite (set) identifier. Zero is reserved for "ungrouped".
    CompositeId,
    "composite id"
);

impl ItemId {
    /// Id `offset` positions after this one, or `None` on overflow.
    pub fn checked_offset(self, offset: u64) -> Option<Self> {
        self.0.checked_add(u128::from(offset)).map(Self)
    }
}

impl CompositeId {
    /// Wire sentinel meaning "not grouped".
    pub const UNGROUPED: u128 = 0;

    /// Zero cannot name a composite because it marks ungrouped items.
    pub fn is_valid(self) -> bool {
        self.0 != Self::UNGROUPED
    }
}

/// Material category tag attached to every item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Material(pub u64);

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
