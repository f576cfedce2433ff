//! Newtype IDs for type-safe entity references.
//!
//! Jewellery rows are keyed by a backend `bigint`, users by the auth
//! provider's UUID. Keeping them apart stops a product id from being passed
//! where a user id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define an integer-backed ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - `new()`, `as_i64()`, `Display`, `FromStr`, and `From` conversions
///
/// # Example
///
/// ```rust
/// # use nalan_core::define_id;
/// define_id!(RateId);
///
/// let id = RateId::new(7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(JewelleryId);

/// Identifier of an authenticated customer, as issued by the auth backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_jewellery_id_parses_query_values() {
        let id: JewelleryId = " 42 ".parse().unwrap();
        assert_eq!(id, JewelleryId::new(42));
        assert!("abc".parse::<JewelleryId>().is_err());
    }

    #[test]
    fn test_jewellery_id_serializes_transparently() {
        let json = serde_json::to_string(&JewelleryId::new(9)).unwrap();
        assert_eq!(json, "9");
        let id: JewelleryId = serde_json::from_str("12").unwrap();
        assert_eq!(id.as_i64(), 12);
    }

    #[test]
    fn test_user_id_display_is_hyphenated_uuid() {
        let raw = "5f0c2b1e-6a2d-4f4e-9b59-0c7b7b0d1a11";
        let id: UserId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
    }
}
