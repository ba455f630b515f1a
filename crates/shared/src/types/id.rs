//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PatientId` where a `MedicineId` is expected.
//! All tables use `SERIAL` keys, so every ID wraps an `i32`.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Creates an ID from a raw database key.
            #[must_use]
            pub const fn from_i32(id: i32) -> Self {
                Self(id)
            }

            /// Returns the inner key.
            #[must_use]
            pub const fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

typed_id!(MedicineId, "Unique identifier for a medicine.");
typed_id!(MedTypeId, "Unique identifier for a medicine type.");
typed_id!(
    StockUpdationId,
    "Unique identifier for a stock updation (ledger batch)."
);
typed_id!(PatientId, "Unique identifier for a patient.");
typed_id!(VisitId, "Unique identifier for a patient visit.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id: MedicineId = "42".parse().unwrap();
        assert_eq!(id, MedicineId(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<MedicineId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&StockUpdationId(7)).unwrap();
        assert_eq!(json, "7");
        let back: StockUpdationId = serde_json::from_str("7").unwrap();
        assert_eq!(back.into_inner(), 7);
    }

    #[test]
    fn test_ordering_follows_key() {
        let mut ids = vec![MedicineId(3), MedicineId(1), MedicineId(2)];
        ids.sort();
        assert_eq!(ids, vec![MedicineId(1), MedicineId(2), MedicineId(3)]);
    }
}
