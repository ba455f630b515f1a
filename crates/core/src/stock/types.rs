//! Ledger domain types.

use medstore_shared::types::MedicineId;
use serde::{Deserialize, Serialize};

/// Direction of a stock updation batch.
///
/// Stored as the `is_addition` flag on the batch header. Line items only carry an
/// unsigned quantity; their sign always comes from the parent batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stock coming in.
    Addition,
    /// Stock going out.
    Deduction,
}

impl Direction {
    /// Maps the stored `is_addition` flag to a direction.
    #[must_use]
    pub const fn from_is_addition(is_addition: bool) -> Self {
        if is_addition {
            Self::Addition
        } else {
            Self::Deduction
        }
    }

    /// Returns the stored flag for this direction.
    #[must_use]
    pub const fn is_addition(self) -> bool {
        matches!(self, Self::Addition)
    }

    /// Signed balance contribution of `quantity` units in a batch of this direction.
    #[must_use]
    pub const fn signed(self, quantity: i32) -> i32 {
        match self {
            Self::Addition => quantity,
            Self::Deduction => -quantity,
        }
    }

    /// Delta that undoes the contribution of `quantity` units.
    #[must_use]
    pub const fn reversal(self, quantity: i32) -> i32 {
        -self.signed(quantity)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Addition => write!(f, "addition"),
            Self::Deduction => write!(f, "deduction"),
        }
    }
}

/// One medicine and quantity pair in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    /// Medicine whose stock changes.
    pub medicine_id: MedicineId,
    /// Unsigned number of units.
    pub quantity: i32,
}

impl StockChange {
    /// Creates a line item.
    #[must_use]
    pub const fn new(medicine_id: MedicineId, quantity: i32) -> Self {
        Self {
            medicine_id,
            quantity,
        }
    }
}
