//! Stock ledger error types.

use medstore_shared::AppError;
use medstore_shared::types::{MedicineId, StockUpdationId};
use thiserror::Error;

/// Errors that can occur during stock ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockError {
    // ========== Validation Errors ==========
    /// A batch must contain at least one line item.
    #[error("Stock updation must contain at least one line item")]
    EmptyBatch,

    /// Line item quantities must be at least one.
    #[error("Quantity for medicine {medicine_id} must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// Offending medicine.
        medicine_id: MedicineId,
        /// Quantity that was supplied.
        quantity: i32,
    },

    /// A medicine may appear at most once per batch.
    #[error("Medicine {0} appears more than once in the stock updation")]
    DuplicateMedicine(MedicineId),

    // ========== Not Found ==========
    /// Referenced medicine does not exist.
    #[error("Medicine not found: {0}")]
    MedicineNotFound(MedicineId),

    /// Referenced batch does not exist.
    #[error("Stock updation not found: {0}")]
    BatchNotFound(StockUpdationId),

    /// The batch has no line item for the medicine.
    #[error("Medicine {medicine_id} is not part of stock updation {batch_id}")]
    LineItemNotFound {
        /// Batch that was searched.
        batch_id: StockUpdationId,
        /// Medicine that was missing from it.
        medicine_id: MedicineId,
    },

    // ========== Balance ==========
    /// Applying the change would take the balance below zero.
    #[error(
        "Insufficient stock for medicine {medicine_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        /// Medicine that is short.
        medicine_id: MedicineId,
        /// Units on hand when the change was attempted.
        available: i32,
        /// Units the change needed to remove.
        requested: i32,
    },

    /// The balance would exceed the storable range.
    #[error("Stock balance overflow for medicine {0}")]
    BalanceOverflow(MedicineId),
}

impl StockError {
    /// Builds the shortfall error for a negative delta that could not be applied.
    #[must_use]
    pub const fn insufficient(medicine_id: MedicineId, available: i32, delta: i32) -> Self {
        Self::InsufficientStock {
            medicine_id,
            available,
            requested: delta.saturating_neg(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyBatch
            | Self::NonPositiveQuantity { .. }
            | Self::DuplicateMedicine(_)
            | Self::BalanceOverflow(_) => "VALIDATION_ERROR",
            Self::MedicineNotFound(_) | Self::BatchNotFound(_) | Self::LineItemNotFound { .. } => {
                "NOT_FOUND"
            }
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 404 Not Found
            Self::MedicineNotFound(_) | Self::BatchNotFound(_) | Self::LineItemNotFound { .. } => {
                404
            }
            // 400 Bad Request - validation and shortfall
            _ => 400,
        }
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::InsufficientStock {
                medicine_id,
                available,
                requested,
            } => Self::InsufficientStock {
                medicine_id: medicine_id.into_inner(),
                available,
                requested,
            },
            StockError::MedicineNotFound(_)
            | StockError::BatchNotFound(_)
            | StockError::LineItemNotFound { .. } => Self::NotFound(err.to_string()),
            StockError::EmptyBatch
            | StockError::NonPositiveQuantity { .. }
            | StockError::DuplicateMedicine(_)
            | StockError::BalanceOverflow(_) => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StockError::EmptyBatch.error_code(), "VALIDATION_ERROR");
        assert_eq!(
            StockError::MedicineNotFound(MedicineId(1)).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            StockError::insufficient(MedicineId(1), 3, -5).error_code(),
            "INSUFFICIENT_STOCK"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(StockError::DuplicateMedicine(MedicineId(2)).http_status_code(), 400);
        assert_eq!(
            StockError::BatchNotFound(StockUpdationId(9)).http_status_code(),
            404
        );
        assert_eq!(
            StockError::LineItemNotFound {
                batch_id: StockUpdationId(9),
                medicine_id: MedicineId(2),
            }
            .http_status_code(),
            404
        );
        assert_eq!(
            StockError::insufficient(MedicineId(1), 0, -1).http_status_code(),
            400
        );
    }

    #[test]
    fn test_into_app_error() {
        let err: AppError = StockError::insufficient(MedicineId(4), 1, -3).into();
        assert!(matches!(
            err,
            AppError::InsufficientStock {
                medicine_id: 4,
                available: 1,
                requested: 3
            }
        ));
        let err: AppError = StockError::BatchNotFound(StockUpdationId(2)).into();
        assert_eq!(err.status_code(), 404);
        let err: AppError = StockError::EmptyBatch.into();
        assert_eq!(err.resp_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_insufficient_requested_is_positive() {
        let err = StockError::insufficient(MedicineId(7), 10, -15);
        assert_eq!(
            err,
            StockError::InsufficientStock {
                medicine_id: MedicineId(7),
                available: 10,
                requested: 15,
            }
        );
        assert_eq!(
            err.to_string(),
            "Insufficient stock for medicine 7: available 10, requested 15"
        );
    }
}
