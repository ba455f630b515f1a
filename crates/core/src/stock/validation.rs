//! Business rule validation for stock updations.

use std::collections::HashSet;

use super::error::StockError;
use super::types::StockChange;

/// Validates the line items of a new batch.
///
/// Checks run in input order so the first offending line item is the one reported.
///
/// # Errors
///
/// Returns an error if the batch is empty, a quantity is not positive, or a
/// medicine appears twice.
pub fn validate_batch(changes: &[StockChange]) -> Result<(), StockError> {
    if changes.is_empty() {
        return Err(StockError::EmptyBatch);
    }

    let mut seen = HashSet::with_capacity(changes.len());
    for change in changes {
        if change.quantity <= 0 {
            return Err(StockError::NonPositiveQuantity {
                medicine_id: change.medicine_id,
                quantity: change.quantity,
            });
        }
        if !seen.insert(change.medicine_id) {
            return Err(StockError::DuplicateMedicine(change.medicine_id));
        }
    }

    Ok(())
}

/// Validates the replacement line items of a revision.
///
/// A revision follows the same rules as a new batch. Removing every line item is
/// done by deleting the batch instead.
///
/// # Errors
///
/// Same as [`validate_batch`].
pub fn validate_revision(changes: &[StockChange]) -> Result<(), StockError> {
    validate_batch(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medstore_shared::types::MedicineId;

    fn change(id: i32, quantity: i32) -> StockChange {
        StockChange::new(MedicineId(id), quantity)
    }

    #[test]
    fn test_valid_batch() {
        assert!(validate_batch(&[change(1, 10), change(2, 1)]).is_ok());
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(validate_batch(&[]), Err(StockError::EmptyBatch));
        assert_eq!(validate_revision(&[]), Err(StockError::EmptyBatch));
    }

    #[test]
    fn test_zero_quantity() {
        assert_eq!(
            validate_batch(&[change(1, 5), change(2, 0)]),
            Err(StockError::NonPositiveQuantity {
                medicine_id: MedicineId(2),
                quantity: 0,
            })
        );
    }

    #[test]
    fn test_negative_quantity() {
        assert!(matches!(
            validate_batch(&[change(1, -3)]),
            Err(StockError::NonPositiveQuantity { quantity: -3, .. })
        ));
    }

    #[test]
    fn test_duplicate_medicine() {
        assert_eq!(
            validate_batch(&[change(1, 5), change(2, 1), change(1, 2)]),
            Err(StockError::DuplicateMedicine(MedicineId(1)))
        );
    }

    #[test]
    fn test_first_error_in_input_order() {
        // The duplicate comes before the bad quantity.
        assert_eq!(
            validate_batch(&[change(1, 5), change(1, 5), change(2, 0)]),
            Err(StockError::DuplicateMedicine(MedicineId(1)))
        );
    }
}
