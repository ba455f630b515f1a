//! Balance arithmetic.

use medstore_shared::types::MedicineId;

use super::error::StockError;

/// Applies a signed delta to a balance, refusing to go below zero.
///
/// This is the rule the database enforces with its conditional update; it is
/// kept here so the rule has a single pure definition.
///
/// # Errors
///
/// Returns `InsufficientStock` when the result would be negative and
/// `BalanceOverflow` when it does not fit in the column.
pub fn apply_delta(medicine_id: MedicineId, current: i32, delta: i32) -> Result<i32, StockError> {
    let next = current
        .checked_add(delta)
        .ok_or(StockError::BalanceOverflow(medicine_id))?;
    if next < 0 {
        return Err(StockError::insufficient(medicine_id, current, delta));
    }
    Ok(next)
}
