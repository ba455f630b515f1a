//! Stock balance updater.
//!
//! The only code path that writes `medicines.current_stock`. Every write is an
//! atomic conditional increment (`current_stock = current_stock + delta` guarded
//! by `current_stock + delta >= 0`), executed inside the caller's transaction
//! after the touched medicine rows have been locked in id order.

use std::collections::{BTreeSet, HashMap};

use medstore_core::stock::{BalanceDelta, StockError, apply_delta};
use medstore_shared::types::MedicineId;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::Expr,
};

use super::stock::StockLedgerError;
use crate::entities::medicines;

/// Locks the given medicine rows with `FOR UPDATE` and returns their balances.
///
/// Rows are locked in ascending id order so concurrent ledger operations over
/// overlapping medicines cannot deadlock. Missing medicines are reported in the
/// order they appear in `ids`.
pub(crate) async fn lock_medicines(
    txn: &DatabaseTransaction,
    ids: &[MedicineId],
) -> Result<HashMap<MedicineId, i32>, StockLedgerError> {
    let unique: BTreeSet<i32> = ids.iter().map(|id| id.0).collect();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, i32)> = medicines::Entity::find()
        .select_only()
        .column(medicines::Column::Id)
        .column(medicines::Column::CurrentStock)
        .filter(medicines::Column::Id.is_in(unique))
        .order_by_asc(medicines::Column::Id)
        .lock_exclusive()
        .into_tuple()
        .all(txn)
        .await?;

    let balances: HashMap<MedicineId, i32> = rows
        .into_iter()
        .map(|(id, stock)| (MedicineId(id), stock))
        .collect();

    if let Some(missing) = ids.iter().find(|id| !balances.contains_key(*id)) {
        return Err(StockError::MedicineNotFound(*missing).into());
    }

    Ok(balances)
}

/// Applies deltas in order, stopping at the first one that fails.
///
/// `locked` must hold the balances returned by [`lock_medicines`] for every
/// medicine in `deltas`; it is kept current as deltas are applied. The caller
/// drops the transaction on error, which rolls back earlier deltas.
pub(crate) async fn apply_deltas(
    txn: &DatabaseTransaction,
    locked: &mut HashMap<MedicineId, i32>,
    deltas: &[BalanceDelta],
) -> Result<(), StockLedgerError> {
    for delta in deltas {
        let current = *locked
            .get(&delta.medicine_id)
            .ok_or(StockError::MedicineNotFound(delta.medicine_id))?;
        let next = apply_delta(delta.medicine_id, current, delta.delta)?;
        increment(txn, *delta).await?;
        locked.insert(delta.medicine_id, next);
    }
    Ok(())
}

/// Runs the conditional increment for one delta.
async fn increment(
    txn: &DatabaseTransaction,
    delta: BalanceDelta,
) -> Result<(), StockLedgerError> {
    if delta.delta == 0 {
        return Ok(());
    }

    let result = medicines::Entity::update_many()
        .col_expr(
            medicines::Column::CurrentStock,
            Expr::col(medicines::Column::CurrentStock).add(delta.delta),
        )
        .col_expr(medicines::Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(medicines::Column::Id.eq(delta.medicine_id.0))
        .filter(Expr::expr(Expr::col(medicines::Column::CurrentStock).add(delta.delta)).gte(0))
        .exec(txn)
        .await?;

    if result.rows_affected > 0 {
        return Ok(());
    }

    let available: Option<i32> = medicines::Entity::find_by_id(delta.medicine_id.0)
        .select_only()
        .column(medicines::Column::CurrentStock)
        .into_tuple()
        .one(txn)
        .await?;

    Err(match available {
        Some(available) => StockError::insufficient(delta.medicine_id, available, delta.delta),
        None => StockError::MedicineNotFound(delta.medicine_id),
    }
    .into())
}

/// Overwrites a balance with a value derived from the ledger.
///
/// Used only by drift repair, with the medicine row already locked.
pub(crate) async fn reset_balance(
    txn: &DatabaseTransaction,
    medicine_id: MedicineId,
    balance: i32,
) -> Result<(), StockLedgerError> {
    medicines::Entity::update_many()
        .col_expr(medicines::Column::CurrentStock, Expr::value(balance))
        .col_expr(medicines::Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(medicines::Column::Id.eq(medicine_id.0))
        .exec(txn)
        .await?;
    Ok(())
}
