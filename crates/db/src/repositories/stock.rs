//! Stock ledger repository.
//!
//! Hosts the stock ledger engine: every mutating operation runs in one database
//! transaction that locks the touched medicine rows, applies balance deltas
//! through the balance updater and writes the batch rows. Any error drops the
//! transaction, which rolls back every change made so far.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use medstore_core::stock::{
    BalanceDrift, Direction, RevisionStep, StockChange, StockError, StockLevel, plan_batch,
    plan_reversal, plan_revision, sort_by_deficiency, validate_batch, validate_revision,
};
use medstore_shared::types::{MedicineId, PageRequest, PageResponse, StockUpdationId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, Statement, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use tracing::warn;

use super::balance::{apply_deltas, lock_medicines, reset_balance};
use crate::entities::{medicines, stock_updation_particulars, stock_updations};

/// Error types for stock ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum StockLedgerError {
    /// A ledger rule was violated.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A batch header with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockBatch {
    /// Batch ID.
    pub id: StockUpdationId,
    /// Whether the batch adds or removes stock.
    pub direction: Direction,
    /// When the batch was recorded.
    pub brought_at: DateTime<FixedOffset>,
    /// Line items ordered by medicine ID.
    pub particulars: Vec<StockChange>,
}

/// One line item of a medicine's history, with its batch timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct MedicineMovement {
    /// Batch the line item belongs to.
    pub stock_updation_id: i32,
    /// Batch timestamp.
    pub brought_at: DateTime<FixedOffset>,
    /// Unsigned quantity.
    pub quantity: i32,
}

/// A medicine below its minimum stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockItem {
    /// Medicine ID.
    pub medicine_id: MedicineId,
    /// Medicine name.
    pub name: String,
    /// Units on hand.
    pub current_stock: i32,
    /// Minimum stock threshold.
    pub min_stock: i32,
    /// Optimal stock level.
    pub optimal_stock: i32,
    /// Units missing to reach `min_stock`.
    pub deficiency_to_min_stock: i32,
    /// Units to order to reach `optimal_stock`.
    pub reorder_to_optimal: i32,
}

/// Outcome of removing a single line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineItemRemoval {
    /// True if the removed line item was the last one and the batch was deleted too.
    pub batch_deleted: bool,
}

/// Outcome of a drift repair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftRepair {
    /// Drifts whose balance was reset to the ledger total.
    pub repaired: Vec<BalanceDrift>,
    /// Drifts whose ledger total is not a valid balance and were left alone.
    pub unrepairable: Vec<BalanceDrift>,
}

#[derive(Debug, FromQueryResult)]
struct LedgerTotalRow {
    medicine_id: i32,
    recorded: i32,
    ledger_total: i64,
}

const LEDGER_TOTALS_SQL: &str = r"
SELECT m.id AS medicine_id,
       m.current_stock AS recorded,
       COALESCE(SUM(CASE WHEN su.is_addition THEN p.quantity ELSE -p.quantity END), 0)::BIGINT
           AS ledger_total
FROM medicines m
LEFT JOIN stock_updation_particulars p ON p.medicine_id = m.id
LEFT JOIN stock_updations su ON su.id = p.stock_updation_id
GROUP BY m.id, m.current_stock
ORDER BY m.id
";

/// Stock ledger repository.
#[derive(Debug, Clone)]
pub struct StockLedgerRepository {
    db: DatabaseConnection,
}

impl StockLedgerRepository {
    /// Creates a new stock ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Ledger Engine
    // ========================================================================

    /// Records an addition batch and increments every balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is invalid, a medicine does not exist or the
    /// database operation fails. Nothing is written on error.
    pub async fn add_stock(&self, changes: &[StockChange]) -> Result<StockBatch, StockLedgerError> {
        self.record(Direction::Addition, changes).await
    }

    /// Records a deduction batch and decrements every balance.
    ///
    /// Line items are applied in input order; the first one that would take its
    /// medicine below zero aborts the whole batch with `InsufficientStock`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_stock`], plus `InsufficientStock`.
    pub async fn deduct_stock(
        &self,
        changes: &[StockChange],
    ) -> Result<StockBatch, StockLedgerError> {
        self.record(Direction::Deduction, changes).await
    }

    async fn record(
        &self,
        direction: Direction,
        changes: &[StockChange],
    ) -> Result<StockBatch, StockLedgerError> {
        validate_batch(changes)?;

        let txn = self.db.begin().await?;

        let ids: Vec<MedicineId> = changes.iter().map(|c| c.medicine_id).collect();
        let mut locked = lock_medicines(&txn, &ids).await?;
        apply_deltas(&txn, &mut locked, &plan_batch(direction, changes)).await?;

        let header = stock_updations::ActiveModel {
            is_addition: Set(direction.is_addition()),
            brought_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let rows = changes.iter().map(|c| stock_updation_particulars::ActiveModel {
            stock_updation_id: Set(header.id),
            medicine_id: Set(c.medicine_id.0),
            quantity: Set(c.quantity),
        });
        stock_updation_particulars::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        let mut particulars = changes.to_vec();
        particulars.sort_by_key(|c| c.medicine_id);
        Ok(StockBatch {
            id: StockUpdationId(header.id),
            direction,
            brought_at: header.brought_at,
            particulars,
        })
    }

    /// Replaces the line items of a batch.
    ///
    /// The batch keeps its direction. New medicines are inserted, changed
    /// quantities are updated by their difference and omitted medicines are
    /// removed, each with the matching balance adjustment.
    ///
    /// # Errors
    ///
    /// Returns an error if the line items are invalid, the batch or a medicine
    /// does not exist, an adjustment would take a balance below zero, or the
    /// database operation fails. Nothing is written on error.
    pub async fn revise_updation(
        &self,
        id: StockUpdationId,
        changes: &[StockChange],
    ) -> Result<StockBatch, StockLedgerError> {
        validate_revision(changes)?;

        let txn = self.db.begin().await?;

        let header = lock_batch(&txn, id).await?;
        let direction = Direction::from_is_addition(header.is_addition);
        let old = load_particulars(&txn, id).await?;
        let plan = plan_revision(direction, &old, changes);

        if !plan.is_empty() {
            let ids: Vec<MedicineId> = plan.steps.iter().map(RevisionStep::medicine_id).collect();
            let mut locked = lock_medicines(&txn, &ids).await?;
            apply_deltas(&txn, &mut locked, &plan.deltas()).await?;

            for step in &plan.steps {
                write_step(&txn, id, step).await?;
            }
        }

        txn.commit().await?;

        let mut particulars = changes.to_vec();
        particulars.sort_by_key(|c| c.medicine_id);
        Ok(StockBatch {
            id,
            direction,
            brought_at: header.brought_at,
            particulars,
        })
    }

    /// Deletes a batch and reverses every line item's effect on balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch does not exist, a reversal would take a
    /// balance below zero, or the database operation fails.
    pub async fn delete_updation(&self, id: StockUpdationId) -> Result<(), StockLedgerError> {
        let txn = self.db.begin().await?;

        let header = lock_batch(&txn, id).await?;
        let direction = Direction::from_is_addition(header.is_addition);
        let items = load_particulars(&txn, id).await?;

        let ids: Vec<MedicineId> = items.iter().map(|c| c.medicine_id).collect();
        let mut locked = lock_medicines(&txn, &ids).await?;
        apply_deltas(&txn, &mut locked, &plan_reversal(direction, &items)).await?;

        stock_updation_particulars::Entity::delete_many()
            .filter(stock_updation_particulars::Column::StockUpdationId.eq(id.0))
            .exec(&txn)
            .await?;
        stock_updations::Entity::delete_by_id(id.0).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Removes one line item from a batch and reverses its effect.
    ///
    /// The sign of the reversal comes from the parent batch. Removing the last
    /// line item also deletes the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch or line item does not exist, the reversal
    /// would take the balance below zero, or the database operation fails.
    pub async fn delete_line_item(
        &self,
        id: StockUpdationId,
        medicine_id: MedicineId,
    ) -> Result<LineItemRemoval, StockLedgerError> {
        let txn = self.db.begin().await?;

        let header = lock_batch(&txn, id).await?;
        let direction = Direction::from_is_addition(header.is_addition);

        let item = stock_updation_particulars::Entity::find_by_id((id.0, medicine_id.0))
            .one(&txn)
            .await?
            .ok_or(StockError::LineItemNotFound {
                batch_id: id,
                medicine_id,
            })?;
        let item = StockChange::new(medicine_id, item.quantity);

        let mut locked = lock_medicines(&txn, &[medicine_id]).await?;
        apply_deltas(&txn, &mut locked, &plan_reversal(direction, &[item])).await?;

        stock_updation_particulars::Entity::delete_by_id((id.0, medicine_id.0))
            .exec(&txn)
            .await?;

        let remaining = stock_updation_particulars::Entity::find()
            .filter(stock_updation_particulars::Column::StockUpdationId.eq(id.0))
            .count(&txn)
            .await?;
        let batch_deleted = remaining == 0;
        if batch_deleted {
            stock_updations::Entity::delete_by_id(id.0).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(LineItemRemoval { batch_deleted })
    }

    // ========================================================================
    // Query Views
    // ========================================================================

    /// Gets a batch with its line items.
    ///
    /// # Errors
    ///
    /// Returns `BatchNotFound` if the batch does not exist.
    pub async fn get_batch(&self, id: StockUpdationId) -> Result<StockBatch, StockLedgerError> {
        let header = stock_updations::Entity::find_by_id(id.0)
            .one(&self.db)
            .await?
            .ok_or(StockError::BatchNotFound(id))?;
        let particulars = load_particulars(&self.db, id).await?;
        Ok(to_batch(header, particulars))
    }

    /// Lists batches of one direction, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_batches(
        &self,
        direction: Direction,
        page: PageRequest,
    ) -> Result<PageResponse<StockBatch>, StockLedgerError> {
        let query = stock_updations::Entity::find()
            .filter(stock_updations::Column::IsAddition.eq(direction.is_addition()));

        let total = query.clone().count(&self.db).await?;

        let headers = query
            .order_by_desc(stock_updations::Column::BroughtAt)
            .order_by_desc(stock_updations::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = headers.iter().map(|h| h.id).collect();
        let mut grouped: HashMap<i32, Vec<StockChange>> = HashMap::new();
        if !ids.is_empty() {
            let rows = stock_updation_particulars::Entity::find()
                .filter(stock_updation_particulars::Column::StockUpdationId.is_in(ids))
                .order_by_asc(stock_updation_particulars::Column::MedicineId)
                .all(&self.db)
                .await?;
            for row in rows {
                grouped
                    .entry(row.stock_updation_id)
                    .or_default()
                    .push(StockChange::new(MedicineId(row.medicine_id), row.quantity));
            }
        }

        let batches = headers
            .into_iter()
            .map(|h| {
                let items = grouped.remove(&h.id).unwrap_or_default();
                to_batch(h, items)
            })
            .collect();

        Ok(PageResponse::new(batches, page, total))
    }

    /// Lists one medicine's line items of the given direction, newest first.
    ///
    /// Timestamp and direction are read from the parent batch.
    ///
    /// # Errors
    ///
    /// Returns `MedicineNotFound` if the medicine does not exist.
    pub async fn list_medicine_movements(
        &self,
        medicine_id: MedicineId,
        direction: Direction,
    ) -> Result<Vec<MedicineMovement>, StockLedgerError> {
        self.medicine_stock(medicine_id).await?;

        let movements = stock_updation_particulars::Entity::find()
            .select_only()
            .column(stock_updation_particulars::Column::StockUpdationId)
            .column(stock_updation_particulars::Column::Quantity)
            .column(stock_updations::Column::BroughtAt)
            .join(
                JoinType::InnerJoin,
                stock_updation_particulars::Relation::StockUpdations.def(),
            )
            .filter(stock_updation_particulars::Column::MedicineId.eq(medicine_id.0))
            .filter(stock_updations::Column::IsAddition.eq(direction.is_addition()))
            .order_by_desc(stock_updations::Column::BroughtAt)
            .order_by_desc(stock_updations::Column::Id)
            .into_model::<MedicineMovement>()
            .all(&self.db)
            .await?;

        Ok(movements)
    }

    /// Returns a medicine's current balance.
    ///
    /// # Errors
    ///
    /// Returns `MedicineNotFound` if the medicine does not exist.
    pub async fn medicine_stock(&self, medicine_id: MedicineId) -> Result<i32, StockLedgerError> {
        let stock: Option<i32> = medicines::Entity::find_by_id(medicine_id.0)
            .select_only()
            .column(medicines::Column::CurrentStock)
            .into_tuple()
            .one(&self.db)
            .await?;
        stock.ok_or_else(|| StockError::MedicineNotFound(medicine_id).into())
    }

    /// Lists medicines below their minimum stock, largest deficiency first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn low_stock_summary(&self) -> Result<Vec<LowStockItem>, StockLedgerError> {
        let rows = medicines::Entity::find()
            .filter(
                Expr::col(medicines::Column::CurrentStock)
                    .lt(Expr::col(medicines::Column::MinStock)),
            )
            .all(&self.db)
            .await?;

        let mut names: HashMap<i32, String> = HashMap::with_capacity(rows.len());
        let mut levels: Vec<StockLevel> = rows
            .into_iter()
            .map(|m| {
                let level = StockLevel {
                    medicine_id: MedicineId(m.id),
                    current_stock: m.current_stock,
                    min_stock: m.min_stock,
                    optimal_stock: m.optimal_stock,
                };
                names.insert(m.id, m.name);
                level
            })
            .collect();
        sort_by_deficiency(&mut levels);

        Ok(levels
            .into_iter()
            .map(|level| LowStockItem {
                medicine_id: level.medicine_id,
                name: names.remove(&level.medicine_id.0).unwrap_or_default(),
                current_stock: level.current_stock,
                min_stock: level.min_stock,
                optimal_stock: level.optimal_stock,
                deficiency_to_min_stock: level.deficiency_to_min(),
                reorder_to_optimal: level.reorder_to_optimal(),
            })
            .collect())
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Reports medicines whose balance disagrees with their ledger total.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_drift(&self) -> Result<Vec<BalanceDrift>, StockLedgerError> {
        ledger_drift(&self.db).await
    }

    /// Resets every drifted balance to its ledger total in one transaction.
    ///
    /// All medicine rows are locked first, so no ledger operation can interleave.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn repair_drift(&self) -> Result<DriftRepair, StockLedgerError> {
        let txn = self.db.begin().await?;

        medicines::Entity::find()
            .select_only()
            .column(medicines::Column::Id)
            .order_by_asc(medicines::Column::Id)
            .lock_exclusive()
            .into_tuple::<i32>()
            .all(&txn)
            .await?;

        let mut outcome = DriftRepair::default();
        for drift in ledger_drift(&txn).await? {
            match drift.repaired_balance() {
                Some(balance) => {
                    warn!(
                        medicine_id = %drift.medicine_id,
                        recorded = drift.recorded,
                        ledger_total = drift.ledger_total,
                        "Resetting drifted balance"
                    );
                    reset_balance(&txn, drift.medicine_id, balance).await?;
                    outcome.repaired.push(drift);
                }
                None => outcome.unrepairable.push(drift),
            }
        }

        txn.commit().await?;
        Ok(outcome)
    }
}

/// Loads a batch header with `FOR UPDATE`.
async fn lock_batch(
    txn: &DatabaseTransaction,
    id: StockUpdationId,
) -> Result<stock_updations::Model, StockLedgerError> {
    stock_updations::Entity::find_by_id(id.0)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| StockError::BatchNotFound(id).into())
}

/// Loads a batch's line items ordered by medicine ID.
async fn load_particulars<C: ConnectionTrait>(
    conn: &C,
    id: StockUpdationId,
) -> Result<Vec<StockChange>, StockLedgerError> {
    let rows = stock_updation_particulars::Entity::find()
        .filter(stock_updation_particulars::Column::StockUpdationId.eq(id.0))
        .order_by_asc(stock_updation_particulars::Column::MedicineId)
        .all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| StockChange::new(MedicineId(r.medicine_id), r.quantity))
        .collect())
}

/// Writes the line item row for one revision step.
async fn write_step(
    txn: &DatabaseTransaction,
    id: StockUpdationId,
    step: &RevisionStep,
) -> Result<(), StockLedgerError> {
    match step {
        RevisionStep::Insert(change) => {
            stock_updation_particulars::ActiveModel {
                stock_updation_id: Set(id.0),
                medicine_id: Set(change.medicine_id.0),
                quantity: Set(change.quantity),
            }
            .insert(txn)
            .await?;
        }
        RevisionStep::Update {
            medicine_id,
            new_quantity,
            ..
        } => {
            stock_updation_particulars::Entity::update_many()
                .col_expr(
                    stock_updation_particulars::Column::Quantity,
                    Expr::value(*new_quantity),
                )
                .filter(stock_updation_particulars::Column::StockUpdationId.eq(id.0))
                .filter(stock_updation_particulars::Column::MedicineId.eq(medicine_id.0))
                .exec(txn)
                .await?;
        }
        RevisionStep::Remove(change) => {
            stock_updation_particulars::Entity::delete_by_id((id.0, change.medicine_id.0))
                .exec(txn)
                .await?;
        }
    }
    Ok(())
}

async fn ledger_drift<C: ConnectionTrait>(conn: &C) -> Result<Vec<BalanceDrift>, StockLedgerError> {
    let rows = LedgerTotalRow::find_by_statement(Statement::from_string(
        DbBackend::Postgres,
        LEDGER_TOTALS_SQL,
    ))
    .all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|r| BalanceDrift::detect(MedicineId(r.medicine_id), r.recorded, r.ledger_total))
        .collect())
}

fn to_batch(header: stock_updations::Model, particulars: Vec<StockChange>) -> StockBatch {
    StockBatch {
        id: StockUpdationId(header.id),
        direction: Direction::from_is_addition(header.is_addition),
        brought_at: header.brought_at,
        particulars,
    }
}
