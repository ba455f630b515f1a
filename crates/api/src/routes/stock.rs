//! Stock ledger routes.
//!
//! Thin handlers over [`StockLedgerRepository`]; every mutation runs in one
//! engine transaction.

use axum::{
    Router,
    extract::State,
    routing::{delete, get, post},
};
use medstore_core::stock::{BalanceDrift, Direction, StockChange};
use medstore_db::StockLedgerRepository;
use medstore_db::repositories::{
    DriftRepair, LineItemRemoval, LowStockItem, MedicineMovement, StockBatch,
};
use medstore_shared::types::{MedicineId, PageResponse, StockUpdationId};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::AppState;
use crate::extractors::{PageQuery, PathId, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResponse, ApiResult};

/// Creates the stock routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock/add", post(add_stock))
        .route("/stock/deduct", post(deduct_stock))
        .route("/stock/additions", get(list_additions))
        .route("/stock/deductions", get(list_deductions))
        .route(
            "/stock/updations/{id}",
            get(get_updation).put(revise_updation).delete(delete_updation),
        )
        .route(
            "/stock/updations/{id}/medicines/{medicine_id}",
            delete(delete_line_item),
        )
        .route("/stock/medicine/{id}", get(medicine_stock))
        .route("/stock/medicine/additions/{id}", get(medicine_additions))
        .route("/stock/medicine/deductions/{id}", get(medicine_deductions))
        .route("/stock/summary", get(low_stock_summary))
        .route(
            "/stock/reconciliation",
            get(find_drift).post(repair_drift),
        )
}

/// One line item in a request body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct StockChangeRequest {
    /// Medicine ID.
    #[validate(range(min = 1))]
    pub medicine_id: i32,
    /// Unsigned quantity.
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Request body for adding, deducting or revising stock.
#[derive(Debug, Deserialize, Validate)]
pub struct StockChangesRequest {
    /// Line items, at least one.
    #[validate(length(min = 1), nested)]
    pub stock_changes: Vec<StockChangeRequest>,
}

impl StockChangesRequest {
    fn into_changes(self) -> Vec<StockChange> {
        self.stock_changes
            .into_iter()
            .map(|c| StockChange::new(MedicineId(c.medicine_id), c.quantity))
            .collect()
    }
}

/// Current balance of one medicine.
#[derive(Debug, Serialize)]
pub struct MedicineStockResponse {
    /// Medicine ID.
    pub medicine_id: MedicineId,
    /// Units on hand.
    pub current_stock: i32,
}

/// POST `/stock/add` - Record an addition batch.
async fn add_stock(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<StockChangesRequest>,
) -> ApiResult<StockBatch> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    let batch = repo.add_stock(&payload.into_changes()).await?;

    info!(stock_updation_id = %batch.id, items = batch.particulars.len(), "Stock added");
    Ok(ApiResponse::created(batch))
}

/// POST `/stock/deduct` - Record a deduction batch.
async fn deduct_stock(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<StockChangesRequest>,
) -> ApiResult<StockBatch> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    let batch = repo.deduct_stock(&payload.into_changes()).await?;

    info!(stock_updation_id = %batch.id, items = batch.particulars.len(), "Stock deducted");
    Ok(ApiResponse::created(batch))
}

/// GET `/stock/additions` - List addition batches.
async fn list_additions(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> ApiResult<PageResponse<StockBatch>> {
    list_batches(&state, Direction::Addition, query).await
}

/// GET `/stock/deductions` - List deduction batches.
async fn list_deductions(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> ApiResult<PageResponse<StockBatch>> {
    list_batches(&state, Direction::Deduction, query).await
}

async fn list_batches(
    state: &AppState,
    direction: Direction,
    query: PageQuery,
) -> ApiResult<PageResponse<StockBatch>> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    let page = state.pagination.resolve(query.page, query.limit);
    Ok(ApiResponse::ok(repo.list_batches(direction, page).await?))
}

/// GET `/stock/updations/{id}` - Get a batch with its line items.
async fn get_updation(
    State(state): State<AppState>,
    PathId(id): PathId<StockUpdationId>,
) -> ApiResult<StockBatch> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.get_batch(id).await?))
}

/// PUT `/stock/updations/{id}` - Replace a batch's line items.
async fn revise_updation(
    State(state): State<AppState>,
    PathId(id): PathId<StockUpdationId>,
    ValidatedJson(payload): ValidatedJson<StockChangesRequest>,
) -> ApiResult<StockBatch> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    let batch = repo.revise_updation(id, &payload.into_changes()).await?;

    info!(stock_updation_id = %id, "Stock updation revised");
    Ok(ApiResponse::ok(batch))
}

/// DELETE `/stock/updations/{id}` - Delete a batch and reverse its effect.
async fn delete_updation(
    State(state): State<AppState>,
    PathId(id): PathId<StockUpdationId>,
) -> ApiResult<()> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    repo.delete_updation(id).await?;

    info!(stock_updation_id = %id, "Stock updation deleted");
    Ok(ApiResponse::empty())
}

/// DELETE `/stock/updations/{id}/medicines/{medicine_id}` - Remove one line item.
async fn delete_line_item(
    State(state): State<AppState>,
    PathId((id, medicine_id)): PathId<(StockUpdationId, MedicineId)>,
) -> ApiResult<LineItemRemoval> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    let removal = repo.delete_line_item(id, medicine_id).await?;

    info!(
        stock_updation_id = %id,
        medicine_id = %medicine_id,
        batch_deleted = removal.batch_deleted,
        "Line item removed"
    );
    Ok(ApiResponse::ok(removal))
}

/// GET `/stock/medicine/{id}` - Current balance of a medicine.
async fn medicine_stock(
    State(state): State<AppState>,
    PathId(id): PathId<MedicineId>,
) -> ApiResult<MedicineStockResponse> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    let current_stock = repo.medicine_stock(id).await?;
    Ok(ApiResponse::ok(MedicineStockResponse {
        medicine_id: id,
        current_stock,
    }))
}

/// GET `/stock/medicine/additions/{id}` - Addition history of a medicine.
async fn medicine_additions(
    State(state): State<AppState>,
    PathId(id): PathId<MedicineId>,
) -> ApiResult<Vec<MedicineMovement>> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(
        repo.list_medicine_movements(id, Direction::Addition).await?,
    ))
}

/// GET `/stock/medicine/deductions/{id}` - Deduction history of a medicine.
async fn medicine_deductions(
    State(state): State<AppState>,
    PathId(id): PathId<MedicineId>,
) -> ApiResult<Vec<MedicineMovement>> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(
        repo.list_medicine_movements(id, Direction::Deduction).await?,
    ))
}

/// GET `/stock/summary` - Medicines below their minimum stock.
async fn low_stock_summary(State(state): State<AppState>) -> ApiResult<Vec<LowStockItem>> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.low_stock_summary().await?))
}

/// GET `/stock/reconciliation` - Balances that disagree with the ledger.
async fn find_drift(State(state): State<AppState>) -> ApiResult<Vec<BalanceDrift>> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.find_drift().await?))
}

/// POST `/stock/reconciliation` - Reset drifted balances to their ledger totals.
async fn repair_drift(State(state): State<AppState>) -> ApiResult<DriftRepair> {
    let repo = StockLedgerRepository::new((*state.db).clone());
    let repair = repo.repair_drift().await?;

    info!(
        repaired = repair.repaired.len(),
        unrepairable = repair.unrepairable.len(),
        "Stock reconciliation finished"
    );
    Ok(ApiResponse::ok(repair))
}
