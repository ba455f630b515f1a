//! Visit routes.

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, FixedOffset};
use medstore_db::PatientRepository;
use medstore_db::entities::visits;
use medstore_db::repositories::{CreateVisitInput, UpdateVisitInput};
use medstore_shared::types::{PageResponse, PatientId, VisitId};
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use crate::extractors::{PageQuery, PathId, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResponse, ApiResult};

/// Creates the visit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/visits", get(list_visits).post(create_visit))
        .route(
            "/visits/{id}",
            get(get_visit).put(update_visit).delete(delete_visit),
        )
        .route("/visits/patient/{id}", get(list_visits_by_patient))
}

/// Request body for recording a visit.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVisitRequest {
    /// Visiting patient.
    #[validate(range(min = 1))]
    pub patient_id: i32,
    /// Visit time (RFC 3339), defaults to now.
    pub date: Option<DateTime<FixedOffset>>,
    /// Notes.
    pub notes: Option<String>,
}

/// Request body for updating a visit.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVisitRequest {
    /// Visit time (RFC 3339).
    pub date: Option<DateTime<FixedOffset>>,
    /// Notes.
    pub notes: Option<String>,
}

/// POST `/visits` - Record a visit.
async fn create_visit(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateVisitRequest>,
) -> ApiResult<visits::Model> {
    let repo = PatientRepository::new((*state.db).clone());
    let visit = repo
        .create_visit(CreateVisitInput {
            patient_id: PatientId(payload.patient_id),
            date: payload.date,
            notes: payload.notes,
        })
        .await?;
    Ok(ApiResponse::created(visit))
}

/// GET `/visits` - List visits, most recent first.
async fn list_visits(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> ApiResult<PageResponse<visits::Model>> {
    let repo = PatientRepository::new((*state.db).clone());
    let page = state.pagination.resolve(query.page, query.limit);
    Ok(ApiResponse::ok(repo.list_visits(page).await?))
}

/// GET `/visits/{id}` - Get a visit.
async fn get_visit(
    State(state): State<AppState>,
    PathId(id): PathId<VisitId>,
) -> ApiResult<visits::Model> {
    let repo = PatientRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.get_visit(id).await?))
}

/// PUT `/visits/{id}` - Update a visit.
async fn update_visit(
    State(state): State<AppState>,
    PathId(id): PathId<VisitId>,
    ValidatedJson(payload): ValidatedJson<UpdateVisitRequest>,
) -> ApiResult<visits::Model> {
    let repo = PatientRepository::new((*state.db).clone());
    let visit = repo
        .update_visit(
            id,
            UpdateVisitInput {
                date: payload.date,
                notes: payload.notes.map(Some),
            },
        )
        .await?;
    Ok(ApiResponse::ok(visit))
}

/// DELETE `/visits/{id}` - Delete a visit.
async fn delete_visit(
    State(state): State<AppState>,
    PathId(id): PathId<VisitId>,
) -> ApiResult<()> {
    let repo = PatientRepository::new((*state.db).clone());
    repo.delete_visit(id).await?;
    Ok(ApiResponse::empty())
}

/// GET `/visits/patient/{id}` - Visits of one patient.
async fn list_visits_by_patient(
    State(state): State<AppState>,
    PathId(id): PathId<PatientId>,
) -> ApiResult<Vec<visits::Model>> {
    let repo = PatientRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.list_visits_by_patient(id).await?))
}
