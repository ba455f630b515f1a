//! Patient routes.

use axum::{Router, extract::State, routing::get};
use medstore_db::PatientRepository;
use medstore_db::entities::patients;
use medstore_db::repositories::PatientInput;
use medstore_shared::types::{PageResponse, PatientId};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::AppState;
use crate::extractors::{PageQuery, PathId, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResponse, ApiResult};

/// Creates the patient routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/{id}",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
}

/// Request body for creating or replacing a patient.
#[derive(Debug, Deserialize, Validate)]
pub struct PatientRequest {
    /// Full name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Age in years.
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    /// Gender.
    pub gender: Option<String>,
    /// Contact details.
    pub contact: Option<String>,
    /// Notes.
    pub description: Option<String>,
}

impl From<PatientRequest> for PatientInput {
    fn from(req: PatientRequest) -> Self {
        Self {
            name: req.name,
            age: req.age,
            gender: req.gender,
            contact: req.contact,
            description: req.description,
        }
    }
}

/// POST `/patients` - Register a patient.
async fn create_patient(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PatientRequest>,
) -> ApiResult<patients::Model> {
    let repo = PatientRepository::new((*state.db).clone());
    let patient = repo.create_patient(payload.into()).await?;

    info!(patient_id = patient.id, "Patient created");
    Ok(ApiResponse::created(patient))
}

/// GET `/patients` - List live patients, newest first.
async fn list_patients(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> ApiResult<PageResponse<patients::Model>> {
    let repo = PatientRepository::new((*state.db).clone());
    let page = state.pagination.resolve(query.page, query.limit);
    Ok(ApiResponse::ok(repo.list_patients(page).await?))
}

/// GET `/patients/{id}` - Get a patient.
async fn get_patient(
    State(state): State<AppState>,
    PathId(id): PathId<PatientId>,
) -> ApiResult<patients::Model> {
    let repo = PatientRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.get_patient(id).await?))
}

/// PUT `/patients/{id}` - Replace a patient's details.
async fn update_patient(
    State(state): State<AppState>,
    PathId(id): PathId<PatientId>,
    ValidatedJson(payload): ValidatedJson<PatientRequest>,
) -> ApiResult<patients::Model> {
    let repo = PatientRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.update_patient(id, payload.into()).await?))
}

/// DELETE `/patients/{id}` - Soft-delete a patient.
async fn delete_patient(
    State(state): State<AppState>,
    PathId(id): PathId<PatientId>,
) -> ApiResult<()> {
    let repo = PatientRepository::new((*state.db).clone());
    repo.delete_patient(id).await?;

    info!(patient_id = %id, "Patient deleted");
    Ok(ApiResponse::empty())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{json as json_request, send};

    #[tokio::test]
    async fn test_patient_age_out_of_range() {
        let (status, body) =
            send(json_request("POST", "/api/patients", r#"{"name":"Ann","age":200}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], json!("VALIDATION_ERROR"));
        assert!(body["data"].get("age").is_some());
    }

    #[tokio::test]
    async fn test_patient_requires_name() {
        let (status, body) = send(json_request("PUT", "/api/patients/1", r#"{"name":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], json!("VALIDATION_ERROR"));
    }
}
