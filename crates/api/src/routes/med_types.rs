//! Medicine type routes.

use axum::{Router, extract::State, routing::get};
use medstore_db::CatalogRepository;
use medstore_db::entities::med_types;
use medstore_shared::types::MedTypeId;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::AppState;
use crate::extractors::{PathId, ValidatedJson};
use crate::response::{ApiResponse, ApiResult};

/// Creates the medicine type routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/medtypes", get(list_med_types).post(create_med_type))
        .route(
            "/medtypes/{id}",
            get(get_med_type).put(rename_med_type).delete(delete_med_type),
        )
}

/// Request body for creating or renaming a medicine type.
#[derive(Debug, Deserialize, Validate)]
pub struct MedTypeRequest {
    /// Type name, unique.
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100))]
    pub type_name: String,
}

/// Response for a medicine type.
#[derive(Debug, Serialize)]
pub struct MedTypeResponse {
    /// Type ID.
    pub id: i32,
    /// Type name.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl From<med_types::Model> for MedTypeResponse {
    fn from(m: med_types::Model) -> Self {
        Self {
            id: m.id,
            type_name: m.type_name,
        }
    }
}

/// POST `/medtypes` - Create a medicine type.
async fn create_med_type(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<MedTypeRequest>,
) -> ApiResult<MedTypeResponse> {
    let repo = CatalogRepository::new((*state.db).clone());
    let med_type = repo.create_med_type(payload.type_name).await?;

    info!(med_type_id = med_type.id, "Medicine type created");
    Ok(ApiResponse::created(med_type.into()))
}

/// GET `/medtypes` - List all medicine types.
async fn list_med_types(State(state): State<AppState>) -> ApiResult<Vec<MedTypeResponse>> {
    let repo = CatalogRepository::new((*state.db).clone());
    let types = repo.list_med_types().await?;
    Ok(ApiResponse::ok(types.into_iter().map(Into::into).collect()))
}

/// GET `/medtypes/{id}` - Get a medicine type.
async fn get_med_type(
    State(state): State<AppState>,
    PathId(id): PathId<MedTypeId>,
) -> ApiResult<MedTypeResponse> {
    let repo = CatalogRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.get_med_type(id).await?.into()))
}

/// PUT `/medtypes/{id}` - Rename a medicine type.
async fn rename_med_type(
    State(state): State<AppState>,
    PathId(id): PathId<MedTypeId>,
    ValidatedJson(payload): ValidatedJson<MedTypeRequest>,
) -> ApiResult<MedTypeResponse> {
    let repo = CatalogRepository::new((*state.db).clone());
    let med_type = repo.rename_med_type(id, payload.type_name).await?;
    Ok(ApiResponse::ok(med_type.into()))
}

/// DELETE `/medtypes/{id}` - Delete an unused medicine type.
async fn delete_med_type(
    State(state): State<AppState>,
    PathId(id): PathId<MedTypeId>,
) -> ApiResult<()> {
    let repo = CatalogRepository::new((*state.db).clone());
    repo.delete_med_type(id).await?;
    Ok(ApiResponse::empty())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{json as json_request, send};

    #[tokio::test]
    async fn test_empty_type_name_is_rejected() {
        let (status, body) = send(json_request("POST", "/api/medtypes", r#"{"type":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_missing_type_field_is_binding_error() {
        let request = json_request("POST", "/api/medtypes", r#"{"name":"Syrup"}"#);
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], json!("BINDING_ERROR"));
        assert_eq!(body["status"], json!(false));
    }
}
