//! Medicine catalog routes.

use axum::{Router, extract::State, routing::get};
use medstore_db::CatalogRepository;
use medstore_db::entities::medicines;
use medstore_db::repositories::{CreateMedicineInput, UpdateMedicineInput};
use medstore_shared::types::{MedTypeId, MedicineId, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};

use crate::AppState;
use crate::extractors::{PageQuery, PathId, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResponse, ApiResult};

/// Creates the medicine routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/medicines", get(list_medicines).post(create_medicine))
        .route(
            "/medicines/{id}",
            get(get_medicine).put(update_medicine).delete(delete_medicine),
        )
}

/// Request body for creating a medicine.
///
/// The balance is not accepted here; it starts at zero and only the stock
/// endpoints change it.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_create_price"))]
pub struct CreateMedicineRequest {
    /// Unique name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Medicine type ID.
    #[serde(alias = "typeId")]
    #[validate(range(min = 1))]
    pub type_id: i32,
    /// Unit price.
    pub price: Decimal,
    /// Minimum stock threshold.
    #[validate(range(min = 0))]
    pub min_stock: i32,
    /// Optimal stock level.
    #[validate(range(min = 0))]
    pub optimal_stock: i32,
}

/// Request body for updating a medicine. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_update_price"))]
pub struct UpdateMedicineRequest {
    /// Unique name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Medicine type ID.
    #[serde(alias = "typeId")]
    #[validate(range(min = 1))]
    pub type_id: Option<i32>,
    /// Unit price.
    pub price: Option<Decimal>,
    /// Minimum stock threshold.
    #[validate(range(min = 0))]
    pub min_stock: Option<i32>,
    /// Optimal stock level.
    #[validate(range(min = 0))]
    pub optimal_stock: Option<i32>,
}

fn non_negative_price(price: Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

fn validate_create_price(req: &CreateMedicineRequest) -> Result<(), ValidationError> {
    non_negative_price(req.price)
}

fn validate_update_price(req: &UpdateMedicineRequest) -> Result<(), ValidationError> {
    req.price.map_or(Ok(()), non_negative_price)
}

/// Response for a medicine.
#[derive(Debug, Serialize)]
pub struct MedicineResponse {
    /// Medicine ID.
    pub id: i32,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Medicine type ID.
    pub type_id: i32,
    /// Unit price.
    pub price: Decimal,
    /// Minimum stock threshold.
    pub min_stock: i32,
    /// Optimal stock level.
    pub optimal_stock: i32,
    /// Units on hand.
    pub current_stock: i32,
}

impl From<medicines::Model> for MedicineResponse {
    fn from(m: medicines::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            type_id: m.type_id,
            price: m.price,
            min_stock: m.min_stock,
            optimal_stock: m.optimal_stock,
            current_stock: m.current_stock,
        }
    }
}

/// POST `/medicines` - Create a medicine.
async fn create_medicine(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateMedicineRequest>,
) -> ApiResult<MedicineResponse> {
    let repo = CatalogRepository::new((*state.db).clone());
    let medicine = repo
        .create_medicine(CreateMedicineInput {
            name: payload.name,
            description: payload.description,
            type_id: MedTypeId(payload.type_id),
            price: payload.price,
            min_stock: payload.min_stock,
            optimal_stock: payload.optimal_stock,
        })
        .await?;

    info!(medicine_id = medicine.id, name = %medicine.name, "Medicine created");
    Ok(ApiResponse::created(medicine.into()))
}

/// GET `/medicines` - List medicines.
async fn list_medicines(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> ApiResult<PageResponse<MedicineResponse>> {
    let repo = CatalogRepository::new((*state.db).clone());
    let page = state.pagination.resolve(query.page, query.limit);
    let medicines = repo.list_medicines(page).await?;
    Ok(ApiResponse::ok(medicines.map(MedicineResponse::from)))
}

/// GET `/medicines/{id}` - Get a medicine.
async fn get_medicine(
    State(state): State<AppState>,
    PathId(id): PathId<MedicineId>,
) -> ApiResult<MedicineResponse> {
    let repo = CatalogRepository::new((*state.db).clone());
    let medicine = repo.get_medicine(id).await?;
    Ok(ApiResponse::ok(medicine.into()))
}

/// PUT `/medicines/{id}` - Update a medicine.
async fn update_medicine(
    State(state): State<AppState>,
    PathId(id): PathId<MedicineId>,
    ValidatedJson(payload): ValidatedJson<UpdateMedicineRequest>,
) -> ApiResult<MedicineResponse> {
    let repo = CatalogRepository::new((*state.db).clone());
    let medicine = repo
        .update_medicine(
            id,
            UpdateMedicineInput {
                name: payload.name,
                description: payload.description.map(Some),
                type_id: payload.type_id.map(MedTypeId),
                price: payload.price,
                min_stock: payload.min_stock,
                optimal_stock: payload.optimal_stock,
            },
        )
        .await?;
    Ok(ApiResponse::ok(medicine.into()))
}

/// DELETE `/medicines/{id}` - Delete a medicine without stock history.
async fn delete_medicine(
    State(state): State<AppState>,
    PathId(id): PathId<MedicineId>,
) -> ApiResult<()> {
    let repo = CatalogRepository::new((*state.db).clone());
    repo.delete_medicine(id).await?;

    info!(medicine_id = %id, "Medicine deleted");
    Ok(ApiResponse::empty())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::test_support::{get, json as json_request, send};

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(4.50), true)]
    #[case(dec!(-0.01), false)]
    fn test_price_rule(#[case] price: Decimal, #[case] ok: bool) {
        assert_eq!(non_negative_price(price).is_ok(), ok);
    }

    #[test]
    fn test_type_id_accepts_camel_case_alias() {
        let req: CreateMedicineRequest = serde_json::from_value(json!({
            "name": "Paracetamol",
            "typeId": 2,
            "price": "1.25",
            "min_stock": 5,
            "optimal_stock": 20
        }))
        .unwrap();
        assert_eq!(req.type_id, 2);
        assert!(req.validate().is_ok());
    }

    #[tokio::test]
    async fn test_current_stock_is_rejected_on_create() {
        let body = r#"{"name":"X","type_id":1,"price":"1","min_stock":0,"optimal_stock":0,"current_stock":50}"#;
        let (status, body) = send(json_request("POST", "/api/medicines", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], json!("BINDING_ERROR"));
    }

    #[tokio::test]
    async fn test_negative_min_stock_is_validation_error() {
        let body = r#"{"name":"X","type_id":1,"price":"1","min_stock":-1,"optimal_stock":0}"#;
        let (status, body) = send(json_request("POST", "/api/medicines", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], json!("VALIDATION_ERROR"));
        assert!(body["data"].get("min_stock").is_some());
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_invalid_url_param() {
        let (status, body) = send(get("/api/medicines/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], json!("INVALID_URL_PARAM"));
    }

    #[tokio::test]
    async fn test_zero_page_is_validation_error() {
        let (status, body) = send(get("/api/medicines?page=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], json!("VALIDATION_ERROR"));
    }
}
