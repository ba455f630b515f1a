//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod med_types;
pub mod medicines;
pub mod patients;
pub mod stock;
pub mod visits;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(medicines::routes())
        .merge(med_types::routes())
        .merge(stock::routes())
        .merge(patients::routes())
        .merge(visits::routes())
}
