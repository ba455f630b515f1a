//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes under `/api`
//! - Validating request extractors
//! - The `{status, resp_code, data, error}` response envelope

pub mod extractors;
pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use medstore_shared::PaginationConfig;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Paging defaults for list endpoints.
    pub pagination: PaginationConfig,
}

/// Creates the main application router.
///
/// Requests running longer than `request_timeout` are cancelled; the dropped
/// handler future rolls back any open transaction.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use medstore_shared::PaginationConfig;
    use sea_orm::DatabaseConnection;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{AppState, create_router};

    /// Router over a disconnected database, for requests rejected before any query.
    pub fn app() -> axum::Router {
        let state = AppState {
            db: Arc::new(DatabaseConnection::Disconnected),
            pagination: PaginationConfig::default(),
        };
        create_router(state, Duration::from_secs(5))
    }

    pub async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn json(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }
}
