//! Request extractors that reject with the response envelope.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use medstore_shared::AppError;
use serde::{Deserialize, de::DeserializeOwned};
use validator::Validate;

use crate::response::ApiError;

/// JSON body that has been deserialized and validated.
///
/// Malformed bodies are rejected with `BINDING_ERROR`, rule failures with
/// `VALIDATION_ERROR` and the failing fields in `data`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Binding(e.body_text()))?;
        value.validate().map_err(|e| ApiError::validation(&e))?;
        Ok(Self(value))
    }
}

/// Query string that has been deserialized and validated.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Binding(e.body_text()))?;
        value.validate().map_err(|e| ApiError::validation(&e))?;
        Ok(Self(value))
    }
}

/// Typed path parameters; unparsable values are rejected with `INVALID_URL_PARAM`.
#[derive(Debug, Clone, Copy)]
pub struct PathId<T>(pub T);

impl<S, T> FromRequestParts<S> for PathId<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|e| AppError::InvalidUrlParam(e.body_text()).into())
    }
}

/// `page` and `limit` query parameters of list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct PageQuery {
    /// 1-based page number.
    #[validate(range(min = 1, max = 1_000_000))]
    pub page: Option<u64>,
    /// Items per page.
    #[validate(range(min = 1))]
    pub limit: Option<u64>,
}
