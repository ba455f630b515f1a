//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request body could not be parsed.
    #[error("Invalid request body: {0}")]
    Binding(String),

    /// Path parameter could not be parsed.
    #[error("Invalid URL parameter: {0}")]
    InvalidUrlParam(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict (e.g., duplicate name).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stock deduction would take a medicine below zero.
    #[error("Insufficient stock for medicine {medicine_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// The medicine that is short.
        medicine_id: i32,
        /// Units currently on hand.
        available: i32,
        /// Units the operation needed.
        requested: i32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Binding(_)
            | Self::InvalidUrlParam(_)
            | Self::Validation(_)
            | Self::InsufficientStock { .. } => 400,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the response code placed in the API envelope.
    #[must_use]
    pub const fn resp_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Binding(_) => "BINDING_ERROR",
            Self::InvalidUrlParam(_) => "INVALID_URL_PARAM",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::Database(_) => "DB_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Binding(String::new()), 400, "BINDING_ERROR")]
    #[case(AppError::InvalidUrlParam(String::new()), 400, "INVALID_URL_PARAM")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(
        AppError::InsufficientStock { medicine_id: 1, available: 0, requested: 1 },
        400,
        "INSUFFICIENT_STOCK"
    )]
    #[case(AppError::Database(String::new()), 500, "DB_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_status_and_resp_codes(
        #[case] error: AppError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.resp_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("medicine 7".into()).to_string(),
            "Not found: medicine 7"
        );
        assert_eq!(
            AppError::Conflict("msg".into()).to_string(),
            "Conflict: msg"
        );
        assert_eq!(
            AppError::InsufficientStock {
                medicine_id: 3,
                available: 10,
                requested: 15,
            }
            .to_string(),
            "Insufficient stock for medicine 3: available 10, requested 15"
        );
        assert_eq!(
            AppError::Database("msg".into()).to_string(),
            "Database error: msg"
        );
    }
}
