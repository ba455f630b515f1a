//! Database error classification and conversion to the API error type.

use medstore_shared::AppError;
use sea_orm::{DbErr, SqlErr};

use crate::repositories::{CatalogError, PatientError, StockLedgerError};

/// Returns true if the error is a unique constraint violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Returns true if the error is a foreign key violation.
pub fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

impl From<StockLedgerError> for AppError {
    fn from(err: StockLedgerError) -> Self {
        match err {
            StockLedgerError::Stock(e) => e.into(),
            StockLedgerError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MedicineNotFound(_) | CatalogError::MedTypeNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            CatalogError::DuplicateMedicineName(_)
            | CatalogError::DuplicateMedTypeName(_)
            | CatalogError::MedicineInUse(_)
            | CatalogError::MedTypeInUse(_) => Self::Conflict(err.to_string()),
            CatalogError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) | PatientError::VisitNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            PatientError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
