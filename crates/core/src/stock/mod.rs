//! Stock ledger rules.
//!
//! This module holds the pure side of the stock ledger:
//! - Batch direction and line item types
//! - Error taxonomy for ledger operations
//! - Batch validation
//! - Balance delta planning for creation, revision and deletion
//! - Low-stock and drift calculations
//!
//! Persistence and transactions live in `medstore-db`; everything here is
//! deterministic and side-effect free.

pub mod balance;
pub mod error;
pub mod levels;
pub mod plan;
pub mod types;
pub mod validation;

#[cfg(test)]
mod ledger_props;
#[cfg(test)]
mod plan_props;

pub use balance::apply_delta;
pub use error::StockError;
pub use levels::{BalanceDrift, StockLevel, sort_by_deficiency};
pub use plan::{BalanceDelta, RevisionPlan, RevisionStep, plan_batch, plan_reversal, plan_revision};
pub use types::{Direction, StockChange};
pub use validation::{validate_batch, validate_revision};
