//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

mod balance;
pub mod catalog;
pub mod patient;
pub mod stock;

pub use catalog::{CatalogError, CatalogRepository, CreateMedicineInput, UpdateMedicineInput};
pub use patient::{
    CreateVisitInput, PatientError, PatientInput, PatientRepository, UpdateVisitInput,
};
pub use stock::{
    DriftRepair, LineItemRemoval, LowStockItem, MedicineMovement, StockBatch, StockLedgerError,
    StockLedgerRepository,
};
