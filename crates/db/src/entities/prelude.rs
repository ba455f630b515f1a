//! Entity re-exports.

pub use super::med_types::Entity as MedTypes;
pub use super::medicines::Entity as Medicines;
pub use super::patients::Entity as Patients;
pub use super::stock_updation_particulars::Entity as StockUpdationParticulars;
pub use super::stock_updations::Entity as StockUpdations;
pub use super::visits::Entity as Visits;
