//! `SeaORM` entity definitions.

pub mod prelude;

pub mod med_types;
pub mod medicines;
pub mod patients;
pub mod stock_updation_particulars;
pub mod stock_updations;
pub mod visits;
