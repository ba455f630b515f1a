//! Core business logic for Medstore.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `stock` - Stock ledger rules: batch validation, balance delta planning,
//!   revision diffing and stock level reporting
//!
//! The transactional engine that applies these rules lives in `medstore-db`.

pub mod stock;
