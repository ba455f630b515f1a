//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The stock ledger engine and the other repositories
//! - Database migrations, applied at startup

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;

pub use repositories::{CatalogRepository, PatientRepository, StockLedgerRepository};

use std::time::Duration;

use medstore_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Applies pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let pending = migration::Migrator::get_pending_migrations(db).await?.len();
    if pending > 0 {
        tracing::info!(pending, "Applying migrations");
    }
    migration::Migrator::up(db, None).await
}
