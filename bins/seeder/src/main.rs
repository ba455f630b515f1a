//! Database seeder for Medstore development and testing.
//!
//! Seeds medicine types, a small catalog and an opening stock batch so a fresh
//! database has something to look at. Safe to run more than once.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use medstore_core::stock::StockChange;
use medstore_db::entities::{med_types, medicines};
use medstore_db::repositories::{CatalogError, CreateMedicineInput};
use medstore_db::{CatalogRepository, StockLedgerRepository};
use medstore_shared::AppConfig;
use medstore_shared::types::{MedTypeId, MedicineId};

const MED_TYPES: [&str; 4] = ["Tablet", "Syrup", "Injection", "Ointment"];

/// (name, type, price, min_stock, optimal_stock, opening stock)
const MEDICINES: [(&str, &str, Decimal, i32, i32, i32); 5] = [
    ("Paracetamol 500mg", "Tablet", dec!(0.50), 100, 500, 320),
    ("Amoxicillin 250mg", "Tablet", dec!(1.20), 50, 200, 40),
    ("Cough Syrup 100ml", "Syrup", dec!(3.75), 20, 60, 25),
    ("Insulin 10ml", "Injection", dec!(18.00), 10, 30, 4),
    ("Hydrocortisone Cream", "Ointment", dec!(5.40), 15, 40, 30),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = medstore_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    medstore_db::migrate(&db)
        .await
        .context("Failed to apply migrations")?;

    println!("Seeding medicine types...");
    seed_med_types(&db).await?;

    println!("Seeding medicines...");
    let opening = seed_medicines(&db).await?;

    if opening.is_empty() {
        println!("  Catalog already seeded, skipping opening stock...");
    } else {
        println!("Recording opening stock...");
        let batch = StockLedgerRepository::new(db.clone())
            .add_stock(&opening)
            .await
            .context("Failed to record opening stock")?;
        println!("  Created stock updation {} with {} items", batch.id, batch.particulars.len());
    }

    println!("Seeding complete!");
    Ok(())
}

async fn seed_med_types(db: &DatabaseConnection) -> anyhow::Result<()> {
    let catalog = CatalogRepository::new(db.clone());
    for name in MED_TYPES {
        match catalog.create_med_type(name.to_string()).await {
            Ok(t) => println!("  Created type {} ({})", t.type_name, t.id),
            Err(CatalogError::DuplicateMedTypeName(_)) => {
                println!("  Type {name} already exists, skipping...");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Creates missing medicines and returns the opening stock for the new ones.
async fn seed_medicines(db: &DatabaseConnection) -> anyhow::Result<Vec<StockChange>> {
    let catalog = CatalogRepository::new(db.clone());
    let mut opening = Vec::new();

    for (name, type_name, price, min_stock, optimal_stock, stock) in MEDICINES {
        let exists = medicines::Entity::find()
            .filter(medicines::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some();
        if exists {
            println!("  Medicine {name} already exists, skipping...");
            continue;
        }

        let med_type = med_types::Entity::find()
            .filter(med_types::Column::TypeName.eq(type_name))
            .one(db)
            .await?
            .with_context(|| format!("Missing medicine type {type_name}"))?;

        let medicine = catalog
            .create_medicine(CreateMedicineInput {
                name: name.to_string(),
                description: None,
                type_id: MedTypeId(med_type.id),
                price,
                min_stock,
                optimal_stock,
            })
            .await?;
        println!("  Created medicine {} ({})", medicine.name, medicine.id);

        opening.push(StockChange::new(MedicineId(medicine.id), stock));
    }

    Ok(opening)
}
