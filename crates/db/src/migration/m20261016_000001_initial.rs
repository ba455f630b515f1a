//! Initial database migration.
//!
//! Creates the catalog, stock ledger and patient tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CATALOG
        // ============================================================
        db.execute_unprepared(MED_TYPES_SQL).await?;
        db.execute_unprepared(MEDICINES_SQL).await?;

        // ============================================================
        // PART 2: STOCK LEDGER
        // ============================================================
        db.execute_unprepared(STOCK_UPDATIONS_SQL).await?;
        db.execute_unprepared(STOCK_UPDATION_PARTICULARS_SQL).await?;

        // ============================================================
        // PART 3: PATIENTS
        // ============================================================
        db.execute_unprepared(PATIENTS_SQL).await?;
        db.execute_unprepared(VISITS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const MED_TYPES_SQL: &str = r"
CREATE TABLE med_types (
    id      SERIAL PRIMARY KEY,
    type    VARCHAR(100) NOT NULL,

    CONSTRAINT uq_med_types_type UNIQUE (type)
);
";

const MEDICINES_SQL: &str = r"
CREATE TABLE medicines (
    id              SERIAL PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    description     TEXT,
    type_id         INTEGER NOT NULL REFERENCES med_types(id) ON DELETE RESTRICT,
    price           NUMERIC(12, 2) NOT NULL DEFAULT 0,
    min_stock       INTEGER NOT NULL DEFAULT 0,
    optimal_stock   INTEGER NOT NULL DEFAULT 0,
    current_stock   INTEGER NOT NULL DEFAULT 0,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_medicines_name UNIQUE (name),
    CONSTRAINT chk_medicines_price CHECK (price >= 0),
    CONSTRAINT chk_medicines_min_stock CHECK (min_stock >= 0),
    CONSTRAINT chk_medicines_optimal_stock CHECK (optimal_stock >= 0),
    CONSTRAINT chk_medicines_current_stock CHECK (current_stock >= 0)
);

CREATE INDEX idx_medicines_type ON medicines(type_id);
";

const STOCK_UPDATIONS_SQL: &str = r"
CREATE TABLE stock_updations (
    id              SERIAL PRIMARY KEY,
    is_addition     BOOLEAN NOT NULL,
    brought_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_stock_updations_direction ON stock_updations(is_addition, brought_at DESC);
";

const STOCK_UPDATION_PARTICULARS_SQL: &str = r"
CREATE TABLE stock_updation_particulars (
    stock_updation_id   INTEGER NOT NULL REFERENCES stock_updations(id)
                            ON UPDATE CASCADE ON DELETE CASCADE,
    medicine_id         INTEGER NOT NULL REFERENCES medicines(id) ON DELETE RESTRICT,
    quantity            INTEGER NOT NULL,

    PRIMARY KEY (stock_updation_id, medicine_id),
    CONSTRAINT chk_particulars_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_particulars_medicine ON stock_updation_particulars(medicine_id);
";

const PATIENTS_SQL: &str = r"
CREATE TABLE patients (
    id              SERIAL PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    age             INTEGER,
    gender          VARCHAR(32),
    contact         VARCHAR(100),
    description     TEXT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at      TIMESTAMPTZ,

    CONSTRAINT chk_patients_age CHECK (age IS NULL OR age >= 0)
);

CREATE INDEX idx_patients_live ON patients(created_at DESC) WHERE deleted_at IS NULL;
";

const VISITS_SQL: &str = r"
CREATE TABLE visits (
    id              SERIAL PRIMARY KEY,
    patient_id      INTEGER NOT NULL REFERENCES patients(id) ON DELETE RESTRICT,
    date            TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    notes           TEXT
);

CREATE INDEX idx_visits_patient ON visits(patient_id, date DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS visits;
DROP TABLE IF EXISTS patients;
DROP TABLE IF EXISTS stock_updation_particulars;
DROP TABLE IF EXISTS stock_updations;
DROP TABLE IF EXISTS medicines;
DROP TABLE IF EXISTS med_types;
";
