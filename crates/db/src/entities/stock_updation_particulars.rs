//! `SeaORM` Entity for stock_updation_particulars table (ledger line items).
//!
//! Rows carry only an unsigned quantity. Direction and timestamp come from the
//! parent `stock_updations` row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_updation_particulars")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub stock_updation_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub medicine_id: i32,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_updations::Entity",
        from = "Column::StockUpdationId",
        to = "super::stock_updations::Column::Id",
        on_delete = "Cascade"
    )]
    StockUpdations,
    #[sea_orm(
        belongs_to = "super::medicines::Entity",
        from = "Column::MedicineId",
        to = "super::medicines::Column::Id",
        on_delete = "Restrict"
    )]
    Medicines,
}

impl Related<super::stock_updations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockUpdations.def()
    }
}

impl Related<super::medicines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Medicines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
