//! `SeaORM` Entity for medicines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "medicines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub type_id: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub min_stock: i32,
    pub optimal_stock: i32,
    /// Written only by the stock ledger engine.
    pub current_stock: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::med_types::Entity",
        from = "Column::TypeId",
        to = "super::med_types::Column::Id"
    )]
    MedTypes,
    #[sea_orm(has_many = "super::stock_updation_particulars::Entity")]
    StockUpdationParticulars,
}

impl Related<super::med_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MedTypes.def()
    }
}

impl Related<super::stock_updation_particulars::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockUpdationParticulars.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
