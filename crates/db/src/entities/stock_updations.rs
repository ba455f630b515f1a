//! `SeaORM` Entity for stock_updations table (ledger batch headers).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_updations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub is_addition: bool,
    pub brought_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_updation_particulars::Entity")]
    StockUpdationParticulars,
}

impl Related<super::stock_updation_particulars::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockUpdationParticulars.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
