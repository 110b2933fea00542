//! Property sale entity - One closed sale in an advisor's sales log.
//!
//! Sales are a record of what the advisor closed. They do not move point balances;
//! points for a sale come from awarding the matching rule.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property sale database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Advisor who closed the sale
    pub advisor_id: i64,
    /// Address of the property
    pub address: String,
    /// Day the sale closed
    pub sale_date: Date,
    /// Sale price in whole currency units
    pub sale_amount: i64,
    /// Points the advisor earned for the sale
    pub points_earned: i64,
    /// When the sale was recorded
    pub recorded_at: DateTimeUtc,
}

/// Defines relationships between `PropertySale` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale belongs to one advisor
    #[sea_orm(
        belongs_to = "super::advisor::Entity",
        from = "Column::AdvisorId",
        to = "super::advisor::Column::Id"
    )]
    Advisor,
}

impl Related<super::advisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advisor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
