//! Advisor entity - A salesperson enrolled in the rewards program.
//!
//! The three point columns are a materialized view over the point and redemption
//! logs. They are only ever changed together with a log write, so
//! `points_available == points_accumulated - points_redeemed` holds for every row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Advisor database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "advisors")]
pub struct Model {
    /// Unique identifier for the advisor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name, unique across the program
    #[sea_orm(unique)]
    pub name: String,
    /// Contact email
    pub email: String,
    /// Number of properties the advisor has closed, including sales before the log
    pub properties_sold: i32,
    /// Date the advisor joined the program
    pub join_date: Date,
    /// Lifetime points earned through rules
    pub points_accumulated: i64,
    /// Lifetime points spent on redemptions
    pub points_redeemed: i64,
    /// Points currently spendable
    pub points_available: i64,
}

/// Defines relationships between Advisor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One advisor has many point awards
    #[sea_orm(has_many = "super::point_transaction::Entity")]
    PointTransactions,
    /// One advisor has many redemptions
    #[sea_orm(has_many = "super::redemption::Entity")]
    Redemptions,
    /// One advisor has many recorded property sales
    #[sea_orm(has_many = "super::property_sale::Entity")]
    PropertySales,
}

impl Related<super::point_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointTransactions.def()
    }
}

impl Related<super::redemption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Redemptions.def()
    }
}

impl Related<super::property_sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PropertySales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the stored balance columns agree with each other.
    #[must_use]
    pub const fn is_balanced(&self) -> bool {
        self.points_available == self.points_accumulated - self.points_redeemed
    }
}
