//! Point rule entity - A named event that earns advisors a fixed number of points.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Point rule database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "point_rules")]
pub struct Model {
    /// Unique identifier for the rule
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the rule (e.g., "Closed Sale")
    #[sea_orm(unique)]
    pub name: String,
    /// What the advisor has to do to earn the points
    pub description: String,
    /// Emoji shown next to the rule
    pub icon: String,
    /// Points granted per award, always positive
    pub points_awarded: i64,
    /// Inactive rules cannot be used for new awards
    pub is_active: bool,
    /// Soft delete flag - awards keep pointing at deleted rules
    pub is_deleted: bool,
    /// When the rule was created
    pub created_at: DateTime,
    /// When the rule was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `PointRule` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One rule has many awards
    #[sea_orm(has_many = "super::point_transaction::Entity")]
    PointTransactions,
}

impl Related<super::point_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
