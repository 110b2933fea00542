//! Point transaction entity - One entry in the append-only award log.
//!
//! `points_awarded` is copied from the rule when the award is made and never
//! changes afterwards, even if the rule is edited or deleted.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Point transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    /// Unique identifier for the award
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Advisor who earned the points
    pub advisor_id: i64,
    /// Rule that triggered the award
    pub rule_id: i64,
    /// Points granted, fixed at award time
    pub points_awarded: i64,
    /// Day the qualifying event happened
    pub date: Date,
    /// Free-form note (e.g., the property address)
    pub comment: Option<String>,
    /// When the award was recorded
    pub recorded_at: DateTimeUtc,
}

/// Defines relationships between `PointTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each award belongs to one advisor
    #[sea_orm(
        belongs_to = "super::advisor::Entity",
        from = "Column::AdvisorId",
        to = "super::advisor::Column::Id"
    )]
    Advisor,
    /// Each award was made under one rule
    #[sea_orm(
        belongs_to = "super::point_rule::Entity",
        from = "Column::RuleId",
        to = "super::point_rule::Column::Id"
    )]
    PointRule,
}

impl Related<super::advisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advisor.def()
    }
}

impl Related<super::point_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointRule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
