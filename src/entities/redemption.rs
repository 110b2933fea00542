//! Redemption entity - An exchange of points for a catalog product.
//!
//! `points_used` is copied from the product at redemption time. The status is the
//! only column that changes after insert, and only from `pending` to one of the
//! two terminal states.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fulfillment state of a redemption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    /// Waiting to be handed over to the advisor
    #[sea_orm(string_value = "pending")]
    Pending,
    /// The advisor received the product
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// The redemption was called off
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl RedemptionStatus {
    /// Lowercase name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a redemption in this state may move to `target`.
    ///
    /// Only `pending` has outgoing transitions, and never back to itself.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Delivered | Self::Cancelled)
        )
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redemption database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "redemptions")]
pub struct Model {
    /// Unique identifier for the redemption
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Advisor spending the points
    pub advisor_id: i64,
    /// Product being redeemed
    pub product_id: i64,
    /// Points spent, fixed at redemption time
    pub points_used: i64,
    /// Day the redemption was made
    pub date: Date,
    /// Fulfillment state
    pub status: RedemptionStatus,
    /// When the redemption was recorded
    pub recorded_at: DateTimeUtc,
    /// When the status last changed
    pub status_changed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Redemption and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each redemption belongs to one advisor
    #[sea_orm(
        belongs_to = "super::advisor::Entity",
        from = "Column::AdvisorId",
        to = "super::advisor::Column::Id"
    )]
    Advisor,
    /// Each redemption is for one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::advisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advisor.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
