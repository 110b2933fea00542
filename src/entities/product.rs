//! Product entity - A catalog item advisors can redeem points for.
//!
//! Products carry a fixed point cost and an optional expiry date. Only active,
//! unexpired products can be redeemed; the cost is copied onto the redemption so
//! later price changes never rewrite history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title shown in the catalog (e.g., "Spa Day Voucher")
    #[sea_orm(unique)]
    pub title: String,
    /// Longer description of the reward
    pub description: String,
    /// Catalog grouping (e.g., "Technology", "Experiences")
    pub category: String,
    /// Optional picture of the reward
    pub image_url: Option<String>,
    /// Points needed to redeem one unit, always positive
    pub points_required: i64,
    /// Inactive products are hidden from redemption
    pub is_active: bool,
    /// Last day the product can be redeemed, if any
    pub expiry_date: Option<Date>,
    /// Soft delete flag - if true, product is hidden but data is preserved
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many redemptions
    #[sea_orm(has_many = "super::redemption::Entity")]
    Redemptions,
}

impl Related<super::redemption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Redemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the product is past its expiry date on `date`.
    ///
    /// A product is still valid on its expiry day itself.
    #[must_use]
    pub fn is_expired_on(&self, date: Date) -> bool {
        self.expiry_date.is_some_and(|expiry| date > expiry)
    }

    /// Whether the product can be redeemed on `date`.
    #[must_use]
    pub fn is_redeemable_on(&self, date: Date) -> bool {
        self.is_active && !self.is_deleted && !self.is_expired_on(date)
    }
}
