//! Entity module - Contains all SeaORM entity definitions for the ledger store.
//! Catalog entities (rules, products) and advisors are mutable; the two log
//! entities (point transactions, redemptions) are append-only apart from the
//! redemption status.
//! Property sales are a separate record of what each advisor closed.

pub mod advisor;
pub mod point_rule;
pub mod point_transaction;
pub mod product;
pub mod property_sale;
pub mod redemption;

// Re-export specific types to avoid conflicts
pub use advisor::{Column as AdvisorColumn, Entity as Advisor, Model as AdvisorModel};
pub use point_rule::{Column as PointRuleColumn, Entity as PointRule, Model as PointRuleModel};
pub use point_transaction::{
    Column as PointTransactionColumn, Entity as PointTransaction, Model as PointTransactionModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use property_sale::{
    Column as PropertySaleColumn, Entity as PropertySale, Model as PropertySaleModel,
};
pub use redemption::{
    Column as RedemptionColumn, Entity as Redemption, Model as RedemptionModel, RedemptionStatus,
};
