//! Store configuration for the rewards ledger.
//!
//! The ledger lives in an in-memory `SQLite` database reached through `SeaORM`. Tables
//! are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. `DATABASE_URL` can point the store
//! at a file instead, which is handy when inspecting a session after the fact.

use crate::entities::{
    Advisor, PointRule, PointTransaction, Product, PropertySale, Redemption,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Store URL used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// Gets the store URL from the environment or returns the in-memory default.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Connects to the store at `database_url`.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    tracing::debug!("Connecting to ledger store at {database_url}");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates every ledger table from the entity definitions.
///
/// Catalog and advisor tables are created before the log tables so their
/// foreign keys have something to point at.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut advisor_table = schema.create_table_from_entity(Advisor);
    let mut rule_table = schema.create_table_from_entity(PointRule);
    let mut product_table = schema.create_table_from_entity(Product);
    let mut award_table = schema.create_table_from_entity(PointTransaction);
    let mut redemption_table = schema.create_table_from_entity(Redemption);
    let mut sale_table = schema.create_table_from_entity(PropertySale);

    for table in [
        &mut advisor_table,
        &mut rule_table,
        &mut product_table,
        &mut award_table,
        &mut redemption_table,
        &mut sale_table,
    ] {
        table.if_not_exists();
    }

    db.execute(builder.build(&advisor_table)).await?;
    db.execute(builder.build(&rule_table)).await?;
    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&award_table)).await?;
    db.execute(builder.build(&redemption_table)).await?;
    db.execute(builder.build(&sale_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        AdvisorModel, PointRuleModel, PointTransactionModel, ProductModel, PropertySaleModel,
        RedemptionModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = connect(DEFAULT_DATABASE_URL).await?;
        create_tables(&db).await?;

        // Every table exists and is queryable
        let _: Vec<AdvisorModel> = Advisor::find().limit(1).all(&db).await?;
        let _: Vec<PointRuleModel> = PointRule::find().limit(1).all(&db).await?;
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<PointTransactionModel> = PointTransaction::find().limit(1).all(&db).await?;
        let _: Vec<RedemptionModel> = Redemption::find().limit(1).all(&db).await?;
        let _: Vec<PropertySaleModel> = PropertySale::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = connect(DEFAULT_DATABASE_URL).await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
