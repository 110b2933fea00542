//! Resolving the names typed into slash commands.
//!
//! Autocomplete suggests exact names, but an administrator can still type anything,
//! so each lookup turns a miss into the `NotFound` error `on_error` answers inline.

use crate::{
    core::{advisor, product, rule},
    entities::{advisor as advisor_entity, point_rule, product as product_entity},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;

/// Finds an advisor by exact name.
pub async fn require_advisor(db: &DatabaseConnection, name: &str) -> Result<advisor_entity::Model> {
    advisor::get_advisor_by_name(db, name)
        .await?
        .ok_or_else(|| Error::AdvisorNotFound {
            id: name.to_string(),
        })
}

/// Finds a non-deleted rule by exact name.
pub async fn require_rule(db: &DatabaseConnection, name: &str) -> Result<point_rule::Model> {
    rule::get_rule_by_name(db, name)
        .await?
        .ok_or_else(|| Error::RuleNotFound {
            id: name.to_string(),
        })
}

/// Finds a non-deleted product by exact title.
pub async fn require_product(
    db: &DatabaseConnection,
    title: &str,
) -> Result<product_entity::Model> {
    product::get_product_by_title(db, title)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: title.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_lookups_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        let advisor = create_test_advisor(&db, "Test Advisor").await?;
        let rule = create_test_rule(&db, "Closed Sale", 500).await?;
        let product = create_test_product(&db, "AirPods Pro", 1200).await?;

        assert_eq!(require_advisor(&db, "Test Advisor").await?.id, advisor.id);
        assert_eq!(require_rule(&db, " Closed Sale ").await?.id, rule.id);
        assert_eq!(require_product(&db, "AirPods Pro").await?.id, product.id);

        assert!(matches!(
            require_advisor(&db, "Nobody").await,
            Err(Error::AdvisorNotFound { id }) if id == "Nobody"
        ));
        assert!(matches!(
            require_rule(&db, "Open House").await,
            Err(Error::RuleNotFound { .. })
        ));
        assert!(matches!(
            require_product(&db, "Yacht").await,
            Err(Error::ProductNotFound { .. })
        ));

        Ok(())
    }
}
