//! Product business logic - The catalog of rewards advisors can redeem.
//!
//! This module provides functions for creating, retrieving, updating, duplicating and
//! retiring products. Products are soft deleted so redemptions keep pointing at a real
//! row. Whether a product can be redeemed depends on its active flag and on its expiry
//! date relative to the redemption day.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Suffix appended to the title of a duplicated product.
pub const COPY_SUFFIX: &str = "(Copy)";

/// Everything needed to create a product.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    /// Catalog title, must be unique
    pub title: String,
    /// Longer description
    pub description: String,
    /// Catalog grouping
    pub category: String,
    /// Optional picture
    pub image_url: Option<String>,
    /// Point cost, must be positive
    pub points_required: i64,
    /// Whether the product can be redeemed right away
    pub is_active: bool,
    /// Last redeemable day
    pub expiry_date: Option<Date>,
}

/// Fields to change on an existing product. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New category
    pub category: Option<String>,
    /// New picture
    pub image_url: Option<String>,
    /// New point cost; only affects future redemptions
    pub points_required: Option<i64>,
    /// New expiry date; `Some(None)` removes the expiry
    pub expiry_date: Option<Option<Date>>,
}

/// Which products a listing should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductFilter {
    /// Every non-deleted product
    #[default]
    All,
    /// Only active products
    Active,
    /// Only inactive products
    Inactive,
}

/// Retrieves all non-deleted products, ordered alphabetically by title.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    list_products(db, ProductFilter::All).await
}

/// Retrieves non-deleted products matching `filter`, ordered by title.
pub async fn list_products(
    db: &DatabaseConnection,
    filter: ProductFilter,
) -> Result<Vec<product::Model>> {
    let query = Product::find().filter(product::Column::IsDeleted.eq(false));
    let query = match filter {
        ProductFilter::All => query,
        ProductFilter::Active => query.filter(product::Column::IsActive.eq(true)),
        ProductFilter::Inactive => query.filter(product::Column::IsActive.eq(false)),
    };

    query
        .order_by_asc(product::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the products that can be redeemed on `date`.
pub async fn get_redeemable_products(
    db: &DatabaseConnection,
    date: Date,
) -> Result<Vec<product::Model>> {
    Ok(list_products(db, ProductFilter::Active)
        .await?
        .into_iter()
        .filter(|p| p.is_redeemable_on(date))
        .collect())
}

/// Finds a non-deleted product by its title.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_title(
    db: &DatabaseConnection,
    title: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Title.eq(title.trim()))
        .filter(product::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID, including deleted ones.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_points(points: i64) -> Result<()> {
    if points <= 0 {
        return Err(Error::InvalidPoints { points });
    }
    Ok(())
}

fn clean_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

/// Creates a new product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The title is empty or whitespace-only
/// - The point cost is not positive
/// - The database insert fails (for example, the title is taken)
pub async fn create_product(
    db: &DatabaseConnection,
    draft: ProductDraft,
) -> Result<product::Model> {
    if draft.title.trim().is_empty() {
        return Err(Error::MissingField {
            field: "Product title",
        });
    }
    validate_points(draft.points_required)?;

    let now = chrono::Utc::now().naive_utc();

    let product = product::ActiveModel {
        title: Set(draft.title.trim().to_string()),
        description: Set(draft.description.trim().to_string()),
        category: Set(draft.category.trim().to_string()),
        image_url: Set(clean_url(draft.image_url)),
        points_required: Set(draft.points_required),
        is_active: Set(draft.is_active),
        expiry_date: Set(draft.expiry_date),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    info!(product_id = product.id, title = %product.title, points = product.points_required, "Created product");
    Ok(product)
}

async fn find_live_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    get_product_by_id(db, product_id)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })
}

/// Updates an existing product, performing input validation.
///
/// Changing `points_required` never touches redemptions already made.
///
/// # Errors
/// Returns an error if:
/// - A new title is blank or a new cost is not positive
/// - The product does not exist or is already deleted
/// - The database update operation fails
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    changes: ProductUpdate,
) -> Result<product::Model> {
    if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(Error::MissingField {
            field: "Product title",
        });
    }
    if let Some(points) = changes.points_required {
        validate_points(points)?;
    }

    let mut product: product::ActiveModel = find_live_product(db, product_id).await?.into();

    if let Some(title) = changes.title {
        product.title = Set(title.trim().to_string());
    }
    if let Some(description) = changes.description {
        product.description = Set(description.trim().to_string());
    }
    if let Some(category) = changes.category {
        product.category = Set(category.trim().to_string());
    }
    if changes.image_url.is_some() {
        product.image_url = Set(clean_url(changes.image_url));
    }
    if let Some(points) = changes.points_required {
        product.points_required = Set(points);
    }
    if let Some(expiry) = changes.expiry_date {
        product.expiry_date = Set(expiry);
    }
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Sets whether a product can be redeemed.
pub async fn set_product_active(
    db: &DatabaseConnection,
    product_id: i64,
    is_active: bool,
) -> Result<product::Model> {
    let mut product: product::ActiveModel = find_live_product(db, product_id).await?.into();
    product.is_active = Set(is_active);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    let product = product.update(db).await?;
    info!(product_id = product.id, is_active, "Changed product status");
    Ok(product)
}

/// Flips a product between active and inactive.
pub async fn toggle_product_active(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<product::Model> {
    let product = find_live_product(db, product_id).await?;
    set_product_active(db, product_id, !product.is_active).await
}

/// Builds the title for a copy of `title`, given the titles already in use.
///
/// The first copy is `"<title> (Copy)"`; later ones are numbered
/// `"<title> (Copy 2)"`, `"<title> (Copy 3)"` and so on.
#[must_use]
pub fn duplicate_title(title: &str, taken: &[String]) -> String {
    let first = format!("{title} {COPY_SUFFIX}");
    if !taken.contains(&first) {
        return first;
    }

    (2..)
        .map(|n| format!("{title} (Copy {n})"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(first)
}

/// Creates a new product with the same fields as `product_id` and a copy title.
///
/// The duplicate is a new identity: it has no redemptions, and editing it leaves the
/// original untouched.
pub async fn duplicate_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<product::Model> {
    let original = find_live_product(db, product_id).await?;

    // Deleted products still hold their titles
    let taken: Vec<String> = Product::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.title)
        .collect();

    create_product(
        db,
        ProductDraft {
            title: duplicate_title(&original.title, &taken),
            description: original.description,
            category: original.category,
            image_url: original.image_url,
            points_required: original.points_required,
            is_active: original.is_active,
            expiry_date: original.expiry_date,
        },
    )
    .await
}

/// Soft deletes a product by marking it as deleted, preserving redemption history.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist or is already deleted
/// - The database update operation fails
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let mut product: product::ActiveModel = find_live_product(db, product_id).await?.into();

    product.is_deleted = Set(true);
    product.is_active = Set(false);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    let product = product.update(db).await?;
    info!(product_id = product.id, title = %product.title, "Deleted product");
    Ok(product)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut draft = test_draft("   ", 100);
        let result = create_product(&db, draft.clone()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::MissingField {
                field: "Product title"
            }
        ));

        draft.title = "AirPods Pro".to_string();
        draft.points_required = 0;
        let result = create_product(&db, draft.clone()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidPoints { points: 0 }
        ));

        draft.points_required = -1200;
        let result = create_product(&db, draft).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidPoints { points: -1200 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let mut draft = test_draft(" Spa Day Voucher ", 1500);
        draft.image_url = Some("  ".to_string());
        draft.expiry_date = Some(date(2030, 12, 31));
        let product = create_product(&db, draft).await?;

        assert_eq!(product.title, "Spa Day Voucher");
        assert_eq!(product.points_required, 1500);
        assert_eq!(product.image_url, None);
        assert_eq!(product.expiry_date, Some(date(2030, 12, 31)));
        assert!(product.is_active);
        assert!(!product.is_deleted);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_filters() -> Result<()> {
        let db = setup_test_db().await?;

        let airpods = create_test_product(&db, "AirPods Pro", 1200).await?;
        let dinner = create_test_product(&db, "Dinner for Two", 2000).await?;
        let dinner = set_product_active(&db, dinner.id, false).await?;
        let retired = create_test_product(&db, "Old Voucher", 300).await?;
        delete_product(&db, retired.id).await?;

        assert_eq!(
            list_products(&db, ProductFilter::All).await?,
            vec![airpods.clone(), dinner.clone()]
        );
        assert_eq!(
            list_products(&db, ProductFilter::Active).await?,
            vec![airpods]
        );
        assert_eq!(
            list_products(&db, ProductFilter::Inactive).await?,
            vec![dinner]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_redeemable_products_respect_expiry() -> Result<()> {
        let db = setup_test_db().await?;

        let mut draft = test_draft("Concert Tickets", 800);
        draft.expiry_date = Some(date(2024, 6, 30));
        let concert = create_product(&db, draft).await?;
        let phone = create_test_product(&db, "iPhone 15 Pro", 5000).await?;

        // Still valid on the expiry day itself
        let on_expiry = get_redeemable_products(&db, date(2024, 6, 30)).await?;
        assert_eq!(on_expiry, vec![concert.clone(), phone.clone()]);

        let after = get_redeemable_products(&db, date(2024, 7, 1)).await?;
        assert_eq!(after, vec![phone]);
        assert!(concert.is_expired_on(date(2024, 7, 1)));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "MacBook Air M3", 8000).await?;

        let updated = update_product(
            &db,
            product.id,
            ProductUpdate {
                points_required: Some(7500),
                category: Some("Technology".to_string()),
                expiry_date: Some(Some(date(2031, 1, 31))),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.title, "MacBook Air M3");
        assert_eq!(updated.points_required, 7500);
        assert_eq!(updated.category, "Technology");
        assert_eq!(updated.expiry_date, Some(date(2031, 1, 31)));

        let result = update_product(
            &db,
            product.id,
            ProductUpdate {
                points_required: Some(0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidPoints { points: 0 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_clears_expiry() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_product(
            &db,
            ProductDraft {
                expiry_date: Some(date(2024, 6, 30)),
                ..test_draft("Spa Day Voucher", 1500)
            },
        )
        .await?;
        assert!(!product.is_redeemable_on(date(2024, 7, 1)));

        // Leaving the field out keeps the expiry
        let kept = update_product(
            &db,
            product.id,
            ProductUpdate {
                points_required: Some(1400),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(kept.expiry_date, Some(date(2024, 6, 30)));

        let cleared = update_product(
            &db,
            product.id,
            ProductUpdate {
                expiry_date: Some(None),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(cleared.expiry_date, None);
        assert!(cleared.is_redeemable_on(date(2024, 7, 1)));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_deleted_product() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Dinner for Two", 2000).await?;
        delete_product(&db, product.id).await?;

        let result = update_product(&db, product.id, ProductUpdate::default()).await;
        assert!(matches!(result, Err(Error::ProductNotFound { id: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_product_active() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "AirPods Pro", 1200).await?;

        assert!(!toggle_product_active(&db, product.id).await?.is_active);
        assert!(toggle_product_active(&db, product.id).await?.is_active);

        Ok(())
    }

    #[test]
    fn test_duplicate_title_numbering() {
        let taken = vec![
            "AirPods Pro".to_string(),
            "AirPods Pro (Copy)".to_string(),
            "AirPods Pro (Copy 2)".to_string(),
        ];

        assert_eq!(duplicate_title("Spa Day", &taken), "Spa Day (Copy)");
        assert_eq!(duplicate_title("AirPods Pro", &taken), "AirPods Pro (Copy 3)");
    }

    #[tokio::test]
    async fn test_duplicate_product_copies_fields() -> Result<()> {
        let db = setup_test_db().await?;

        let mut draft = test_draft("Spa Day Voucher", 1500);
        draft.description = "A full day at a luxury spa".to_string();
        draft.category = "Experiences".to_string();
        draft.expiry_date = Some(date(2030, 12, 31));
        let original = create_product(&db, draft).await?;

        let copy = duplicate_product(&db, original.id).await?;
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.title, "Spa Day Voucher (Copy)");
        assert_eq!(copy.description, original.description);
        assert_eq!(copy.category, original.category);
        assert_eq!(copy.points_required, original.points_required);
        assert_eq!(copy.expiry_date, original.expiry_date);

        let second = duplicate_product(&db, original.id).await?;
        assert_eq!(second.title, "Spa Day Voucher (Copy 2)");

        // The original is untouched
        let stored = get_product_by_id(&db, original.id).await?.unwrap();
        assert_eq!(stored, original);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_is_soft() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "AirPods Pro", 1200).await?;

        let deleted = delete_product(&db, product.id).await?;
        assert!(deleted.is_deleted);
        assert!(!deleted.is_redeemable_on(date(2024, 1, 1)));

        assert!(get_product_by_title(&db, "AirPods Pro").await?.is_none());
        assert!(get_product_by_id(&db, product.id).await?.is_some());

        Ok(())
    }
}
