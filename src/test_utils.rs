//! Shared test utilities for the rewards ledger.
//!
//! Helpers for setting up an in-memory store and creating advisors, rules and
//! products with sensible defaults.

use crate::{
    core::{advisor, award, product, rule},
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date in tests.
///
/// # Panics
/// Panics on an impossible date.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a test advisor with sensible defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `name` - Advisor name
///
/// # Defaults
/// * `email`: "test.advisor@realty.example"
/// * `properties_sold`: 0
/// * `join_date`: 2023-01-01
pub async fn create_test_advisor(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::advisor::Model> {
    create_custom_advisor(
        db,
        name,
        "test.advisor@realty.example",
        0,
        date(2023, 1, 1),
    )
    .await
}

/// Creates a test advisor with custom parameters.
pub async fn create_custom_advisor(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    properties_sold: i32,
    join_date: NaiveDate,
) -> Result<entities::advisor::Model> {
    advisor::create_advisor(
        db,
        name.to_string(),
        email.to_string(),
        properties_sold,
        join_date,
    )
    .await
}

/// Creates an active rule with the given name and award value.
pub async fn create_test_rule(
    db: &DatabaseConnection,
    name: &str,
    points: i64,
) -> Result<entities::point_rule::Model> {
    rule::create_rule(
        db,
        name.to_string(),
        format!("{name} (test rule)"),
        rule::DEFAULT_ICON.to_string(),
        points,
        true,
    )
    .await
}

/// Product draft with sensible defaults: active, no expiry, category "Test".
#[must_use]
pub fn test_draft(title: &str, points: i64) -> product::ProductDraft {
    product::ProductDraft {
        title: title.to_string(),
        description: format!("{title} (test product)"),
        category: "Test".to_string(),
        image_url: None,
        points_required: points,
        is_active: true,
        expiry_date: None,
    }
}

/// Creates an active, non-expiring product with the given title and cost.
pub async fn create_test_product(
    db: &DatabaseConnection,
    title: &str,
    points: i64,
) -> Result<entities::product::Model> {
    product::create_product(db, test_draft(title, points)).await
}

/// Sets up a store with one advisor and one active rule worth `points`.
/// Returns (db, advisor, rule).
pub async fn setup_with_rule(
    points: i64,
) -> Result<(
    DatabaseConnection,
    entities::advisor::Model,
    entities::point_rule::Model,
)> {
    let db = setup_test_db().await?;
    let advisor = create_test_advisor(&db, "Test Advisor").await?;
    let rule = create_test_rule(&db, "Test Rule", points).await?;
    Ok((db, advisor, rule))
}

/// Sets up a store with one advisor holding `points` available, earned through a
/// single award so the balance is backed by the log. Returns (db, advisor).
pub async fn setup_with_points(
    points: i64,
) -> Result<(DatabaseConnection, entities::advisor::Model)> {
    let (db, advisor, rule) = setup_with_rule(points).await?;
    award::award_points(&db, advisor.id, rule.id, date(2024, 1, 1), None).await?;
    let advisor = advisor::get_advisor_by_id(&db, advisor.id)
        .await?
        .ok_or_else(|| crate::errors::Error::AdvisorNotFound {
            id: advisor.id.to_string(),
        })?;
    Ok((db, advisor))
}
