//! Seed catalog loading from config.toml
//!
//! A fresh store starts empty. The catalog file describes the advisors, point rules
//! and products a session starts with, plus optional historical awards, redemptions
//! and property sales. Awards and redemptions are replayed through the normal ledger
//! operations, in that order, so every seeded balance is backed by the log. The
//! `[ledger]` table carries ledger settings.

use crate::{
    core::{advisor, award, ledger::LedgerSettings, product, redemption, rule, sale},
    entities::RedemptionStatus,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Ledger behavior settings
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Advisors enrolled at startup
    #[serde(default)]
    pub advisors: Vec<AdvisorConfig>,
    /// Point rules available at startup
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    /// Products in the catalog at startup
    #[serde(default)]
    pub products: Vec<ProductConfig>,
    /// Historical awards replayed after the catalog is created
    #[serde(default)]
    pub awards: Vec<AwardConfig>,
    /// Historical redemptions replayed after the awards
    #[serde(default)]
    pub redemptions: Vec<RedemptionConfig>,
    /// Property sales recorded in each advisor's sales log
    #[serde(default)]
    pub sales: Vec<SaleConfig>,
}

/// Configuration for a single advisor
#[derive(Debug, Deserialize, Clone)]
pub struct AdvisorConfig {
    /// Full name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Properties closed so far
    #[serde(default)]
    pub properties_sold: i32,
    /// Date the advisor joined, as `"YYYY-MM-DD"`
    pub join_date: NaiveDate,
}

/// Configuration for a single point rule
#[derive(Debug, Deserialize, Clone)]
pub struct RuleConfig {
    /// Rule name
    pub name: String,
    /// What earns the points
    #[serde(default)]
    pub description: String,
    /// Emoji shown next to the rule
    #[serde(default = "default_rule_icon")]
    pub icon: String,
    /// Points granted per award
    pub points_awarded: i64,
    /// Whether the rule can be used right away
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Configuration for a single product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Catalog title
    pub title: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Catalog grouping
    #[serde(default)]
    pub category: String,
    /// Optional picture
    pub image_url: Option<String>,
    /// Point cost
    pub points_required: i64,
    /// Whether the product can be redeemed right away
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Last redeemable day, as `"YYYY-MM-DD"`
    pub expiry_date: Option<NaiveDate>,
}

/// A historical award, referencing the advisor and rule by name
#[derive(Debug, Deserialize, Clone)]
pub struct AwardConfig {
    /// Advisor name
    pub advisor: String,
    /// Rule name
    pub rule: String,
    /// Day of the qualifying event, as `"YYYY-MM-DD"`
    pub date: NaiveDate,
    /// Optional note
    pub comment: Option<String>,
}

/// A historical redemption, referencing the advisor and product by name
#[derive(Debug, Deserialize, Clone)]
pub struct RedemptionConfig {
    /// Advisor name
    pub advisor: String,
    /// Product title
    pub product: String,
    /// Day of the redemption, as `"YYYY-MM-DD"`
    pub date: NaiveDate,
    /// Status to move the redemption to after it is made
    #[serde(default = "default_status")]
    pub status: RedemptionStatus,
}

/// A closed property sale, referencing the advisor by name
#[derive(Debug, Deserialize, Clone)]
pub struct SaleConfig {
    /// Advisor name
    pub advisor: String,
    /// Property address
    pub address: String,
    /// Day the sale closed, as `"YYYY-MM-DD"`
    pub date: NaiveDate,
    /// Sale price in whole currency units
    pub amount: i64,
    /// Points earned for the sale
    #[serde(default)]
    pub points_earned: i64,
}

const fn default_status() -> RedemptionStatus {
    RedemptionStatus::Pending
}

async fn require_advisor_named(
    db: &DatabaseConnection,
    name: &str,
) -> Result<crate::entities::AdvisorModel> {
    advisor::get_advisor_by_name(db, name)
        .await?
        .ok_or_else(|| Error::AdvisorNotFound {
            id: name.to_string(),
        })
}

fn default_rule_icon() -> String {
    rule::DEFAULT_ICON.to_string()
}

const fn default_true() -> bool {
    true
}

/// Loads the seed catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading catalog configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses a seed catalog from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the seed catalog named by `CATALOG_CONFIG`, or `./config.toml`
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}

/// Populates an empty store from the seed catalog.
///
/// Seeding is skipped when the store already has advisors, so reopening a file-backed
/// store does not duplicate the catalog or replay awards twice.
pub async fn seed_catalog(db: &DatabaseConnection, config: &Config) -> Result<()> {
    let existing = crate::entities::Advisor::find().count(db).await?;
    if existing > 0 {
        info!("Store already holds {existing} advisors, skipping catalog seed");
        return Ok(());
    }

    for entry in &config.advisors {
        advisor::create_advisor(
            db,
            entry.name.clone(),
            entry.email.clone(),
            entry.properties_sold,
            entry.join_date,
        )
        .await?;
    }

    for entry in &config.rules {
        rule::create_rule(
            db,
            entry.name.clone(),
            entry.description.clone(),
            entry.icon.clone(),
            entry.points_awarded,
            entry.is_active,
        )
        .await?;
    }

    for entry in &config.products {
        product::create_product(
            db,
            product::ProductDraft {
                title: entry.title.clone(),
                description: entry.description.clone(),
                category: entry.category.clone(),
                image_url: entry.image_url.clone(),
                points_required: entry.points_required,
                is_active: entry.is_active,
                expiry_date: entry.expiry_date,
            },
        )
        .await?;
    }

    for entry in &config.awards {
        let advisor = require_advisor_named(db, &entry.advisor).await?;
        let rule = rule::get_rule_by_name(db, &entry.rule)
            .await?
            .ok_or_else(|| Error::RuleNotFound {
                id: entry.rule.clone(),
            })?;
        award::award_points(db, advisor.id, rule.id, entry.date, entry.comment.clone()).await?;
    }

    for entry in &config.redemptions {
        let advisor = require_advisor_named(db, &entry.advisor).await?;
        let product = product::get_product_by_title(db, &entry.product)
            .await?
            .ok_or_else(|| Error::ProductNotFound {
                id: entry.product.clone(),
            })?;
        let made = redemption::redeem_product_on(db, advisor.id, product.id, entry.date).await?;
        if entry.status != RedemptionStatus::Pending {
            redemption::update_redemption_status(
                db,
                made.id,
                entry.status,
                config.ledger.cancellation_policy,
            )
            .await?;
        }
    }

    for entry in &config.sales {
        let advisor = require_advisor_named(db, &entry.advisor).await?;
        sale::record_property_sale(
            db,
            advisor.id,
            sale::SaleDraft {
                address: entry.address.clone(),
                sale_date: entry.date,
                sale_amount: entry.amount,
                points_earned: entry.points_earned,
            },
        )
        .await?;
    }

    info!(
        advisors = config.advisors.len(),
        rules = config.rules.len(),
        products = config.products.len(),
        awards = config.awards.len(),
        redemptions = config.redemptions.len(),
        sales = config.sales.len(),
        "Seeded ledger catalog"
    );
    Ok(())
}
