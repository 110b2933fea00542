//! Product Discord commands - `product_manage` and its subcommands.
//!
//! Products are the rewards advisors redeem points for. A product can be switched
//! off, given an expiry date, duplicated as a starting point for a similar reward,
//! or deleted; redemptions already made are never touched.

use crate::core::product::ProductFilter;

/// Which products `/product_manage list` shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ProductListChoice {
    /// Every product in the catalog
    #[name = "all"]
    All,
    /// Only products that are switched on
    #[name = "active"]
    Active,
    /// Only products that are switched off
    #[name = "inactive"]
    Inactive,
}

impl From<ProductListChoice> for ProductFilter {
    fn from(choice: ProductListChoice) -> Self {
        match choice {
            ProductListChoice::All => Self::All,
            ProductListChoice::Active => Self::Active,
            ProductListChoice::Inactive => Self::Inactive,
        }
    }
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::ProductListChoice;
    use crate::{
        bot::{BotData, handlers::autocomplete, handlers::lookup, parse_date, parse_optional_date},
        core::{
            product::{self, ProductDraft, ProductFilter, ProductUpdate},
            report::format_points,
        },
        entities::product as product_entity,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    fn availability(product: &product_entity::Model) -> String {
        let today = crate::core::today();
        match product.expiry_date {
            _ if !product.is_active => "⚪ Inactive".to_string(),
            Some(expiry) if product.is_expired_on(today) => format!("⌛ Expired {expiry}"),
            Some(expiry) => format!("🟢 Active until {expiry}"),
            None => "🟢 Active".to_string(),
        }
    }

    /// Parent command for managing the rewards catalog.
    #[poise::command(
        slash_command,
        subcommands(
            "product_add",
            "product_list",
            "product_update",
            "product_toggle",
            "product_duplicate",
            "product_delete"
        )
    )]
    pub async fn product_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Product management command. Available subcommands:\n\
            `/product_manage add` - Add a new product\n\
            `/product_manage list` - List products\n\
            `/product_manage update` - Change a product's details or cost\n\
            `/product_manage toggle` - Activate or deactivate a product\n\
            `/product_manage duplicate` - Copy a product under a new title\n\
            `/product_manage delete` - Delete a product (its redemptions are kept)";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a new product to the rewards catalog.
    #[poise::command(slash_command, rename = "add")]
    pub async fn product_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Unique product title (e.g., 'Spa Day Voucher')"] title: String,
        #[description = "Points needed to redeem it"] points: i64,
        #[description = "Catalog category (e.g., 'Technology')"] category: Option<String>,
        #[description = "What the advisor receives"] description: Option<String>,
        #[description = "Last redeemable day, YYYY-MM-DD"] expiry_date: Option<String>,
        #[description = "Picture URL"] image_url: Option<String>,
        #[description = "Start inactive (defaults to active)"] inactive: Option<bool>,
    ) -> Result<()> {
        let expiry_date = parse_optional_date(expiry_date.as_deref())?;

        let product = product::create_product(
            ctx.data().db(),
            ProductDraft {
                title,
                description: description.unwrap_or_default(),
                category: category.unwrap_or_default(),
                image_url,
                points_required: points,
                is_active: !inactive.unwrap_or(false),
                expiry_date,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Product '{}' added for **{}** points. {}",
            product.title,
            format_points(product.points_required),
            availability(&product),
        ))
        .await?;
        Ok(())
    }

    /// Lists catalog products with their cost and availability.
    #[poise::command(slash_command, rename = "list")]
    pub async fn product_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Which products to show (defaults to all)"] show: Option<
            ProductListChoice,
        >,
    ) -> Result<()> {
        let filter = show.map_or(ProductFilter::All, Into::into);
        let products = product::list_products(ctx.data().db(), filter).await?;

        if products.is_empty() {
            ctx.say("No products found. Use `/product_manage add` to create some!")
                .await?;
            return Ok(());
        }

        let embed_fields: Vec<(String, String, bool)> = products
            .iter()
            .take(25)
            .map(|p| {
                let category = if p.category.is_empty() {
                    String::new()
                } else {
                    format!(" · {}", p.category)
                };
                (
                    format!("{} ({} pts)", p.title, format_points(p.points_required)),
                    format!("{}{category}", availability(p)),
                    false,
                )
            })
            .collect();

        let list_embed = serenity::CreateEmbed::default()
            .title("**Rewards Catalog**")
            .color(0x0058_65F2)
            .fields(embed_fields);

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }

    /// Updates a product. Redemptions already made keep their cost.
    #[poise::command(slash_command, rename = "update")]
    pub async fn product_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to update"]
        #[autocomplete = "autocomplete::autocomplete_product_title"]
        title: String,
        #[description = "New title"] new_title: Option<String>,
        #[description = "New point cost"] points: Option<i64>,
        #[description = "New category"] category: Option<String>,
        #[description = "New description"] description: Option<String>,
        #[description = "New last redeemable day, YYYY-MM-DD"] expiry_date: Option<String>,
        #[description = "New picture URL"] image_url: Option<String>,
        #[description = "Remove the expiry date so the product never expires"]
        clear_expiry: Option<bool>,
    ) -> Result<()> {
        let db = ctx.data().db();
        let expiry_date = if clear_expiry.unwrap_or(false) {
            Some(None)
        } else {
            expiry_date.as_deref().map(parse_date).transpose()?.map(Some)
        };
        let product = lookup::require_product(db, &title).await?;

        let updated = product::update_product(
            db,
            product.id,
            ProductUpdate {
                title: new_title,
                description,
                category,
                image_url,
                points_required: points,
                expiry_date,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Product '{}' updated: '{}' for **{}** points. {}",
            product.title,
            updated.title,
            format_points(updated.points_required),
            availability(&updated),
        ))
        .await?;
        Ok(())
    }

    /// Activates an inactive product or deactivates an active one.
    #[poise::command(slash_command, rename = "toggle")]
    pub async fn product_toggle(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to toggle"]
        #[autocomplete = "autocomplete::autocomplete_product_title"]
        title: String,
    ) -> Result<()> {
        let db = ctx.data().db();
        let product = lookup::require_product(db, &title).await?;
        let product = product::toggle_product_active(db, product.id).await?;

        ctx.say(format!(
            "✅ Product '{}' is now {}.",
            product.title,
            availability(&product)
        ))
        .await?;
        Ok(())
    }

    /// Copies a product under a new title, e.g. "Spa Day Voucher (Copy)".
    #[poise::command(slash_command, rename = "duplicate")]
    pub async fn product_duplicate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to copy"]
        #[autocomplete = "autocomplete::autocomplete_product_title"]
        title: String,
    ) -> Result<()> {
        let db = ctx.data().db();
        let product = lookup::require_product(db, &title).await?;
        let copy = product::duplicate_product(db, product.id).await?;

        ctx.say(format!(
            "✅ Product '{}' duplicated as '{}'. Use `/product_manage update` to adjust it.",
            product.title, copy.title
        ))
        .await?;
        Ok(())
    }

    /// Deletes a product. Its redemptions stay in the log.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn product_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to delete"]
        #[autocomplete = "autocomplete::autocomplete_product_title"]
        title: String,
    ) -> Result<()> {
        let db = ctx.data().db();
        let product = lookup::require_product(db, &title).await?;
        product::delete_product(db, product.id).await?;

        ctx.say(format!("✅ Product '{}' has been deleted.", product.title))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
