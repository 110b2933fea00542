//! Autocomplete handlers for Discord slash command parameters.
//!
//! Each handler loads the relevant catalog, keeps the entries whose name contains
//! what the administrator typed (case-insensitive) and returns at most 25 of them,
//! the Discord limit.

use crate::{
    bot::BotData,
    core::{advisor, product, rule},
    errors::Error,
};

/// Discord autocomplete limit.
const MAX_SUGGESTIONS: usize = 25;

/// Keeps the names containing `partial`, sorted, capped at the Discord limit.
fn matching_names(names: impl IntoIterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .collect();

    // Sort alphabetically for consistent UX
    matching.sort();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}

/// Suggests advisor names.
pub async fn autocomplete_advisor_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(advisors) = advisor::get_all_advisors(ctx.data().db()).await else {
        return Vec::new();
    };
    matching_names(advisors.into_iter().map(|a| a.name), partial)
}

/// Suggests rules that can currently award points.
pub async fn autocomplete_active_rule(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(rules) = rule::get_active_rules(ctx.data().db()).await else {
        return Vec::new();
    };
    matching_names(rules.into_iter().map(|r| r.name), partial)
}

/// Suggests every non-deleted rule, active or not, for catalog management.
pub async fn autocomplete_rule_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(rules) = rule::get_all_rules(ctx.data().db()).await else {
        return Vec::new();
    };
    matching_names(rules.into_iter().map(|r| r.name), partial)
}

/// Suggests products that can be redeemed today.
pub async fn autocomplete_redeemable_product(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(products) =
        product::get_redeemable_products(ctx.data().db(), crate::core::today()).await
    else {
        return Vec::new();
    };
    matching_names(products.into_iter().map(|p| p.title), partial)
}

/// Suggests every non-deleted product, for catalog management.
pub async fn autocomplete_product_title(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(products) = product::get_all_products(ctx.data().db()).await else {
        return Vec::new();
    };
    matching_names(products.into_iter().map(|p| p.title), partial)
}
