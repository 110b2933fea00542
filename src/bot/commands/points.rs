//! Ledger Discord commands - `award`, `redeem`, `redemption_status` and `redemptions`.
//!
//! These are the only commands that move points. Each one calls a single `core`
//! operation, which runs in its own store transaction.

use crate::entities::RedemptionStatus;

/// Redemption status as offered in the command picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum StatusChoice {
    /// Awaiting delivery
    #[name = "pending"]
    Pending,
    /// Handed to the advisor
    #[name = "delivered"]
    Delivered,
    /// Called off
    #[name = "cancelled"]
    Cancelled,
}

impl From<StatusChoice> for RedemptionStatus {
    fn from(choice: StatusChoice) -> Self {
        match choice {
            StatusChoice::Pending => Self::Pending,
            StatusChoice::Delivered => Self::Delivered,
            StatusChoice::Cancelled => Self::Cancelled,
        }
    }
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::StatusChoice;
    use crate::{
        bot::{
            BotData, acting_admin, handlers::autocomplete, handlers::lookup, parse_optional_date,
        },
        core::{
            award,
            ledger::CancellationPolicy,
            redemption,
            report::{format_points, format_status_badge},
        },
        entities::RedemptionStatus,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::info;

    /// Most redemptions listed in one reply.
    const LIST_LIMIT: usize = 20;

    /// Awards points to an advisor under an active rule.
    #[poise::command(slash_command)]
    pub async fn award(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Advisor earning the points"]
        #[autocomplete = "autocomplete::autocomplete_advisor_name"]
        advisor: String,
        #[description = "Rule that was triggered"]
        #[autocomplete = "autocomplete::autocomplete_active_rule"]
        rule: String,
        #[description = "Day of the event, YYYY-MM-DD (defaults to today)"] date: Option<String>,
        #[description = "Optional note, e.g. the property address"] comment: Option<String>,
    ) -> Result<()> {
        let db = ctx.data().db();
        let date = parse_optional_date(date.as_deref())?.unwrap_or_else(crate::core::today);
        let advisor = lookup::require_advisor(db, &advisor).await?;
        let rule = lookup::require_rule(db, &rule).await?;

        let entry = award::award_points(db, advisor.id, rule.id, date, comment).await?;
        info!(admin = %acting_admin(ctx), award_id = entry.id, "Award recorded from Discord");
        let balance = advisor.points_available + entry.points_awarded;

        ctx.say(format!(
            "✅ {} {} earned **{}** points for {} on {}. Available balance: **{}**.",
            rule.icon,
            advisor.name,
            format_points(entry.points_awarded),
            rule.name,
            entry.date,
            format_points(balance),
        ))
        .await?;
        Ok(())
    }

    /// Redeems a catalog product for an advisor.
    #[poise::command(slash_command)]
    pub async fn redeem(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Advisor spending the points"]
        #[autocomplete = "autocomplete::autocomplete_advisor_name"]
        advisor: String,
        #[description = "Product to redeem"]
        #[autocomplete = "autocomplete::autocomplete_redeemable_product"]
        product: String,
    ) -> Result<()> {
        let db = ctx.data().db();
        let advisor = lookup::require_advisor(db, &advisor).await?;
        let product = lookup::require_product(db, &product).await?;

        match redemption::redeem_product(db, advisor.id, product.id).await {
            Ok(entry) => {
                info!(
                    admin = %acting_admin(ctx),
                    redemption_id = entry.id,
                    "Redemption recorded from Discord"
                );
                ctx.say(format!(
                    "✅ Redemption #{} created: {} redeemed **{}** for {} points. Remaining balance: **{}**. Status: {}.",
                    entry.id,
                    advisor.name,
                    product.title,
                    format_points(entry.points_used),
                    format_points(advisor.points_available - entry.points_used),
                    format_status_badge(entry.status),
                ))
                .await?;
            }
            Err(Error::InsufficientPoints {
                available,
                required,
            }) => {
                ctx.say(format!(
                    "❌ {} has {} points available but **{}** costs {}. Short by **{}** points.",
                    advisor.name,
                    format_points(available),
                    product.title,
                    format_points(required),
                    format_points(required - available),
                ))
                .await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Moves a pending redemption to delivered or cancelled.
    #[poise::command(slash_command)]
    pub async fn redemption_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Redemption number, as shown by /redemptions"] id: i64,
        #[description = "New status"] status: StatusChoice,
    ) -> Result<()> {
        let store = &ctx.data().store;
        let policy = store.cancellation_policy();
        let updated =
            redemption::update_redemption_status(store.db(), id, status.into(), policy).await?;
        info!(
            admin = %acting_admin(ctx),
            redemption_id = id,
            status = %updated.status,
            "Redemption status changed from Discord"
        );

        let mut reply = format!(
            "✅ Redemption #{} is now {}.",
            updated.id,
            format_status_badge(updated.status)
        );
        if updated.status == RedemptionStatus::Cancelled {
            match policy {
                CancellationPolicy::Refund => write!(
                    reply,
                    " {} points were returned to the advisor.",
                    format_points(updated.points_used)
                )?,
                CancellationPolicy::Forfeit => write!(
                    reply,
                    " ⚠️ The {} points stay spent (cancellation policy: forfeit).",
                    format_points(updated.points_used)
                )?,
            }
        }

        ctx.say(reply).await?;
        Ok(())
    }

    /// Lists recent redemptions, optionally only those in one status.
    #[poise::command(slash_command)]
    pub async fn redemptions(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show redemptions in this status"] status: Option<StatusChoice>,
    ) -> Result<()> {
        let db = ctx.data().db();
        let entries = match status {
            Some(status) => redemption::get_redemptions_by_status(db, status.into()).await?,
            None => redemption::get_all_redemptions(db).await?,
        };

        if entries.is_empty() {
            ctx.say("No redemptions found.").await?;
            return Ok(());
        }

        let snapshot = crate::core::report::LedgerSnapshot::load(db).await?;
        let mut body = String::new();
        for entry in entries.iter().take(LIST_LIMIT) {
            writeln!(
                body,
                "**#{}** {} · {} · {} · {} pts · {}",
                entry.id,
                entry.date,
                snapshot.advisor_name(entry.advisor_id),
                snapshot.product_title(entry.product_id),
                format_points(entry.points_used),
                format_status_badge(entry.status),
            )?;
        }
        if entries.len() > LIST_LIMIT {
            writeln!(body, "…and {} more", entries.len() - LIST_LIMIT)?;
        }

        let embed = serenity::CreateEmbed::default()
            .title("**Redemptions**")
            .color(0x00FE_E75C)
            .description(body);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_choice_maps_to_status() {
        assert_eq!(
            RedemptionStatus::from(StatusChoice::Delivered),
            RedemptionStatus::Delivered
        );
        assert_eq!(
            RedemptionStatus::from(StatusChoice::Cancelled),
            RedemptionStatus::Cancelled
        );
        assert_eq!(
            RedemptionStatus::from(StatusChoice::Pending),
            RedemptionStatus::Pending
        );
    }
}
