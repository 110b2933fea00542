//! Advisor Discord commands - `advisors`, `advisor` and `sale`.
//!
//! Views of the people enrolled in the program, their balances and sales log, plus
//! recording a closed sale.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, handlers::lookup, parse_optional_date},
        core::{
            advisor,
            report::{self, ReportFilter, format_points},
            sale::{self, SaleDraft, SalesSummary, format_sale_amount},
            today,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Number of awards and redemptions shown on an advisor's card.
    const HISTORY_LIMIT: usize = 5;

    /// Lists advisors with their balances, optionally filtered by name or email.
    #[poise::command(slash_command)]
    pub async fn advisors(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part of a name or email to search for"] search: Option<String>,
    ) -> Result<()> {
        let advisors =
            advisor::search_advisors(ctx.data().db(), search.as_deref().unwrap_or_default())
                .await?;

        if advisors.is_empty() {
            ctx.say("No advisors match that search.").await?;
            return Ok(());
        }

        let mut body = String::new();
        for a in &advisors {
            writeln!(
                body,
                "**{}** · {} available ({} earned, {} redeemed)",
                a.name,
                format_points(a.points_available),
                format_points(a.points_accumulated),
                format_points(a.points_redeemed),
            )?;
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("**Advisors ({})**", advisors.len()))
            .color(0x0058_65F2)
            .description(body);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows one advisor's balances and most recent awards and redemptions.
    #[poise::command(slash_command)]
    pub async fn advisor(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Advisor name"]
        #[autocomplete = "autocomplete::autocomplete_advisor_name"]
        name: String,
    ) -> Result<()> {
        let db = ctx.data().db();
        let advisor = lookup::require_advisor(db, &name).await?;

        let filter = ReportFilter {
            advisor_id: Some(advisor.id),
            ..Default::default()
        };
        let activity = report::generate_activity_report(db, &filter, Some(HISTORY_LIMIT)).await?;

        let mut awards = String::new();
        for entry in &activity.awards {
            writeln!(awards, "{}", report::format_award_summary(entry))?;
        }
        if awards.is_empty() {
            awards.push_str("No awards yet");
        }

        let mut redemptions = String::new();
        for entry in &activity.redemptions {
            writeln!(redemptions, "{}", report::format_redemption_summary(entry))?;
        }
        if redemptions.is_empty() {
            redemptions.push_str("No redemptions yet");
        }

        let sales_log = sale::get_sales_for_advisor(db, advisor.id).await?;
        let totals = SalesSummary::of(&sales_log);
        let mut sales = format!(
            "{} recorded · {} total\n",
            totals.sale_count,
            format_sale_amount(totals.total_amount)
        );
        for entry in sales_log.iter().take(HISTORY_LIMIT) {
            writeln!(
                sales,
                "{} | {} | {}",
                entry.sale_date,
                entry.address,
                format_sale_amount(entry.sale_amount),
            )?;
        }
        if sales_log.len() > HISTORY_LIMIT {
            writeln!(sales, "…and {} more", sales_log.len() - HISTORY_LIMIT)?;
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{}**", advisor.name))
            .description(format!(
                "{} · {} properties sold · joined {}",
                advisor.email, advisor.properties_sold, advisor.join_date
            ))
            .color(0x0057_F287)
            .field("Available", format_points(advisor.points_available), true)
            .field("Earned", format_points(advisor.points_accumulated), true)
            .field("Redeemed", format_points(advisor.points_redeemed), true)
            .field("Recent awards", awards, false)
            .field("Recent redemptions", redemptions, false)
            .field("Property sales", sales, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Records a closed property sale in an advisor's sales log.
    #[poise::command(slash_command)]
    pub async fn sale(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Advisor who closed the sale"]
        #[autocomplete = "autocomplete::autocomplete_advisor_name"]
        advisor: String,
        #[description = "Property address"] address: String,
        #[description = "Sale price"] amount: i64,
        #[description = "Day the sale closed, YYYY-MM-DD (defaults to today)"]
        date: Option<String>,
        #[description = "Points the advisor earned for it"] points: Option<i64>,
    ) -> Result<()> {
        let db = ctx.data().db();
        let sale_date = parse_optional_date(date.as_deref())?.unwrap_or_else(today);
        let advisor = lookup::require_advisor(db, &advisor).await?;

        let recorded = sale::record_property_sale(
            db,
            advisor.id,
            SaleDraft {
                address,
                sale_date,
                sale_amount: amount,
                points_earned: points.unwrap_or_default(),
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Recorded sale of {} for **{}** on {} ({}).",
            recorded.address,
            advisor.name,
            recorded.sale_date,
            format_sale_amount(recorded.sale_amount),
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
