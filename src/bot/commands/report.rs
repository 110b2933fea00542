//! Report Discord commands - `report` and its subcommands.
//!
//! Every report except `audit` is read-only. The advisor, product, rule and activity
//! views accept the same optional filters: a date range and an advisor.

use std::fmt::Write;

/// Discord rejects embed descriptions longer than this many characters.
const EMBED_DESCRIPTION_LIMIT: usize = 4096;
/// Rows listed per report before the rest are summarized.
const REPORT_ROW_LIMIT: usize = 25;
/// Room kept free for the "…and N more" line.
const OVERFLOW_RESERVE: usize = 32;

/// Joins report rows into an embed description of at most `max_chars` characters.
///
/// At most [`REPORT_ROW_LIMIT`] rows are listed; anything cut off is counted on a
/// closing "…and N more" line. An empty row set yields `empty`.
fn report_body(lines: &[String], empty: &str, max_chars: usize) -> String {
    if lines.is_empty() {
        return empty.to_string();
    }

    let budget = max_chars.saturating_sub(OVERFLOW_RESERVE);
    let mut body = String::new();
    let mut used = 0;
    let mut shown = 0;
    for line in lines.iter().take(REPORT_ROW_LIMIT) {
        let len = line.chars().count() + 1;
        if used + len > budget {
            break;
        }
        body.push_str(line);
        body.push('\n');
        used += len;
        shown += 1;
    }

    if shown < lines.len() {
        // Writing into a String cannot fail
        let _ = write!(body, "…and {} more", lines.len() - shown);
    }
    body
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, handlers::lookup, parse_optional_date},
        core::{
            ledger,
            report::{self, ReportFilter, format_points},
            sale::{self, SalesSummary, format_sale_amount},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    use super::{EMBED_DESCRIPTION_LIMIT, report_body};

    async fn build_filter(
        ctx: poise::Context<'_, BotData, Error>,
        from: Option<String>,
        to: Option<String>,
        advisor: Option<String>,
    ) -> Result<ReportFilter> {
        let advisor_id = match advisor {
            Some(name) => Some(lookup::require_advisor(ctx.data().db(), &name).await?.id),
            None => None,
        };
        Ok(ReportFilter {
            date_from: parse_optional_date(from.as_deref())?,
            date_to: parse_optional_date(to.as_deref())?,
            advisor_id,
        })
    }

    fn describe_filter(filter: &ReportFilter) -> String {
        match (filter.date_from, filter.date_to) {
            (None, None) => "All time".to_string(),
            (Some(from), None) => format!("From {from}"),
            (None, Some(to)) => format!("Until {to}"),
            (Some(from), Some(to)) => format!("{from} to {to}"),
        }
    }

    async fn send_lines(
        ctx: poise::Context<'_, BotData, Error>,
        title: &str,
        filter: Option<&ReportFilter>,
        body: String,
    ) -> Result<()> {
        let mut embed = serenity::CreateEmbed::default()
            .title(format!("**{title}**"))
            .color(0x0058_65F2)
            .description(body);
        if let Some(filter) = filter {
            embed = embed.footer(serenity::CreateEmbedFooter::new(describe_filter(filter)));
        }
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Parent command for program reports.
    #[poise::command(
        slash_command,
        subcommands(
            "report_summary",
            "report_advisors",
            "report_products",
            "report_rules",
            "report_activity",
            "report_audit"
        )
    )]
    pub async fn report(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Report command. Available subcommands:\n\
            `/report summary` - Program totals\n\
            `/report advisors` - Points earned and spent per advisor\n\
            `/report products` - Redemptions per product\n\
            `/report rules` - Awards per rule\n\
            `/report activity` - Latest awards and redemptions\n\
            `/report audit` - Check advisor balances against the transaction log";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows program-wide totals.
    #[poise::command(slash_command, rename = "summary")]
    pub async fn report_summary(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = ctx.data().db();
        let summary = report::generate_program_summary(db).await?;
        let sales = SalesSummary::of(&sale::get_all_sales(db).await?);

        let embed = serenity::CreateEmbed::default()
            .title("**Program Summary**")
            .color(0x0057_F287)
            .field("Advisors", summary.advisor_count.to_string(), true)
            .field("Active rules", summary.active_rule_count.to_string(), true)
            .field(
                "Products",
                format!(
                    "{} ({} redeemable)",
                    summary.product_count, summary.redeemable_product_count
                ),
                true,
            )
            .field(
                "Points awarded",
                format!(
                    "{} in {} awards",
                    format_points(summary.total_points_awarded),
                    summary.award_count
                ),
                true,
            )
            .field(
                "Points redeemed",
                format!(
                    "{} in {} redemptions",
                    format_points(summary.total_points_redeemed),
                    summary.redemption_count
                ),
                true,
            )
            .field(
                "Points available",
                format_points(summary.total_points_available),
                true,
            )
            .field(
                "Pending deliveries",
                summary.pending_redemption_count.to_string(),
                true,
            )
            .field(
                "Property sales",
                format!(
                    "{} worth {}",
                    sales.sale_count,
                    format_sale_amount(sales.total_amount)
                ),
                true,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Points earned and spent per advisor.
    #[poise::command(slash_command, rename = "advisors")]
    pub async fn report_advisors(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First day, YYYY-MM-DD"] from: Option<String>,
        #[description = "Last day, YYYY-MM-DD"] to: Option<String>,
        #[description = "Only this advisor"]
        #[autocomplete = "autocomplete::autocomplete_advisor_name"]
        advisor: Option<String>,
    ) -> Result<()> {
        let filter = build_filter(ctx, from, to, advisor).await?;
        let rows = report::generate_advisor_report(ctx.data().db(), &filter).await?;

        let lines: Vec<String> = rows
            .iter()
            .map(|row| {
                format!(
                    "**{}** · earned {} ({} awards) · spent {} ({} redemptions) · available {}",
                    row.name,
                    format_points(row.total_earned),
                    row.award_count,
                    format_points(row.total_spent),
                    row.redemption_count,
                    format_points(row.points_available),
                )
            })
            .collect();
        let body = report_body(&lines, "No advisors enrolled.", EMBED_DESCRIPTION_LIMIT);

        send_lines(ctx, "Advisor Report", Some(&filter), body).await
    }

    /// Redemption count and point volume per product, most redeemed first.
    #[poise::command(slash_command, rename = "products")]
    pub async fn report_products(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First day, YYYY-MM-DD"] from: Option<String>,
        #[description = "Last day, YYYY-MM-DD"] to: Option<String>,
        #[description = "Only this advisor"]
        #[autocomplete = "autocomplete::autocomplete_advisor_name"]
        advisor: Option<String>,
    ) -> Result<()> {
        let filter = build_filter(ctx, from, to, advisor).await?;
        let rows = report::generate_product_report(ctx.data().db(), &filter).await?;

        let lines: Vec<String> = rows
            .iter()
            .map(|row| {
                format!(
                    "**{}** ({} pts) · {} redemptions · {} points used",
                    row.title,
                    format_points(row.points_required),
                    row.redemption_count,
                    format_points(row.total_points_used),
                )
            })
            .collect();
        let body = report_body(&lines, "The catalog is empty.", EMBED_DESCRIPTION_LIMIT);

        send_lines(ctx, "Product Report", Some(&filter), body).await
    }

    /// Award count and point volume per rule, most used first.
    #[poise::command(slash_command, rename = "rules")]
    pub async fn report_rules(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First day, YYYY-MM-DD"] from: Option<String>,
        #[description = "Last day, YYYY-MM-DD"] to: Option<String>,
        #[description = "Only this advisor"]
        #[autocomplete = "autocomplete::autocomplete_advisor_name"]
        advisor: Option<String>,
    ) -> Result<()> {
        let filter = build_filter(ctx, from, to, advisor).await?;
        let rows = report::generate_rule_report(ctx.data().db(), &filter).await?;

        let lines: Vec<String> = rows
            .iter()
            .map(|row| {
                format!(
                    "{} **{}** · used {} times · {} points awarded",
                    row.icon,
                    row.name,
                    row.usage_count,
                    format_points(row.total_points_awarded),
                )
            })
            .collect();
        let body = report_body(&lines, "No rules defined.", EMBED_DESCRIPTION_LIMIT);

        send_lines(ctx, "Rule Report", Some(&filter), body).await
    }

    /// The latest awards and redemptions.
    #[poise::command(slash_command, rename = "activity")]
    pub async fn report_activity(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First day, YYYY-MM-DD"] from: Option<String>,
        #[description = "Last day, YYYY-MM-DD"] to: Option<String>,
        #[description = "Only this advisor"]
        #[autocomplete = "autocomplete::autocomplete_advisor_name"]
        advisor: Option<String>,
        #[description = "Entries per list (defaults to 10)"]
        #[min = 1]
        #[max = 25]
        limit: Option<u8>,
    ) -> Result<()> {
        let filter = build_filter(ctx, from, to, advisor).await?;
        let activity = report::generate_activity_report(
            ctx.data().db(),
            &filter,
            limit.map(usize::from),
        )
        .await?;

        // Each list gets half the description, minus its heading
        let section_limit = EMBED_DESCRIPTION_LIMIT / 2 - 20;
        let awards: Vec<String> = activity
            .awards
            .iter()
            .map(report::format_award_summary)
            .collect();
        let redemptions: Vec<String> = activity
            .redemptions
            .iter()
            .map(report::format_redemption_summary)
            .collect();

        let body = format!(
            "**Awards**\n{}\n\n**Redemptions**\n{}",
            report_body(&awards, "None", section_limit).trim_end(),
            report_body(&redemptions, "None", section_limit).trim_end(),
        );

        send_lines(ctx, "Recent Activity", Some(&filter), body).await
    }

    /// Checks every advisor's stored balance against the transaction log.
    #[poise::command(slash_command, rename = "audit")]
    pub async fn report_audit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Rewrite drifted balances from the log"] repair: Option<bool>,
    ) -> Result<()> {
        let store = &ctx.data().store;
        let policy = store.cancellation_policy();
        let drifts = ledger::audit_balances(store.db(), policy).await?;

        if drifts.is_empty() {
            ctx.say("✅ Every advisor balance matches the transaction log.")
                .await?;
            return Ok(());
        }

        let repair = repair.unwrap_or(false);
        let mut lines = Vec::with_capacity(drifts.len());
        for drift in &drifts {
            lines.push(format!(
                "**{}** · stored {} available, log says {}",
                drift.advisor_name,
                format_points(drift.stored.available),
                format_points(drift.expected.available),
            ));
            if repair {
                ledger::recalculate_advisor_balances(store.db(), drift.advisor_id, policy)
                    .await?;
            }
        }
        let mut body = report_body(&lines, "", EMBED_DESCRIPTION_LIMIT - 100);
        body.push('\n');
        body.push_str(if repair {
            "🔧 Balances were rebuilt from the log."
        } else {
            "Run `/report audit repair:True` to rebuild them from the log."
        });

        send_lines(ctx, "⚠️ Balance Audit", None, body).await
    }
}

// Re-export all commands
pub use inner::*;
