//! Point rule Discord commands - `rule_manage` and its subcommands.
//!
//! Rules define which events earn points and how many. Editing a rule's value
//! only affects awards made afterwards.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, handlers::lookup},
        core::{
            award,
            report::{LedgerSnapshot, format_points},
            rule::{self, RuleUpdate},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Awards listed by `rule_manage history`.
    const HISTORY_LIMIT: usize = 15;

    /// Parent command for managing point rules.
    #[poise::command(
        slash_command,
        subcommands(
            "rule_add",
            "rule_list",
            "rule_history",
            "rule_update",
            "rule_toggle",
            "rule_delete"
        )
    )]
    pub async fn rule_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Rule management command. Available subcommands:\n\
            `/rule_manage add` - Add a new point rule\n\
            `/rule_manage list` - List all rules\n\
            `/rule_manage history` - Latest awards made under a rule\n\
            `/rule_manage update` - Change a rule's name, description, icon or points\n\
            `/rule_manage toggle` - Activate or deactivate a rule\n\
            `/rule_manage delete` - Delete a rule (its awards are kept)";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a new point rule.
    #[poise::command(slash_command, rename = "add")]
    pub async fn rule_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Unique rule name (e.g., 'Closed Sale')"] name: String,
        #[description = "Points awarded each time the rule fires"] points: i64,
        #[description = "What the rule rewards"] description: Option<String>,
        #[description = "Emoji shown next to the rule"] icon: Option<String>,
        #[description = "Start inactive (defaults to active)"] inactive: Option<bool>,
    ) -> Result<()> {
        let rule = rule::create_rule(
            ctx.data().db(),
            name,
            description.unwrap_or_default(),
            icon.unwrap_or_default(),
            points,
            !inactive.unwrap_or(false),
        )
        .await?;

        ctx.say(format!(
            "✅ Rule {} '{}' added, worth **{}** points{}.",
            rule.icon,
            rule.name,
            format_points(rule.points_awarded),
            if rule.is_active { "" } else { " (inactive)" },
        ))
        .await?;
        Ok(())
    }

    /// Lists every rule with its value and status.
    #[poise::command(slash_command, rename = "list")]
    pub async fn rule_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let rules = rule::get_all_rules(ctx.data().db()).await?;

        if rules.is_empty() {
            ctx.say("No rules have been defined yet. Use `/rule_manage add` to create some!")
                .await?;
            return Ok(());
        }

        let embed_fields: Vec<(String, String, bool)> = rules
            .into_iter()
            .take(25)
            .map(|r| {
                let status = if r.is_active { "🟢 Active" } else { "⚪ Inactive" };
                (
                    format!("{} {} ({} pts)", r.icon, r.name, format_points(r.points_awarded)),
                    format!("{status}\n{}", r.description),
                    false,
                )
            })
            .collect();

        let list_embed = serenity::CreateEmbed::default()
            .title("**Point Rules**")
            .color(0x0058_65F2)
            .fields(embed_fields);

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }

    /// Shows the latest awards made under a rule.
    #[poise::command(slash_command, rename = "history")]
    pub async fn rule_history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Rule to inspect"]
        #[autocomplete = "autocomplete::autocomplete_rule_name"]
        name: String,
    ) -> Result<()> {
        let db = ctx.data().db();
        let rule = lookup::require_rule(db, &name).await?;
        let awards = award::get_point_transactions_for_rule(db, rule.id).await?;

        if awards.is_empty() {
            ctx.say(format!("Rule '{}' has not awarded any points yet.", rule.name))
                .await?;
            return Ok(());
        }

        let snapshot = LedgerSnapshot::load(db).await?;
        let total: i64 = awards.iter().map(|a| a.points_awarded).sum();
        let mut body = String::new();
        for entry in awards.iter().take(HISTORY_LIMIT) {
            write!(
                body,
                "{} · {} · {} pts",
                entry.date,
                snapshot.advisor_name(entry.advisor_id),
                format_points(entry.points_awarded),
            )?;
            if let Some(comment) = &entry.comment {
                write!(body, " · {comment}")?;
            }
            body.push('\n');
        }
        if awards.len() > HISTORY_LIMIT {
            writeln!(body, "…and {} more", awards.len() - HISTORY_LIMIT)?;
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{} {} history**", rule.icon, rule.name))
            .color(0x0058_65F2)
            .description(body)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} awards · {} points in total",
                awards.len(),
                format_points(total)
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Updates an existing rule. Awards already made keep their value.
    #[poise::command(slash_command, rename = "update")]
    pub async fn rule_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Rule to update"]
        #[autocomplete = "autocomplete::autocomplete_rule_name"]
        name: String,
        #[description = "New name"] new_name: Option<String>,
        #[description = "New point value"] points: Option<i64>,
        #[description = "New description"] description: Option<String>,
        #[description = "New icon"] icon: Option<String>,
    ) -> Result<()> {
        let db = ctx.data().db();
        let rule = lookup::require_rule(db, &name).await?;

        let updated = rule::update_rule(
            db,
            rule.id,
            RuleUpdate {
                name: new_name,
                description,
                icon,
                points_awarded: points,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Rule '{}' updated: {} '{}' worth **{}** points.",
            rule.name,
            updated.icon,
            updated.name,
            format_points(updated.points_awarded),
        ))
        .await?;
        Ok(())
    }

    /// Activates an inactive rule or deactivates an active one.
    #[poise::command(slash_command, rename = "toggle")]
    pub async fn rule_toggle(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Rule to toggle"]
        #[autocomplete = "autocomplete::autocomplete_rule_name"]
        name: String,
    ) -> Result<()> {
        let db = ctx.data().db();
        let rule = lookup::require_rule(db, &name).await?;
        let rule = rule::toggle_rule_active(db, rule.id).await?;

        let state = if rule.is_active {
            "active and can award points"
        } else {
            "inactive and can no longer award points"
        };
        ctx.say(format!("✅ Rule '{}' is now {state}.", rule.name))
            .await?;
        Ok(())
    }

    /// Deletes a rule. Awards made under it stay in the log.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn rule_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Rule to delete"]
        #[autocomplete = "autocomplete::autocomplete_rule_name"]
        name: String,
    ) -> Result<()> {
        let db = ctx.data().db();
        let rule = lookup::require_rule(db, &name).await?;
        rule::delete_rule(db, rule.id).await?;

        ctx.say(format!("✅ Rule '{}' has been deleted.", rule.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
