//! General Discord commands - ping and help.
//! These need no ledger access and are open to everyone in the server.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Advisor Rewards Help**\n\
        Ledger commands are restricted to program administrators.\n\n\
        **Points**\n\
        • `/award <advisor> <rule> [date] [comment]` - Awards points under an active rule.\n\
        • `/redeem <advisor> <product>` - Spends points on a catalog product.\n\
        • `/redemption_status <id> <status>` - Marks a pending redemption delivered or cancelled.\n\
        • `/redemptions [status]` - Lists redemptions, optionally by status.\n\n\
        **Advisors**\n\
        • `/advisors [search]` - Lists advisors and their balances.\n\
        • `/advisor <name>` - Shows an advisor's balances and recent history.\n\n\
        **Catalog**\n\
        • `/rule_manage <add|list|update|toggle|delete>` - Manage point rules.\n\
        • `/product_manage <add|list|update|toggle|duplicate|delete>` - Manage products.\n\n\
        **Reports**\n\
        • `/report <summary|advisors|products|rules|activity|audit>` - Program reports.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
