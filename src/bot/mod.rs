//! Bot layer - Discord-specific interface and command handlers
//!
//! Administrators operate the ledger through slash commands. Every command except
//! `ping` and `help` is gated by the [`AdminDirectory`]; domain errors coming back
//! from `core` are answered inline with their message.

/// Discord command implementations (advisors, points, rules, products, reports)
pub mod commands;
/// Discord interaction handlers (autocomplete, name lookups)
pub mod handlers;

use crate::{
    config::admins::AdminDirectory,
    errors::{Error, ErrorKind, Result},
    store::Store,
};
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

/// Shared data available to all bot commands.
/// Holds the session's ledger store and the administrator allowlist.
pub struct BotData {
    /// The ledger store for this session
    pub store: Store,
    /// Users allowed to run ledger commands
    pub admins: AdminDirectory,
}

impl BotData {
    /// Creates a new `BotData` instance from an opened store and the allowlist.
    #[must_use]
    pub const fn new(store: Store, admins: AdminDirectory) -> Self {
        Self { store, admins }
    }

    /// The store connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        self.store.db()
    }
}

/// Commands anyone in the server may run.
const PUBLIC_COMMANDS: [&str; 2] = ["ping", "help"];

/// Parses a `YYYY-MM-DD` command argument.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        input: input.to_string(),
    })
}

/// Parses an optional `YYYY-MM-DD` argument; a missing or blank value stays `None`.
pub fn parse_optional_date(input: Option<&str>) -> Result<Option<NaiveDate>> {
    input
        .filter(|s| !s.trim().is_empty())
        .map(parse_date)
        .transpose()
}

/// Name of the administrator running a command, falling back to the user ID.
#[must_use]
pub fn acting_admin(ctx: poise::Context<'_, BotData, Error>) -> String {
    let user_id = ctx.author().id.to_string();
    match ctx.data().admins.display_name(&user_id) {
        Some(name) => name.to_string(),
        None => user_id,
    }
}

async fn require_admin(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    if PUBLIC_COMMANDS.contains(&ctx.command().name.as_str()) {
        return Ok(true);
    }

    let user_id = ctx.author().id.to_string();
    if ctx.data().admins.is_admin(&user_id) {
        return Ok(true);
    }

    warn!(user_id, command = %ctx.command().qualified_name, "Refused non-admin command");
    Err(Error::Unauthorized { user_id })
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = if error.kind() == ErrorKind::Internal {
                error!("Error in command `{}`: {error:?}", ctx.command().qualified_name);
                "❌ Something went wrong on our side. Please try again later.".to_string()
            } else {
                info!(
                    command = %ctx.command().qualified_name,
                    "Command rejected: {error}"
                );
                format!("❌ {error}")
            };
            if let Err(e) = ctx.say(reply).await {
                error!("Failed to send error message: {e}");
            }
        }
        poise::FrameworkError::CommandCheckFailed { ctx, .. } => {
            if let Err(e) = ctx
                .say("⛔ Only program administrators can use this command.")
                .await
            {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Starts the Discord client and serves commands until the connection ends.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            command_check: Some(|ctx| Box::pin(require_admin(ctx))),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
