use advisor_rewards::{
    bot::{self, BotData},
    config::{admins::AdminDirectory, catalog},
    errors::{Error, Result},
    store::Store,
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    if dotenv().is_err() {
        info!("No .env file found, using the process environment");
    }

    // 3. Load the seed catalog and ledger settings
    let config = catalog::load_default_config()
        .inspect_err(|e| error!("Failed to load catalog configuration: {e}"))?;

    // 4. Open this session's store and seed it
    let store = Store::open(&config)
        .await
        .inspect_err(|e| error!("Failed to open ledger store: {e}"))?;

    let admins = AdminDirectory::from_env();
    info!("{} administrator(s) configured", admins.len());

    // 5. Run the bot; the token is read right before use
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    let outcome = bot::run_bot(token, BotData::new(store.clone(), admins)).await;

    // 6. Tear the session store down whatever way the bot stopped
    store.close().await?;
    outcome
}
