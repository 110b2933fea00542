//! The ledger store owned by one running session.
//!
//! A [`Store`] bundles the database connection with the ledger settings read from
//! the catalog file. It is opened once at startup, handed to the bot as shared data,
//! and closed on shutdown. Nothing in the crate keeps a global connection.

use crate::{
    config::{
        catalog::{Config, seed_catalog},
        database,
    },
    core::ledger::{CancellationPolicy, LedgerSettings},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::info;

/// Database connection plus ledger settings for one session.
// sea-orm's `mock` feature (enabled by the dev-dependency) removes `Clone` from
// `DatabaseConnection`, so the derive is only available outside test builds.
#[derive(Debug)]
#[cfg_attr(not(test), derive(Clone))]
pub struct Store {
    db: DatabaseConnection,
    settings: LedgerSettings,
}

impl Store {
    /// Opens the store named by `DATABASE_URL` (in-memory by default) and seeds it.
    pub async fn open(config: &Config) -> Result<Self> {
        Self::open_with_url(&database::get_database_url(), config).await
    }

    /// Opens the store at `database_url`, creates missing tables and seeds an empty
    /// store from `config`.
    pub async fn open_with_url(database_url: &str, config: &Config) -> Result<Self> {
        let db = database::connect(database_url).await?;
        database::create_tables(&db).await?;
        seed_catalog(&db, config).await?;

        info!(
            cancellation_policy = ?config.ledger.cancellation_policy,
            "Ledger store ready"
        );
        Ok(Self {
            db,
            settings: config.ledger,
        })
    }

    /// The store connection, for passing to `core` operations.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Ledger settings in effect for this session.
    #[must_use]
    pub const fn settings(&self) -> LedgerSettings {
        self.settings
    }

    /// Shorthand for the configured cancellation policy.
    #[must_use]
    pub const fn cancellation_policy(&self) -> CancellationPolicy {
        self.settings.cancellation_policy
    }

    /// Closes the connection. An in-memory store is discarded with it.
    pub async fn close(self) -> Result<()> {
        self.db.close().await?;
        info!("Ledger store closed");
        Ok(())
    }
}
