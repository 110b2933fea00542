/// Store connection and table creation
pub mod database;

/// Seed catalog and ledger settings loaded from config.toml
pub mod catalog;

/// Administrator allowlist from environment variables
pub mod admins;
