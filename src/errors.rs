//! Unified error type for the rewards ledger.
//!
//! Every fallible operation returns [`Result`]. Domain failures carry the
//! values an administrator needs to understand them (ids, balances), and
//! [`Error::kind`] collapses them into the coarse taxonomy used when
//! reporting back through the chat interface.

use thiserror::Error;

use crate::entities::redemption::RedemptionStatus;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced advisor, rule, product, redemption or sale does not exist
    NotFound,
    /// The referenced record exists but cannot be used right now
    InvalidState,
    /// A redemption costs more than the advisor has available
    InsufficientPoints,
    /// Input rejected before touching the store
    Validation,
    /// Store, configuration or transport failure
    Internal,
}

/// All errors produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Discord error: {0}")]
    Discord(Box<poise::serenity_prelude::Error>),

    #[error("Advisor not found: {id}")]
    AdvisorNotFound { id: String },

    #[error("Point rule not found: {id}")]
    RuleNotFound { id: String },

    #[error("Product not found: {id}")]
    ProductNotFound { id: String },

    #[error("Redemption not found: {id}")]
    RedemptionNotFound { id: i64 },

    #[error("Point rule '{name}' is inactive and cannot award points")]
    RuleInactive { name: String },

    #[error("Product '{title}' is inactive and cannot be redeemed")]
    ProductInactive { title: String },

    #[error("Product '{title}' expired on {expiry_date} and cannot be redeemed")]
    ProductExpired {
        title: String,
        expiry_date: chrono::NaiveDate,
    },

    #[error(
        "Insufficient points: available {available}, required {required} (short by {})",
        .required - .available
    )]
    InsufficientPoints { available: i64, required: i64 },

    #[error("Redemption cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: RedemptionStatus,
        to: RedemptionStatus,
    },

    #[error("Invalid point value: {points} (must be greater than zero)")]
    InvalidPoints { points: i64 },

    #[error("Invalid {field}: {amount}")]
    InvalidAmount { field: &'static str, amount: i64 },

    #[error("{field} cannot be empty")]
    MissingField { field: &'static str },

    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("User {user_id} is not an administrator")]
    Unauthorized { user_id: String },
}

impl Error {
    /// Maps this error onto the ledger taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AdvisorNotFound { .. }
            | Self::RuleNotFound { .. }
            | Self::ProductNotFound { .. }
            | Self::RedemptionNotFound { .. } => ErrorKind::NotFound,
            Self::RuleInactive { .. }
            | Self::ProductInactive { .. }
            | Self::ProductExpired { .. }
            | Self::InvalidStatusTransition { .. } => ErrorKind::InvalidState,
            Self::InsufficientPoints { .. } => ErrorKind::InsufficientPoints,
            Self::InvalidPoints { .. }
            | Self::InvalidAmount { .. }
            | Self::MissingField { .. }
            | Self::InvalidDate { .. }
            | Self::Unauthorized { .. } => ErrorKind::Validation,
            Self::Config { .. }
            | Self::Database(_)
            | Self::EnvVar(_)
            | Self::Fmt(_)
            | Self::Discord(_) => ErrorKind::Internal,
        }
    }

    /// Points missing for a redemption, if this is an [`Error::InsufficientPoints`].
    #[must_use]
    pub const fn shortfall(&self) -> Option<i64> {
        match self {
            Self::InsufficientPoints {
                available,
                required,
            } => Some(*required - *available),
            _ => None,
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Discord(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
