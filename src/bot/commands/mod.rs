//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Advisor listing, detail and sales commands
pub mod advisor;

/// General utility commands
pub mod general;

/// Award and redemption commands
pub mod points;

/// Product catalog management commands
pub mod product;

/// Report commands
pub mod report;

/// Point rule catalog management commands
pub mod rule;

use crate::{bot::BotData, errors::Error};

// Export commands
pub use advisor::*;
pub use general::*;
pub use points::*;
pub use product::*;
pub use report::*;
pub use rule::*;

/// Every top-level command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        advisors(),
        advisor(),
        sale(),
        award(),
        redeem(),
        redemption_status(),
        redemptions(),
        rule_manage(),
        product_manage(),
        report(),
    ]
}
