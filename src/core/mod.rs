//! Core business logic - framework-agnostic ledger, catalog and reporting operations.
//!
//! Every function takes the store connection explicitly. Operations that touch both
//! the transaction log and advisor balances run inside a single store transaction.

/// Advisor lookups and balance maintenance
pub mod advisor;
/// Point awards (the append-only award log)
pub mod award;
/// Balance recomputation, auditing and cancellation policy
pub mod ledger;
/// Product catalog management
pub mod product;
/// Redemptions and their status transitions
pub mod redemption;
/// Read-only aggregate reports
pub mod report;
/// Point rule catalog management
pub mod rule;
/// Per-advisor property sales log
pub mod sale;

/// Today's date in the local timezone, used when an operation is not given one.
#[must_use]
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
