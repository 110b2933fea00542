//! Discord interaction handlers
//!
//! Autocomplete providers for command arguments, and the lookups commands use to
//! turn the names an administrator types into catalog rows.

/// Autocomplete handlers for advisor, rule and product names
pub mod autocomplete;
/// Name-to-row lookups that fail with the matching `NotFound` error
pub mod lookup;
