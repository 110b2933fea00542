//! Administrator allowlist loaded from environment variables.
//!
//! `ADMIN_USER_IDS` is a comma separated list of Discord user IDs allowed to run
//! ledger commands. `ADMIN_NAMES` optionally lists display names in the same order.
//! An administrator without a configured name is shown by user ID.

use std::collections::HashMap;

/// The set of users allowed to operate the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminDirectory {
    admins: HashMap<String, Option<String>>,
}

impl AdminDirectory {
    /// Reads `ADMIN_USER_IDS` and `ADMIN_NAMES` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let ids = std::env::var("ADMIN_USER_IDS").unwrap_or_default();
        let names = std::env::var("ADMIN_NAMES").ok();
        let directory = Self::parse(&ids, names.as_deref());
        if directory.is_empty() {
            tracing::warn!("ADMIN_USER_IDS is empty; every ledger command will be refused");
        }
        directory
    }

    /// Builds a directory from a comma separated ID list and matching names.
    ///
    /// Blank entries are ignored. Extra names without an ID are dropped.
    #[must_use]
    pub fn parse(ids: &str, names: Option<&str>) -> Self {
        let mut names = names
            .map(|n| n.split(',').map(str::trim).collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter();

        let admins = ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                let name = names
                    .next()
                    .filter(|n| !n.is_empty())
                    .map(ToString::to_string);
                (id.to_string(), name)
            })
            .collect();

        Self { admins }
    }

    /// Whether `user_id` may run ledger commands.
    #[must_use]
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.contains_key(user_id)
    }

    /// Gets the configured display name for an administrator, if any.
    #[must_use]
    pub fn display_name(&self, user_id: &str) -> Option<&str> {
        self.admins.get(user_id).and_then(Option::as_deref)
    }

    /// Number of configured administrators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.admins.len()
    }

    /// Whether no administrator is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}
