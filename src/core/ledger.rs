//! Ledger consistency - Recomputing advisor balances from the transaction log.
//!
//! Advisor balances are a materialized view over the award and redemption logs.
//! They are maintained incrementally by the award and redemption operations; this
//! module can rebuild them from scratch and report any advisor whose stored balance
//! has drifted from what the log says.
//!
//! What a cancelled redemption does to the balance is governed by
//! [`CancellationPolicy`]. The default keeps the points spent.

use crate::{
    core::{advisor, award, redemption},
    entities::{
        Advisor, PointTransaction, Redemption, RedemptionStatus, advisor as advisor_entity,
        point_transaction, redemption as redemption_entity,
    },
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// What happens to the points of a redemption that gets cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationPolicy {
    /// Points stay spent
    #[default]
    Forfeit,
    /// Points return to the advisor's available balance
    Refund,
}

impl CancellationPolicy {
    /// Whether a redemption with `status` still counts against the advisor.
    #[must_use]
    pub fn counts(self, status: RedemptionStatus) -> bool {
        !(self == Self::Refund && status == RedemptionStatus::Cancelled)
    }
}

/// Ledger behavior settings from the `[ledger]` table of config.toml.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LedgerSettings {
    /// Treatment of cancelled redemptions
    #[serde(default)]
    pub cancellation_policy: CancellationPolicy,
}

/// The three balance figures of an advisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerBalances {
    /// Lifetime points earned
    pub accumulated: i64,
    /// Lifetime points spent
    pub redeemed: i64,
    /// Points currently spendable
    pub available: i64,
}

impl LedgerBalances {
    /// The balances stored on an advisor row.
    #[must_use]
    pub const fn of(advisor: &advisor_entity::Model) -> Self {
        Self {
            accumulated: advisor.points_accumulated,
            redeemed: advisor.points_redeemed,
            available: advisor.points_available,
        }
    }
}

/// Folds an advisor's log entries into balances.
///
/// Callers pass only the entries of the advisor they are interested in.
#[must_use]
pub fn compute_balances<'a>(
    awards: impl IntoIterator<Item = &'a point_transaction::Model>,
    redemptions: impl IntoIterator<Item = &'a redemption_entity::Model>,
    policy: CancellationPolicy,
) -> LedgerBalances {
    let accumulated = awards.into_iter().map(|a| a.points_awarded).sum();
    let redeemed = redemptions
        .into_iter()
        .filter(|r| policy.counts(r.status))
        .map(|r| r.points_used)
        .sum();

    LedgerBalances {
        accumulated,
        redeemed,
        available: accumulated - redeemed,
    }
}

/// An advisor whose stored balances disagree with the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDrift {
    /// The advisor
    pub advisor_id: i64,
    /// The advisor's name, for display
    pub advisor_name: String,
    /// What the advisor row says
    pub stored: LedgerBalances,
    /// What the log says
    pub expected: LedgerBalances,
}

/// Rebuilds one advisor's balances from the log and stores the result.
pub async fn recalculate_advisor_balances(
    db: &DatabaseConnection,
    advisor_id: i64,
    policy: CancellationPolicy,
) -> Result<advisor_entity::Model> {
    let txn = db.begin().await?;

    let current = advisor::get_advisor_by_id(&txn, advisor_id)
        .await?
        .ok_or_else(|| Error::AdvisorNotFound {
            id: advisor_id.to_string(),
        })?;

    let awards = award::get_point_transactions_for_advisor(&txn, advisor_id).await?;
    let redemptions = redemption::get_redemptions_for_advisor(&txn, advisor_id).await?;
    let expected = compute_balances(&awards, &redemptions, policy);

    if LedgerBalances::of(&current) == expected {
        txn.commit().await?;
        return Ok(current);
    }

    let mut row: advisor_entity::ActiveModel = current.into();
    row.points_accumulated = Set(expected.accumulated);
    row.points_redeemed = Set(expected.redeemed);
    row.points_available = Set(expected.available);
    let updated = row.update(&txn).await?;

    txn.commit().await?;
    info!(advisor_id, ?expected, "Recalculated advisor balances from the log");
    Ok(updated)
}

/// Lists every advisor whose stored balances differ from the log.
///
/// Nothing is written; use [`recalculate_advisor_balances`] to repair a drift.
pub async fn audit_balances(
    db: &DatabaseConnection,
    policy: CancellationPolicy,
) -> Result<Vec<BalanceDrift>> {
    let advisors = Advisor::find().all(db).await?;
    let awards = PointTransaction::find().all(db).await?;
    let redemptions = Redemption::find().all(db).await?;

    let mut awards_by_advisor: HashMap<i64, Vec<&point_transaction::Model>> = HashMap::new();
    for entry in &awards {
        awards_by_advisor.entry(entry.advisor_id).or_default().push(entry);
    }
    let mut redemptions_by_advisor: HashMap<i64, Vec<&redemption_entity::Model>> = HashMap::new();
    for entry in &redemptions {
        redemptions_by_advisor
            .entry(entry.advisor_id)
            .or_default()
            .push(entry);
    }

    let drifts: Vec<BalanceDrift> = advisors
        .into_iter()
        .filter_map(|advisor| {
            let expected = compute_balances(
                awards_by_advisor.get(&advisor.id).into_iter().flatten().copied(),
                redemptions_by_advisor
                    .get(&advisor.id)
                    .into_iter()
                    .flatten()
                    .copied(),
                policy,
            );
            let stored = LedgerBalances::of(&advisor);
            (stored != expected).then(|| BalanceDrift {
                advisor_id: advisor.id,
                advisor_name: advisor.name,
                stored,
                expected,
            })
        })
        .collect();

    for drift in &drifts {
        warn!(
            advisor_id = drift.advisor_id,
            stored = ?drift.stored,
            expected = ?drift.expected,
            "Advisor balance drifted from the transaction log"
        );
    }
    Ok(drifts)
}
