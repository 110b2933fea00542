//! Report generation business logic.
//!
//! Reports are read-only views over the award and redemption logs, grouped by
//! advisor, product or rule and optionally narrowed by a [`ReportFilter`]. A
//! [`LedgerSnapshot`] is loaded once and every report is a pure function of it, so
//! the bot layer can build several views from one read.

use crate::{
    entities::{
        Advisor, PointRule, PointTransaction, Product, Redemption, RedemptionStatus, advisor,
        point_rule, point_transaction, product, redemption,
    },
    errors::Result,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, prelude::Date};
use std::{cmp::Reverse, collections::HashMap};

/// Number of entries the activity report shows when no limit is given.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

/// Narrows the log entries a report looks at. Empty filter means everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// First day included
    pub date_from: Option<Date>,
    /// Last day included
    pub date_to: Option<Date>,
    /// Only entries of this advisor
    pub advisor_id: Option<i64>,
}

impl ReportFilter {
    /// Whether a log entry of `advisor_id` dated `date` passes the filter.
    #[must_use]
    pub fn includes(&self, advisor_id: i64, date: Date) -> bool {
        self.advisor_id.is_none_or(|id| id == advisor_id)
            && self.date_from.is_none_or(|from| date >= from)
            && self.date_to.is_none_or(|to| date <= to)
    }
}

/// Everything the reports read, loaded in one go.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// All advisors, by name
    pub advisors: Vec<advisor::Model>,
    /// All rules including deleted ones, by name
    pub rules: Vec<point_rule::Model>,
    /// All products including deleted ones, by title
    pub products: Vec<product::Model>,
    /// The award log, newest first
    pub awards: Vec<point_transaction::Model>,
    /// The redemption log, newest first
    pub redemptions: Vec<redemption::Model>,
}

impl LedgerSnapshot {
    /// Reads the catalogs and both logs from the store.
    pub async fn load(db: &DatabaseConnection) -> Result<Self> {
        Ok(Self {
            advisors: Advisor::find()
                .order_by_asc(advisor::Column::Name)
                .all(db)
                .await?,
            rules: PointRule::find()
                .order_by_asc(point_rule::Column::Name)
                .all(db)
                .await?,
            products: Product::find()
                .order_by_asc(product::Column::Title)
                .all(db)
                .await?,
            awards: PointTransaction::find()
                .order_by_desc(point_transaction::Column::Date)
                .order_by_desc(point_transaction::Column::Id)
                .all(db)
                .await?,
            redemptions: Redemption::find()
                .order_by_desc(redemption::Column::Date)
                .order_by_desc(redemption::Column::Id)
                .all(db)
                .await?,
        })
    }

    fn filtered_awards<'a>(
        &'a self,
        filter: &'a ReportFilter,
    ) -> impl Iterator<Item = &'a point_transaction::Model> + 'a {
        self.awards
            .iter()
            .filter(move |a| filter.includes(a.advisor_id, a.date))
    }

    fn filtered_redemptions<'a>(
        &'a self,
        filter: &'a ReportFilter,
    ) -> impl Iterator<Item = &'a redemption::Model> + 'a {
        self.redemptions
            .iter()
            .filter(move |r| filter.includes(r.advisor_id, r.date))
    }

    /// Display name of an advisor, or `"Unknown"`.
    #[must_use]
    pub fn advisor_name(&self, advisor_id: i64) -> &str {
        self.advisors
            .iter()
            .find(|a| a.id == advisor_id)
            .map_or("Unknown", |a| a.name.as_str())
    }

    /// Display name of a rule, or `"Unknown"`.
    #[must_use]
    pub fn rule_name(&self, rule_id: i64) -> &str {
        self.rules
            .iter()
            .find(|r| r.id == rule_id)
            .map_or("Unknown", |r| r.name.as_str())
    }

    /// Display title of a product, or `"Unknown"`.
    #[must_use]
    pub fn product_title(&self, product_id: i64) -> &str {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .map_or("Unknown", |p| p.title.as_str())
    }
}

/// Per-advisor totals over the filtered log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorReportRow {
    /// The advisor
    pub advisor_id: i64,
    /// The advisor's name
    pub name: String,
    /// Sum of awarded points
    pub total_earned: i64,
    /// Sum of points used on redemptions
    pub total_spent: i64,
    /// Current spendable balance (not filtered)
    pub points_available: i64,
    /// Number of awards
    pub award_count: usize,
    /// Number of redemptions
    pub redemption_count: usize,
}

/// Per-product redemption volume over the filtered log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReportRow {
    /// The product
    pub product_id: i64,
    /// The product's title
    pub title: String,
    /// Current cost
    pub points_required: i64,
    /// Number of redemptions
    pub redemption_count: usize,
    /// Sum of points used on those redemptions
    pub total_points_used: i64,
}

/// Per-rule usage over the filtered log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleReportRow {
    /// The rule
    pub rule_id: i64,
    /// The rule's name
    pub name: String,
    /// The rule's icon
    pub icon: String,
    /// Number of awards made under the rule
    pub usage_count: usize,
    /// Sum of points those awards granted
    pub total_points_awarded: i64,
}

/// Program-wide totals for the dashboard. Never filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramSummary {
    /// Number of advisors
    pub advisor_count: usize,
    /// Rules usable for awards
    pub active_rule_count: usize,
    /// Products listed in the catalog (not deleted)
    pub product_count: usize,
    /// Products that can be redeemed today
    pub redeemable_product_count: usize,
    /// Sum of all awards
    pub total_points_awarded: i64,
    /// Sum of all redemptions
    pub total_points_redeemed: i64,
    /// Sum of every advisor's available balance
    pub total_points_available: i64,
    /// Number of awards
    pub award_count: usize,
    /// Number of redemptions
    pub redemption_count: usize,
    /// Redemptions waiting for delivery
    pub pending_redemption_count: usize,
}

/// One award with the names it refers to resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardActivity {
    /// The award
    pub award: point_transaction::Model,
    /// Advisor name
    pub advisor_name: String,
    /// Rule name
    pub rule_name: String,
}

/// One redemption with the names it refers to resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionActivity {
    /// The redemption
    pub redemption: redemption::Model,
    /// Advisor name
    pub advisor_name: String,
    /// Product title
    pub product_title: String,
}

/// The latest awards and redemptions, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityReport {
    /// Recent awards
    pub awards: Vec<AwardActivity>,
    /// Recent redemptions
    pub redemptions: Vec<RedemptionActivity>,
}

/// Totals per advisor. With an advisor filter only that advisor is listed.
#[must_use]
pub fn advisor_report(snapshot: &LedgerSnapshot, filter: &ReportFilter) -> Vec<AdvisorReportRow> {
    let mut rows: HashMap<i64, AdvisorReportRow> = snapshot
        .advisors
        .iter()
        .filter(|a| filter.advisor_id.is_none_or(|id| id == a.id))
        .map(|a| {
            (
                a.id,
                AdvisorReportRow {
                    advisor_id: a.id,
                    name: a.name.clone(),
                    total_earned: 0,
                    total_spent: 0,
                    points_available: a.points_available,
                    award_count: 0,
                    redemption_count: 0,
                },
            )
        })
        .collect();

    for award in snapshot.filtered_awards(filter) {
        if let Some(row) = rows.get_mut(&award.advisor_id) {
            row.total_earned += award.points_awarded;
            row.award_count += 1;
        }
    }
    for redemption in snapshot.filtered_redemptions(filter) {
        if let Some(row) = rows.get_mut(&redemption.advisor_id) {
            row.total_spent += redemption.points_used;
            row.redemption_count += 1;
        }
    }

    let mut rows: Vec<AdvisorReportRow> = rows.into_values().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

/// Redemption volume per product, most redeemed first.
///
/// Deleted products only show up when the filtered log still references them.
#[must_use]
pub fn product_report(snapshot: &LedgerSnapshot, filter: &ReportFilter) -> Vec<ProductReportRow> {
    let mut usage: HashMap<i64, (usize, i64)> = HashMap::new();
    for redemption in snapshot.filtered_redemptions(filter) {
        let entry = usage.entry(redemption.product_id).or_default();
        entry.0 += 1;
        entry.1 += redemption.points_used;
    }

    let mut rows: Vec<ProductReportRow> = snapshot
        .products
        .iter()
        .filter(|p| !p.is_deleted || usage.contains_key(&p.id))
        .map(|p| {
            let (redemption_count, total_points_used) =
                usage.get(&p.id).copied().unwrap_or_default();
            ProductReportRow {
                product_id: p.id,
                title: p.title.clone(),
                points_required: p.points_required,
                redemption_count,
                total_points_used,
            }
        })
        .collect();

    rows.sort_by_key(|row| Reverse(row.redemption_count));
    rows
}

/// Usage per rule, most used first.
///
/// Deleted rules only show up when the filtered log still references them.
#[must_use]
pub fn rule_report(snapshot: &LedgerSnapshot, filter: &ReportFilter) -> Vec<RuleReportRow> {
    let mut usage: HashMap<i64, (usize, i64)> = HashMap::new();
    for award in snapshot.filtered_awards(filter) {
        let entry = usage.entry(award.rule_id).or_default();
        entry.0 += 1;
        entry.1 += award.points_awarded;
    }

    let mut rows: Vec<RuleReportRow> = snapshot
        .rules
        .iter()
        .filter(|r| !r.is_deleted || usage.contains_key(&r.id))
        .map(|r| {
            let (usage_count, total_points_awarded) =
                usage.get(&r.id).copied().unwrap_or_default();
            RuleReportRow {
                rule_id: r.id,
                name: r.name.clone(),
                icon: r.icon.clone(),
                usage_count,
                total_points_awarded,
            }
        })
        .collect();

    rows.sort_by_key(|row| Reverse(row.usage_count));
    rows
}

/// Program-wide totals as of `today`.
#[must_use]
pub fn program_summary(snapshot: &LedgerSnapshot, today: Date) -> ProgramSummary {
    ProgramSummary {
        advisor_count: snapshot.advisors.len(),
        active_rule_count: snapshot
            .rules
            .iter()
            .filter(|r| r.is_active && !r.is_deleted)
            .count(),
        product_count: snapshot.products.iter().filter(|p| !p.is_deleted).count(),
        redeemable_product_count: snapshot
            .products
            .iter()
            .filter(|p| p.is_redeemable_on(today))
            .count(),
        total_points_awarded: snapshot.awards.iter().map(|a| a.points_awarded).sum(),
        total_points_redeemed: snapshot.redemptions.iter().map(|r| r.points_used).sum(),
        total_points_available: snapshot.advisors.iter().map(|a| a.points_available).sum(),
        award_count: snapshot.awards.len(),
        redemption_count: snapshot.redemptions.len(),
        pending_redemption_count: snapshot
            .redemptions
            .iter()
            .filter(|r| r.status == RedemptionStatus::Pending)
            .count(),
    }
}

/// The latest `limit` awards and redemptions passing the filter.
#[must_use]
pub fn recent_activity(
    snapshot: &LedgerSnapshot,
    filter: &ReportFilter,
    limit: Option<usize>,
) -> ActivityReport {
    let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);

    let awards = snapshot
        .filtered_awards(filter)
        .take(limit)
        .map(|a| AwardActivity {
            award: a.clone(),
            advisor_name: snapshot.advisor_name(a.advisor_id).to_string(),
            rule_name: snapshot.rule_name(a.rule_id).to_string(),
        })
        .collect();
    let redemptions = snapshot
        .filtered_redemptions(filter)
        .take(limit)
        .map(|r| RedemptionActivity {
            redemption: r.clone(),
            advisor_name: snapshot.advisor_name(r.advisor_id).to_string(),
            product_title: snapshot.product_title(r.product_id).to_string(),
        })
        .collect();

    ActivityReport {
        awards,
        redemptions,
    }
}

/// Loads the store and builds the advisor report.
pub async fn generate_advisor_report(
    db: &DatabaseConnection,
    filter: &ReportFilter,
) -> Result<Vec<AdvisorReportRow>> {
    let snapshot = LedgerSnapshot::load(db).await?;
    Ok(advisor_report(&snapshot, filter))
}

/// Loads the store and builds the product report.
pub async fn generate_product_report(
    db: &DatabaseConnection,
    filter: &ReportFilter,
) -> Result<Vec<ProductReportRow>> {
    let snapshot = LedgerSnapshot::load(db).await?;
    Ok(product_report(&snapshot, filter))
}

/// Loads the store and builds the rule report.
pub async fn generate_rule_report(
    db: &DatabaseConnection,
    filter: &ReportFilter,
) -> Result<Vec<RuleReportRow>> {
    let snapshot = LedgerSnapshot::load(db).await?;
    Ok(rule_report(&snapshot, filter))
}

/// Loads the store and builds the program summary for today.
pub async fn generate_program_summary(db: &DatabaseConnection) -> Result<ProgramSummary> {
    let snapshot = LedgerSnapshot::load(db).await?;
    Ok(program_summary(&snapshot, crate::core::today()))
}

/// Loads the store and builds the activity report.
pub async fn generate_activity_report(
    db: &DatabaseConnection,
    filter: &ReportFilter,
    limit: Option<usize>,
) -> Result<ActivityReport> {
    let snapshot = LedgerSnapshot::load(db).await?;
    Ok(recent_activity(&snapshot, filter, limit))
}

/// Formats a point amount with thousands separators, like `12,500`.
#[must_use]
pub fn format_points(points: i64) -> String {
    let digits = points.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if points < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Formats a balance change with its sign, like `+500` or `-1,200`.
#[must_use]
pub fn format_points_delta(points: i64) -> String {
    if points >= 0 {
        format!("+{}", format_points(points))
    } else {
        format_points(points)
    }
}

/// Status label with an emoji for chat output.
#[must_use]
pub const fn format_status_badge(status: RedemptionStatus) -> &'static str {
    match status {
        RedemptionStatus::Pending => "⏳ Pending",
        RedemptionStatus::Delivered => "✅ Delivered",
        RedemptionStatus::Cancelled => "❌ Cancelled",
    }
}

/// One-line summary of an award for activity listings.
#[must_use]
pub fn format_award_summary(entry: &AwardActivity) -> String {
    let mut line = format!(
        "{} | {} | {} | {}",
        entry.award.date,
        entry.advisor_name,
        entry.rule_name,
        format_points_delta(entry.award.points_awarded)
    );
    if let Some(comment) = &entry.award.comment {
        line.push_str(" | ");
        line.push_str(comment);
    }
    line
}

/// One-line summary of a redemption for activity listings.
#[must_use]
pub fn format_redemption_summary(entry: &RedemptionActivity) -> String {
    format!(
        "#{} {} | {} | {} | {} | {}",
        entry.redemption.id,
        entry.redemption.date,
        entry.advisor_name,
        entry.product_title,
        format_points_delta(-entry.redemption.points_used),
        format_status_badge(entry.redemption.status)
    )
}
