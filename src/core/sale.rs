//! Property sale business logic - Recording and summarizing each advisor's sales log.
//!
//! The sales log sits beside the point ledger. Recording a sale never changes point
//! balances; administrators award the matching rule for that.

use crate::{
    core::report::format_points,
    entities::{Advisor, PropertySale, property_sale},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// A sale to record.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    /// Address of the property
    pub address: String,
    /// Day the sale closed
    pub sale_date: Date,
    /// Sale price in whole currency units
    pub sale_amount: i64,
    /// Points the advisor earned for it
    pub points_earned: i64,
}

/// Totals over a set of sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesSummary {
    /// Number of sales
    pub sale_count: usize,
    /// Sum of sale prices
    pub total_amount: i64,
    /// Sum of points earned
    pub total_points: i64,
}

impl SalesSummary {
    /// Totals the given sales.
    #[must_use]
    pub fn of(sales: &[property_sale::Model]) -> Self {
        sales.iter().fold(Self::default(), |acc, sale| acc.add(sale))
    }

    const fn add(self, sale: &property_sale::Model) -> Self {
        Self {
            sale_count: self.sale_count + 1,
            total_amount: self.total_amount + sale.sale_amount,
            total_points: self.total_points + sale.points_earned,
        }
    }
}

/// Formats a sale price, like `$2,500,000`.
#[must_use]
pub fn format_sale_amount(amount: i64) -> String {
    format!("${}", format_points(amount))
}

/// Records a closed sale for an advisor.
///
/// # Errors
/// - [`Error::MissingField`] if the address is blank
/// - [`Error::InvalidAmount`] if the price is not positive or the points are negative
/// - [`Error::AdvisorNotFound`] if the advisor does not exist
pub async fn record_property_sale(
    db: &DatabaseConnection,
    advisor_id: i64,
    draft: SaleDraft,
) -> Result<property_sale::Model> {
    let address = draft.address.trim().to_string();
    if address.is_empty() {
        return Err(Error::MissingField {
            field: "Property address",
        });
    }
    if draft.sale_amount <= 0 {
        return Err(Error::InvalidAmount {
            field: "sale amount",
            amount: draft.sale_amount,
        });
    }
    if draft.points_earned < 0 {
        return Err(Error::InvalidAmount {
            field: "points earned",
            amount: draft.points_earned,
        });
    }

    let advisor = Advisor::find_by_id(advisor_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::AdvisorNotFound {
            id: advisor_id.to_string(),
        })?;

    let sale = property_sale::ActiveModel {
        advisor_id: Set(advisor.id),
        address: Set(address),
        sale_date: Set(draft.sale_date),
        sale_amount: Set(draft.sale_amount),
        points_earned: Set(draft.points_earned),
        recorded_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let sale = sale.insert(db).await?;

    info!(
        sale_id = sale.id,
        advisor = %advisor.name,
        amount = sale.sale_amount,
        "Recorded property sale"
    );
    Ok(sale)
}

/// Retrieves every recorded sale, newest first.
pub async fn get_all_sales(db: &DatabaseConnection) -> Result<Vec<property_sale::Model>> {
    PropertySale::find()
        .order_by_desc(property_sale::Column::SaleDate)
        .order_by_desc(property_sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the sales of one advisor, newest first.
pub async fn get_sales_for_advisor(
    db: &DatabaseConnection,
    advisor_id: i64,
) -> Result<Vec<property_sale::Model>> {
    PropertySale::find()
        .filter(property_sale::Column::AdvisorId.eq(advisor_id))
        .order_by_desc(property_sale::Column::SaleDate)
        .order_by_desc(property_sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
