//! Advisor business logic - Lookups, enrollment and balance maintenance.
//!
//! Advisor balances are only changed through [`update_advisor_points_atomic`], which
//! moves all three balance columns in a single UPDATE so they cannot disagree.

use crate::{
    entities::{Advisor, advisor},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all advisors, ordered alphabetically by name.
pub async fn get_all_advisors(db: &DatabaseConnection) -> Result<Vec<advisor::Model>> {
    Advisor::find()
        .order_by_asc(advisor::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an advisor by its unique ID.
pub async fn get_advisor_by_id<C>(db: &C, advisor_id: i64) -> Result<Option<advisor::Model>>
where
    C: ConnectionTrait,
{
    Advisor::find_by_id(advisor_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an advisor by exact name.
pub async fn get_advisor_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<advisor::Model>> {
    Advisor::find()
        .filter(advisor::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds advisors whose name or email contains `term`, ignoring case.
///
/// An empty term returns every advisor. Matching happens in Rust rather than in SQL
/// because `SQLite`'s `LIKE` only folds ASCII case, and advisor names are not ASCII.
pub async fn search_advisors(db: &DatabaseConnection, term: &str) -> Result<Vec<advisor::Model>> {
    let needle = term.trim().to_lowercase();
    let advisors = get_all_advisors(db).await?;
    if needle.is_empty() {
        return Ok(advisors);
    }

    Ok(advisors
        .into_iter()
        .filter(|a| {
            a.name.to_lowercase().contains(&needle) || a.email.to_lowercase().contains(&needle)
        })
        .collect())
}

/// Enrolls a new advisor with empty balances.
///
/// # Errors
/// Returns an error if the name or email is blank, or the insert fails
/// (for example because the name is already taken).
pub async fn create_advisor(
    db: &DatabaseConnection,
    name: String,
    email: String,
    properties_sold: i32,
    join_date: Date,
) -> Result<advisor::Model> {
    if name.trim().is_empty() {
        return Err(Error::MissingField {
            field: "Advisor name",
        });
    }
    if email.trim().is_empty() {
        return Err(Error::MissingField {
            field: "Advisor email",
        });
    }

    let advisor = advisor::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_string()),
        properties_sold: Set(properties_sold.max(0)),
        join_date: Set(join_date),
        points_accumulated: Set(0),
        points_redeemed: Set(0),
        points_available: Set(0),
        ..Default::default()
    };

    advisor.insert(db).await.map_err(Into::into)
}

/// Moves an advisor's balances by the given deltas in one atomic UPDATE.
///
/// `points_available` always moves by `accumulated_delta - redeemed_delta`, which
/// keeps the balance invariant intact without reading the row first:
/// `UPDATE advisors SET points_accumulated = points_accumulated + ?, ... WHERE id = ?`
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `advisor_id` - ID of the advisor to update
/// * `accumulated_delta` - Points earned (positive) to add
/// * `redeemed_delta` - Points spent to add (negative to give points back)
///
/// # Returns
/// The updated advisor model
pub async fn update_advisor_points_atomic<C>(
    db: &C,
    advisor_id: i64,
    accumulated_delta: i64,
    redeemed_delta: i64,
) -> Result<advisor::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let result = Advisor::update_many()
        .col_expr(
            advisor::Column::PointsAccumulated,
            Expr::col(advisor::Column::PointsAccumulated).add(accumulated_delta),
        )
        .col_expr(
            advisor::Column::PointsRedeemed,
            Expr::col(advisor::Column::PointsRedeemed).add(redeemed_delta),
        )
        .col_expr(
            advisor::Column::PointsAvailable,
            Expr::col(advisor::Column::PointsAvailable).add(accumulated_delta - redeemed_delta),
        )
        .filter(advisor::Column::Id.eq(advisor_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::AdvisorNotFound {
            id: advisor_id.to_string(),
        });
    }

    get_advisor_by_id(db, advisor_id)
        .await?
        .ok_or_else(|| Error::AdvisorNotFound {
            id: advisor_id.to_string(),
        })
}
