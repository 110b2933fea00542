//! Redemption business logic - Spending points on catalog products.
//!
//! A redemption copies the product's cost, debits the advisor and starts out
//! `pending`. Its status can then move once, to `delivered` or `cancelled`.
//! Whether a cancellation gives the points back is decided by the
//! [`CancellationPolicy`] the caller passes in.

use crate::{
    core::{advisor::update_advisor_points_atomic, ledger::CancellationPolicy},
    entities::{Advisor, Product, Redemption, RedemptionStatus, redemption},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Redeems a product for an advisor today.
///
/// See [`redeem_product_on`].
pub async fn redeem_product(
    db: &DatabaseConnection,
    advisor_id: i64,
    product_id: i64,
) -> Result<redemption::Model> {
    redeem_product_on(db, advisor_id, product_id, crate::core::today()).await
}

/// Redeems a product for an advisor on a given day.
///
/// The redemption records the product's current `points_required`. The advisor's
/// `points_redeemed` grows and `points_available` shrinks by that amount, in the
/// same store transaction as the insert.
///
/// # Errors
/// - [`Error::AdvisorNotFound`] / [`Error::ProductNotFound`] for missing references
///   (deleted products count as missing)
/// - [`Error::ProductInactive`] if the product is switched off
/// - [`Error::ProductExpired`] if `date` is past the product's expiry date
/// - [`Error::InsufficientPoints`] if the advisor cannot afford it; nothing changes
pub async fn redeem_product_on(
    db: &DatabaseConnection,
    advisor_id: i64,
    product_id: i64,
    date: Date,
) -> Result<redemption::Model> {
    let txn = db.begin().await?;

    let advisor = Advisor::find_by_id(advisor_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::AdvisorNotFound {
            id: advisor_id.to_string(),
        })?;

    let product = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })?;

    if !product.is_active {
        return Err(Error::ProductInactive {
            title: product.title,
        });
    }
    if let Some(expiry_date) = product.expiry_date.filter(|_| product.is_expired_on(date)) {
        return Err(Error::ProductExpired {
            title: product.title,
            expiry_date,
        });
    }

    if advisor.points_available < product.points_required {
        return Err(Error::InsufficientPoints {
            available: advisor.points_available,
            required: product.points_required,
        });
    }

    let redemption = redemption::ActiveModel {
        advisor_id: Set(advisor.id),
        product_id: Set(product.id),
        points_used: Set(product.points_required),
        date: Set(date),
        status: Set(RedemptionStatus::Pending),
        recorded_at: Set(chrono::Utc::now()),
        status_changed_at: Set(None),
        ..Default::default()
    };
    let redemption = redemption.insert(&txn).await?;

    update_advisor_points_atomic(&txn, advisor.id, 0, product.points_required).await?;

    txn.commit().await?;

    info!(
        redemption_id = redemption.id,
        advisor = %advisor.name,
        product = %product.title,
        points = redemption.points_used,
        "Redeemed product"
    );
    Ok(redemption)
}

/// Moves a pending redemption to `delivered` or `cancelled`.
///
/// Under [`CancellationPolicy::Refund`], cancelling returns `points_used` to the
/// advisor. Under [`CancellationPolicy::Forfeit`] the points stay spent and a warning
/// is logged so the loss is visible.
///
/// # Errors
/// - [`Error::RedemptionNotFound`] if no such redemption exists
/// - [`Error::InvalidStatusTransition`] unless the redemption is `pending` and the
///   target is `delivered` or `cancelled`
pub async fn update_redemption_status(
    db: &DatabaseConnection,
    redemption_id: i64,
    status: RedemptionStatus,
    policy: CancellationPolicy,
) -> Result<redemption::Model> {
    let txn = db.begin().await?;

    let current = Redemption::find_by_id(redemption_id)
        .one(&txn)
        .await?
        .ok_or(Error::RedemptionNotFound { id: redemption_id })?;

    if !current.status.can_transition_to(status) {
        return Err(Error::InvalidStatusTransition {
            from: current.status,
            to: status,
        });
    }

    let advisor_id = current.advisor_id;
    let points_used = current.points_used;

    let mut row: redemption::ActiveModel = current.into();
    row.status = Set(status);
    row.status_changed_at = Set(Some(chrono::Utc::now()));
    let updated = row.update(&txn).await?;

    if status == RedemptionStatus::Cancelled {
        match policy {
            CancellationPolicy::Refund => {
                update_advisor_points_atomic(&txn, advisor_id, 0, -points_used).await?;
                info!(redemption_id, advisor_id, points_used, "Refunded cancelled redemption");
            }
            CancellationPolicy::Forfeit => {
                warn!(
                    redemption_id,
                    advisor_id, points_used, "Cancelled redemption keeps its points spent"
                );
            }
        }
    }

    txn.commit().await?;

    info!(redemption_id, %status, "Updated redemption status");
    Ok(updated)
}

/// Retrieves a single redemption by ID.
pub async fn get_redemption_by_id(
    db: &DatabaseConnection,
    redemption_id: i64,
) -> Result<Option<redemption::Model>> {
    Redemption::find_by_id(redemption_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every redemption, newest first.
pub async fn get_all_redemptions(db: &DatabaseConnection) -> Result<Vec<redemption::Model>> {
    Redemption::find()
        .order_by_desc(redemption::Column::Date)
        .order_by_desc(redemption::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves redemptions in a given state, oldest first so the queue reads in order.
pub async fn get_redemptions_by_status(
    db: &DatabaseConnection,
    status: RedemptionStatus,
) -> Result<Vec<redemption::Model>> {
    Redemption::find()
        .filter(redemption::Column::Status.eq(status))
        .order_by_asc(redemption::Column::Date)
        .order_by_asc(redemption::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the redemptions of one advisor, newest first.
pub async fn get_redemptions_for_advisor<C>(
    db: &C,
    advisor_id: i64,
) -> Result<Vec<redemption::Model>>
where
    C: ConnectionTrait,
{
    Redemption::find()
        .filter(redemption::Column::AdvisorId.eq(advisor_id))
        .order_by_desc(redemption::Column::Date)
        .order_by_desc(redemption::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{advisor, award::award_points, product};
    use crate::entities::{advisor as advisor_entity, product as product_entity};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_redeem_product_not_found_mock() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<advisor_entity::Model>::new()])
            .into_connection();

        let result = redeem_product_on(&db, 999, 1, date(2024, 1, 1)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AdvisorNotFound { id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_insufficient_points_mock() -> Result<()> {
        let advisor = advisor_entity::Model {
            id: 1,
            name: "Pedro Sánchez".to_string(),
            email: "pedro@realty.example".to_string(),
            properties_sold: 12,
            join_date: date(2023, 5, 22),
            points_accumulated: 600,
            points_redeemed: 0,
            points_available: 600,
        };
        let now = chrono::Utc::now().naive_utc();
        let product = product_entity::Model {
            id: 2,
            title: "MacBook Air M3".to_string(),
            description: String::new(),
            category: "Technology".to_string(),
            image_url: None,
            points_required: 8000,
            is_active: true,
            expiry_date: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![advisor]])
            .append_query_results([vec![product]])
            .into_connection();

        let err = redeem_product_on(&db, 1, 2, date(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientPoints {
                available: 600,
                required: 8000
            }
        ));
        assert_eq!(err.shortfall(), Some(7400));

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_product_integration() -> Result<()> {
        let (db, advisor, rule) = setup_with_rule(1500).await?;
        award_points(&db, advisor.id, rule.id, date(2024, 1, 5), None).await?;
        let product = create_test_product(&db, "Spa Day Voucher", 1200).await?;

        let redemption = redeem_product_on(&db, advisor.id, product.id, date(2024, 1, 10)).await?;

        assert_eq!(redemption.advisor_id, advisor.id);
        assert_eq!(redemption.product_id, product.id);
        assert_eq!(redemption.points_used, 1200);
        assert_eq!(redemption.status, RedemptionStatus::Pending);
        assert_eq!(redemption.date, date(2024, 1, 10));
        assert!(redemption.status_changed_at.is_none());

        let updated = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(updated.points_accumulated, 1500);
        assert_eq!(updated.points_redeemed, 1200);
        assert_eq!(updated.points_available, 300);
        assert!(updated.is_balanced());

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_exact_balance_then_shortfall() -> Result<()> {
        let (db, advisor) = setup_with_points(1200).await?;
        let airpods = create_test_product(&db, "AirPods Pro", 1200).await?;
        let meeting_gift = create_test_product(&db, "Coffee Voucher", 50).await?;

        redeem_product_on(&db, advisor.id, airpods.id, date(2024, 1, 8)).await?;
        let drained = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(drained.points_available, 0);

        let result = redeem_product_on(&db, advisor.id, meeting_gift.id, date(2024, 1, 9)).await;
        assert!(matches!(
            result,
            Err(Error::InsufficientPoints {
                available: 0,
                required: 50
            })
        ));

        // Totals untouched by the failed attempt
        let after = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(after, drained);
        assert_eq!(get_redemptions_for_advisor(&db, advisor.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_inactive_expired_and_deleted_products() -> Result<()> {
        let (db, advisor) = setup_with_points(10_000).await?;

        let inactive = create_test_product(&db, "Dinner for Two", 2000).await?;
        product::set_product_active(&db, inactive.id, false).await?;
        let result = redeem_product_on(&db, advisor.id, inactive.id, date(2024, 1, 1)).await;
        assert!(matches!(result, Err(Error::ProductInactive { .. })));

        let mut draft = test_draft("Concert Tickets", 800);
        draft.expiry_date = Some(date(2024, 6, 30));
        let concert = product::create_product(&db, draft).await?;
        let result = redeem_product_on(&db, advisor.id, concert.id, date(2024, 7, 1)).await;
        assert!(matches!(
            result,
            Err(Error::ProductExpired { expiry_date, .. }) if expiry_date == date(2024, 6, 30)
        ));
        // Redeemable on the expiry day itself
        redeem_product_on(&db, advisor.id, concert.id, date(2024, 6, 30)).await?;

        let retired = create_test_product(&db, "Old Voucher", 100).await?;
        product::delete_product(&db, retired.id).await?;
        let result = redeem_product_on(&db, advisor.id, retired.id, date(2024, 1, 1)).await;
        assert!(matches!(result, Err(Error::ProductNotFound { id: _ })));

        let stored = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(stored.points_redeemed, 800);
        assert_eq!(stored.points_available, 9200);

        Ok(())
    }

    #[tokio::test]
    async fn test_redemption_cost_fixed_at_redemption_time() -> Result<()> {
        let (db, advisor) = setup_with_points(5000).await?;
        let product = create_test_product(&db, "iPhone 15 Pro", 1000).await?;
        let redemption = redeem_product_on(&db, advisor.id, product.id, date(2024, 1, 2)).await?;

        product::update_product(
            &db,
            product.id,
            product::ProductUpdate {
                points_required: Some(4000),
                ..Default::default()
            },
        )
        .await?;

        let stored = get_redemption_by_id(&db, redemption.id).await?.unwrap();
        assert_eq!(stored.points_used, 1000);

        Ok(())
    }

    #[tokio::test]
    async fn test_status_transitions_from_pending_only() -> Result<()> {
        let (db, advisor) = setup_with_points(3000).await?;
        let product = create_test_product(&db, "Spa Day Voucher", 1500).await?;
        let first = redeem_product_on(&db, advisor.id, product.id, date(2024, 1, 3)).await?;
        let second = redeem_product_on(&db, advisor.id, product.id, date(2024, 1, 4)).await?;

        let delivered = update_redemption_status(
            &db,
            first.id,
            RedemptionStatus::Delivered,
            CancellationPolicy::Forfeit,
        )
        .await?;
        assert_eq!(delivered.status, RedemptionStatus::Delivered);
        assert!(delivered.status_changed_at.is_some());

        // Terminal states never move again
        for target in [
            RedemptionStatus::Cancelled,
            RedemptionStatus::Pending,
            RedemptionStatus::Delivered,
        ] {
            let result =
                update_redemption_status(&db, first.id, target, CancellationPolicy::Forfeit).await;
            assert!(matches!(
                result,
                Err(Error::InvalidStatusTransition {
                    from: RedemptionStatus::Delivered,
                    ..
                })
            ));
        }

        // Pending cannot be "moved" to pending
        let result = update_redemption_status(
            &db,
            second.id,
            RedemptionStatus::Pending,
            CancellationPolicy::Forfeit,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidStatusTransition { .. })));

        let result = update_redemption_status(
            &db,
            999,
            RedemptionStatus::Delivered,
            CancellationPolicy::Forfeit,
        )
        .await;
        assert!(matches!(result, Err(Error::RedemptionNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_with_forfeit_policy_keeps_points_spent() -> Result<()> {
        let (db, advisor) = setup_with_points(2000).await?;
        let product = create_test_product(&db, "Dinner for Two", 2000).await?;
        let redemption = redeem_product_on(&db, advisor.id, product.id, date(2024, 1, 3)).await?;

        update_redemption_status(
            &db,
            redemption.id,
            RedemptionStatus::Cancelled,
            CancellationPolicy::Forfeit,
        )
        .await?;

        let stored = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(stored.points_redeemed, 2000);
        assert_eq!(stored.points_available, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_with_refund_policy_restores_points() -> Result<()> {
        let (db, advisor) = setup_with_points(2000).await?;
        let product = create_test_product(&db, "Dinner for Two", 2000).await?;
        let redemption = redeem_product_on(&db, advisor.id, product.id, date(2024, 1, 3)).await?;

        let cancelled = update_redemption_status(
            &db,
            redemption.id,
            RedemptionStatus::Cancelled,
            CancellationPolicy::Refund,
        )
        .await?;
        assert_eq!(cancelled.status, RedemptionStatus::Cancelled);

        let stored = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(stored.points_redeemed, 0);
        assert_eq!(stored.points_available, 2000);
        assert!(stored.is_balanced());

        Ok(())
    }

    #[tokio::test]
    async fn test_refund_applies_once_when_cancelled_twice() -> Result<()> {
        let (db, advisor) = setup_with_points(2000).await?;
        let product = create_test_product(&db, "AirPods Pro", 1200).await?;
        let redemption = redeem_product_on(&db, advisor.id, product.id, date(2024, 1, 8)).await?;

        update_redemption_status(
            &db,
            redemption.id,
            RedemptionStatus::Cancelled,
            CancellationPolicy::Refund,
        )
        .await?;

        let second = update_redemption_status(
            &db,
            redemption.id,
            RedemptionStatus::Cancelled,
            CancellationPolicy::Refund,
        )
        .await;
        assert!(matches!(
            second,
            Err(Error::InvalidStatusTransition {
                from: RedemptionStatus::Cancelled,
                to: RedemptionStatus::Cancelled,
            })
        ));

        // Refunded exactly once
        let stored = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(stored.points_accumulated, 2000);
        assert_eq!(stored.points_redeemed, 0);
        assert_eq!(stored.points_available, 2000);
        assert!(
            crate::core::ledger::audit_balances(&db, CancellationPolicy::Refund)
                .await?
                .is_empty()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_redemption_queries() -> Result<()> {
        let (db, advisor) = setup_with_points(5000).await?;
        let product = create_test_product(&db, "AirPods Pro", 1200).await?;
        let older = redeem_product_on(&db, advisor.id, product.id, date(2024, 1, 3)).await?;
        let newer = redeem_product_on(&db, advisor.id, product.id, date(2024, 1, 9)).await?;
        update_redemption_status(
            &db,
            newer.id,
            RedemptionStatus::Delivered,
            CancellationPolicy::Forfeit,
        )
        .await?;

        let all = get_all_redemptions(&db).await?;
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer.id, older.id]);

        let pending = get_redemptions_by_status(&db, RedemptionStatus::Pending).await?;
        assert_eq!(pending.iter().map(|r| r.id).collect::<Vec<_>>(), vec![older.id]);

        Ok(())
    }
}
