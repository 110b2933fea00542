//! Award business logic - Granting points to advisors under a rule.
//!
//! Awards form an append-only log: this module creates them and reads them, nothing
//! here updates or deletes one. Each award copies the rule's current value, and the
//! advisor's balances move in the same store transaction as the insert.

use crate::{
    core::advisor::update_advisor_points_atomic,
    entities::{Advisor, PointRule, PointTransaction, point_transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Awards points to an advisor under an active rule.
///
/// The award records the rule's `points_awarded` as it is right now; editing the
/// rule later does not change it. The advisor's `points_accumulated` and
/// `points_available` both grow by that amount.
///
/// # Arguments
/// * `advisor_id` - The advisor earning the points
/// * `rule_id` - The rule that was triggered
/// * `date` - Day the qualifying event happened
/// * `comment` - Optional note; blank comments are dropped
///
/// # Errors
/// - [`Error::AdvisorNotFound`] if the advisor does not exist
/// - [`Error::RuleNotFound`] if the rule does not exist or was deleted
/// - [`Error::RuleInactive`] if the rule is switched off
pub async fn award_points(
    db: &DatabaseConnection,
    advisor_id: i64,
    rule_id: i64,
    date: Date,
    comment: Option<String>,
) -> Result<point_transaction::Model> {
    let txn = db.begin().await?;

    let advisor = Advisor::find_by_id(advisor_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::AdvisorNotFound {
            id: advisor_id.to_string(),
        })?;

    let rule = PointRule::find_by_id(rule_id)
        .one(&txn)
        .await?
        .filter(|rule| !rule.is_deleted)
        .ok_or_else(|| Error::RuleNotFound {
            id: rule_id.to_string(),
        })?;

    if !rule.is_active {
        return Err(Error::RuleInactive { name: rule.name });
    }

    let award = point_transaction::ActiveModel {
        advisor_id: Set(advisor.id),
        rule_id: Set(rule.id),
        points_awarded: Set(rule.points_awarded),
        date: Set(date),
        comment: Set(comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())),
        recorded_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let award = award.insert(&txn).await?;

    update_advisor_points_atomic(&txn, advisor.id, rule.points_awarded, 0).await?;

    txn.commit().await?;

    info!(
        award_id = award.id,
        advisor = %advisor.name,
        rule = %rule.name,
        points = award.points_awarded,
        "Awarded points"
    );
    Ok(award)
}

/// Retrieves every award, newest first.
pub async fn get_all_point_transactions(
    db: &DatabaseConnection,
) -> Result<Vec<point_transaction::Model>> {
    PointTransaction::find()
        .order_by_desc(point_transaction::Column::Date)
        .order_by_desc(point_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the awards of one advisor, newest first.
pub async fn get_point_transactions_for_advisor<C>(
    db: &C,
    advisor_id: i64,
) -> Result<Vec<point_transaction::Model>>
where
    C: ConnectionTrait,
{
    PointTransaction::find()
        .filter(point_transaction::Column::AdvisorId.eq(advisor_id))
        .order_by_desc(point_transaction::Column::Date)
        .order_by_desc(point_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the awards made under one rule, newest first.
pub async fn get_point_transactions_for_rule(
    db: &DatabaseConnection,
    rule_id: i64,
) -> Result<Vec<point_transaction::Model>> {
    PointTransaction::find()
        .filter(point_transaction::Column::RuleId.eq(rule_id))
        .order_by_desc(point_transaction::Column::Date)
        .order_by_desc(point_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{advisor, rule};
    use crate::entities::{advisor as advisor_entity, point_rule};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_award_points_advisor_not_found() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<advisor_entity::Model>::new()])
            .into_connection();

        let result = award_points(&db, 999, 1, date(2024, 1, 15), None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AdvisorNotFound { id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_award_points_inactive_rule_mock() -> Result<()> {
        let advisor = advisor_entity::Model {
            id: 1,
            name: "María González".to_string(),
            email: "maria@realty.example".to_string(),
            properties_sold: 15,
            join_date: date(2023, 1, 15),
            points_accumulated: 0,
            points_redeemed: 0,
            points_available: 0,
        };
        let now = chrono::Utc::now().naive_utc();
        let rule = point_rule::Model {
            id: 5,
            name: "Monthly Goal".to_string(),
            description: String::new(),
            icon: "🏆".to_string(),
            points_awarded: 1000,
            is_active: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![advisor]])
            .append_query_results([vec![rule]])
            .into_connection();

        let result = award_points(&db, 1, 5, date(2024, 1, 15), None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::RuleInactive { name } if name == "Monthly Goal"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_award_points_integration() -> Result<()> {
        let (db, advisor, rule) = setup_with_rule(500).await?;

        let award = award_points(
            &db,
            advisor.id,
            rule.id,
            date(2024, 1, 15),
            Some("  House sale in Zona Rosa ".to_string()),
        )
        .await?;

        assert_eq!(award.advisor_id, advisor.id);
        assert_eq!(award.rule_id, rule.id);
        assert_eq!(award.points_awarded, 500);
        assert_eq!(award.date, date(2024, 1, 15));
        assert_eq!(award.comment.as_deref(), Some("House sale in Zona Rosa"));

        let updated = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(updated.points_accumulated, 500);
        assert_eq!(updated.points_available, 500);
        assert_eq!(updated.points_redeemed, 0);
        assert!(updated.is_balanced());

        assert_eq!(
            get_point_transactions_for_advisor(&db, advisor.id).await?,
            vec![award]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_award_appends_exactly_one_entry() -> Result<()> {
        let (db, advisor, rule) = setup_with_rule(50).await?;
        award_points(&db, advisor.id, rule.id, date(2024, 1, 10), None).await?;

        let before = get_all_point_transactions(&db).await?.len();
        award_points(&db, advisor.id, rule.id, date(2024, 1, 11), Some("  ".to_string()))
            .await?;
        let after = get_all_point_transactions(&db).await?;

        assert_eq!(after.len(), before + 1);
        // Newest first, blank comment dropped
        assert_eq!(after[0].date, date(2024, 1, 11));
        assert_eq!(after[0].comment, None);

        let updated = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(updated.points_accumulated, 100);

        Ok(())
    }

    #[tokio::test]
    async fn test_award_with_inactive_rule_leaves_balances() -> Result<()> {
        let (db, advisor, rule) = setup_with_rule(1000).await?;
        rule::set_rule_active(&db, rule.id, false).await?;

        let result = award_points(&db, advisor.id, rule.id, date(2024, 2, 1), None).await;
        assert!(matches!(result, Err(Error::RuleInactive { .. })));

        let unchanged = advisor::get_advisor_by_id(&db, advisor.id).await?.unwrap();
        assert_eq!(unchanged, advisor);
        assert!(get_all_point_transactions(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_award_with_deleted_or_missing_rule() -> Result<()> {
        let (db, advisor, rule) = setup_with_rule(200).await?;
        rule::delete_rule(&db, rule.id).await?;

        let result = award_points(&db, advisor.id, rule.id, date(2024, 2, 1), None).await;
        assert!(matches!(result, Err(Error::RuleNotFound { id: _ })));

        let result = award_points(&db, advisor.id, 999, date(2024, 2, 1), None).await;
        assert!(matches!(result, Err(Error::RuleNotFound { id: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_award_value_fixed_at_award_time() -> Result<()> {
        let (db, advisor, rule) = setup_with_rule(100).await?;
        let award = award_points(&db, advisor.id, rule.id, date(2024, 3, 1), None).await?;

        rule::update_rule(
            &db,
            rule.id,
            rule::RuleUpdate {
                points_awarded: Some(250),
                ..Default::default()
            },
        )
        .await?;

        let second = award_points(&db, advisor.id, rule.id, date(2024, 3, 2), None).await?;
        assert_eq!(second.points_awarded, 250);

        // Newest first; the earlier award keeps its value
        let for_rule = get_point_transactions_for_rule(&db, rule.id).await?;
        assert_eq!(
            for_rule.iter().map(|a| (a.id, a.points_awarded)).collect::<Vec<_>>(),
            vec![(second.id, 250), (award.id, 100)]
        );

        let other = create_test_rule(&db, "Client Meeting", 50).await?;
        assert!(get_point_transactions_for_rule(&db, other.id).await?.is_empty());

        Ok(())
    }
}
