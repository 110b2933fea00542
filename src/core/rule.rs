//! Point rule business logic - The catalog of events that earn points.
//!
//! Rules are soft deleted so awards made under them keep a valid reference. Lookups
//! by name and the catalog listings skip deleted rules; lookups by ID do not, which
//! lets reports and history resolve any rule an award points at.

use crate::{
    entities::{PointRule, point_rule},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Icon used when a rule is created without one.
pub const DEFAULT_ICON: &str = "⭐";

/// Fields to change on an existing rule. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct RuleUpdate {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New icon
    pub icon: Option<String>,
    /// New award value; only affects future awards
    pub points_awarded: Option<i64>,
}

/// Retrieves all non-deleted rules, ordered alphabetically by name.
pub async fn get_all_rules(db: &DatabaseConnection) -> Result<Vec<point_rule::Model>> {
    PointRule::find()
        .filter(point_rule::Column::IsDeleted.eq(false))
        .order_by_asc(point_rule::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the rules that can currently be used for awards.
pub async fn get_active_rules(db: &DatabaseConnection) -> Result<Vec<point_rule::Model>> {
    PointRule::find()
        .filter(point_rule::Column::IsDeleted.eq(false))
        .filter(point_rule::Column::IsActive.eq(true))
        .order_by_asc(point_rule::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a non-deleted rule by name.
pub async fn get_rule_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<point_rule::Model>> {
    PointRule::find()
        .filter(point_rule::Column::Name.eq(name.trim()))
        .filter(point_rule::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a rule by ID, including deleted ones.
pub async fn get_rule_by_id<C>(db: &C, rule_id: i64) -> Result<Option<point_rule::Model>>
where
    C: ConnectionTrait,
{
    PointRule::find_by_id(rule_id)
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_points(points: i64) -> Result<()> {
    if points <= 0 {
        return Err(Error::InvalidPoints { points });
    }
    Ok(())
}

/// Creates a new point rule.
///
/// A blank icon falls back to [`DEFAULT_ICON`].
///
/// # Errors
/// Returns an error if:
/// - The rule name is empty or whitespace-only
/// - The award value is not positive
/// - The insert fails (for example, the name is already used)
pub async fn create_rule(
    db: &DatabaseConnection,
    name: String,
    description: String,
    icon: String,
    points_awarded: i64,
    is_active: bool,
) -> Result<point_rule::Model> {
    if name.trim().is_empty() {
        return Err(Error::MissingField { field: "Rule name" });
    }
    validate_points(points_awarded)?;

    let icon = if icon.trim().is_empty() {
        DEFAULT_ICON.to_string()
    } else {
        icon.trim().to_string()
    };
    let now = chrono::Utc::now().naive_utc();

    let rule = point_rule::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description.trim().to_string()),
        icon: Set(icon),
        points_awarded: Set(points_awarded),
        is_active: Set(is_active),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let rule = rule.insert(db).await?;
    info!(rule_id = rule.id, name = %rule.name, points = rule.points_awarded, "Created point rule");
    Ok(rule)
}

async fn find_live_rule(db: &DatabaseConnection, rule_id: i64) -> Result<point_rule::Model> {
    get_rule_by_id(db, rule_id)
        .await?
        .filter(|rule| !rule.is_deleted)
        .ok_or_else(|| Error::RuleNotFound {
            id: rule_id.to_string(),
        })
}

/// Updates an existing rule's fields.
///
/// Changing `points_awarded` never touches awards that were already made.
///
/// # Errors
/// Returns an error if:
/// - A new name is blank or a new award value is not positive
/// - The rule does not exist or is deleted
/// - The database update fails
pub async fn update_rule(
    db: &DatabaseConnection,
    rule_id: i64,
    changes: RuleUpdate,
) -> Result<point_rule::Model> {
    if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(Error::MissingField { field: "Rule name" });
    }
    if let Some(points) = changes.points_awarded {
        validate_points(points)?;
    }

    let mut rule: point_rule::ActiveModel = find_live_rule(db, rule_id).await?.into();

    if let Some(name) = changes.name {
        rule.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        rule.description = Set(description.trim().to_string());
    }
    if let Some(icon) = changes.icon.filter(|i| !i.trim().is_empty()) {
        rule.icon = Set(icon.trim().to_string());
    }
    if let Some(points) = changes.points_awarded {
        rule.points_awarded = Set(points);
    }
    rule.updated_at = Set(chrono::Utc::now().naive_utc());

    rule.update(db).await.map_err(Into::into)
}

/// Sets whether a rule can be used for new awards.
pub async fn set_rule_active(
    db: &DatabaseConnection,
    rule_id: i64,
    is_active: bool,
) -> Result<point_rule::Model> {
    let mut rule: point_rule::ActiveModel = find_live_rule(db, rule_id).await?.into();
    rule.is_active = Set(is_active);
    rule.updated_at = Set(chrono::Utc::now().naive_utc());

    let rule = rule.update(db).await?;
    info!(rule_id = rule.id, is_active, "Changed point rule status");
    Ok(rule)
}

/// Flips a rule between active and inactive.
pub async fn toggle_rule_active(
    db: &DatabaseConnection,
    rule_id: i64,
) -> Result<point_rule::Model> {
    let rule = find_live_rule(db, rule_id).await?;
    set_rule_active(db, rule_id, !rule.is_active).await
}

/// Soft deletes a rule, preserving the awards made under it.
pub async fn delete_rule(db: &DatabaseConnection, rule_id: i64) -> Result<point_rule::Model> {
    let mut rule: point_rule::ActiveModel = find_live_rule(db, rule_id).await?.into();

    rule.is_deleted = Set(true);
    rule.is_active = Set(false);
    rule.updated_at = Set(chrono::Utc::now().naive_utc());

    let rule = rule.update(db).await?;
    info!(rule_id = rule.id, name = %rule.name, "Deleted point rule");
    Ok(rule)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_rule_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result =
            create_rule(&db, "   ".to_string(), String::new(), String::new(), 50, true).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::MissingField { field: "Rule name" }
        ));

        let result =
            create_rule(&db, "Lead".to_string(), String::new(), String::new(), 0, true).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidPoints { points: 0 }
        ));

        let result =
            create_rule(&db, "Lead".to_string(), String::new(), String::new(), -5, true).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidPoints { points: -5 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_rule_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let rule = create_rule(
            &db,
            " Closed Sale ".to_string(),
            "Each property sold".to_string(),
            String::new(),
            500,
            true,
        )
        .await?;

        assert_eq!(rule.name, "Closed Sale");
        assert_eq!(rule.icon, DEFAULT_ICON);
        assert_eq!(rule.points_awarded, 500);
        assert!(rule.is_active);
        assert!(!rule.is_deleted);

        Ok(())
    }

    #[tokio::test]
    async fn test_active_rules_exclude_inactive_and_deleted() -> Result<()> {
        let db = setup_test_db().await?;

        let active = create_test_rule(&db, "Closed Sale", 500).await?;
        let inactive = create_test_rule(&db, "Client Meeting", 50).await?;
        set_rule_active(&db, inactive.id, false).await?;
        let deleted = create_test_rule(&db, "Qualified Lead", 100).await?;
        delete_rule(&db, deleted.id).await?;

        let rules = get_active_rules(&db).await?;
        assert_eq!(rules, vec![active]);

        let all = get_all_rules(&db).await?;
        assert_eq!(all.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_rule_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let rule = create_test_rule(&db, "Client Meeting", 50).await?;

        let updated = update_rule(
            &db,
            rule.id,
            RuleUpdate {
                name: Some("Client Visit".to_string()),
                points_awarded: Some(75),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.name, "Client Visit");
        assert_eq!(updated.points_awarded, 75);
        assert_eq!(updated.description, rule.description);
        assert_eq!(updated.icon, rule.icon);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_rule_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let rule = create_test_rule(&db, "Client Meeting", 50).await?;

        let result = update_rule(
            &db,
            rule.id,
            RuleUpdate {
                points_awarded: Some(0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidPoints { points: 0 })));

        let result = update_rule(
            &db,
            rule.id,
            RuleUpdate {
                name: Some(" ".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::MissingField { .. })));

        let result = update_rule(&db, 999, RuleUpdate::default()).await;
        assert!(matches!(result, Err(Error::RuleNotFound { id: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_rule_active() -> Result<()> {
        let db = setup_test_db().await?;
        let rule = create_test_rule(&db, "Monthly Goal", 1000).await?;

        let toggled = toggle_rule_active(&db, rule.id).await?;
        assert!(!toggled.is_active);

        let toggled = toggle_rule_active(&db, rule.id).await?;
        assert!(toggled.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_rule_is_soft() -> Result<()> {
        let db = setup_test_db().await?;
        let rule = create_test_rule(&db, "Successful Referral", 200).await?;

        delete_rule(&db, rule.id).await?;

        assert!(get_rule_by_name(&db, "Successful Referral").await?.is_none());
        let stored = get_rule_by_id(&db, rule.id).await?.unwrap();
        assert!(stored.is_deleted);
        assert!(!stored.is_active);

        // Deleting twice reports the rule as missing
        let result = delete_rule(&db, rule.id).await;
        assert!(matches!(result, Err(Error::RuleNotFound { id: _ })));

        Ok(())
    }
}
