//! Database operations for report templates.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entity::report_template::{self, Entity as ReportTemplate};
use crate::error::{AppError, AppResult};

pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
    content: &str,
) -> AppResult<report_template::Model> {
    let now = Utc::now();
    let model = report_template::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(name.to_string()),
        content: Set(content.to_string()),
        is_default: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(model.insert(db).await?)
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<report_template::Model>> {
    Ok(ReportTemplate::find()
        .filter(report_template::Column::UserId.eq(user_id))
        .order_by_asc(report_template::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_owned(
    db: &DatabaseConnection,
    user_id: Uuid,
    template_id: Uuid,
) -> AppResult<Option<report_template::Model>> {
    Ok(ReportTemplate::find_by_id(template_id)
        .filter(report_template::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// The user's flagged-default template, if any.
pub async fn find_default(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Option<report_template::Model>> {
    Ok(ReportTemplate::find()
        .filter(report_template::Column::UserId.eq(user_id))
        .filter(report_template::Column::IsDefault.eq(true))
        .one(db)
        .await?)
}

pub async fn update(
    db: &DatabaseConnection,
    user_id: Uuid,
    template_id: Uuid,
    name: Option<String>,
    content: Option<String>,
) -> AppResult<report_template::Model> {
    let existing = find_owned(db, user_id, template_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Template".to_string()))?;

    let mut active: report_template::ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(content) = content {
        active.content = Set(content);
    }
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, user_id: Uuid, template_id: Uuid) -> AppResult<()> {
    let existing = find_owned(db, user_id, template_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Template".to_string()))?;

    ReportTemplate::delete_by_id(existing.id).exec(db).await?;
    Ok(())
}

/// Flag a template as the user's default.
///
/// Clears every other default for the same user in the same transaction, so
/// exactly one template carries the flag afterwards.
pub async fn set_default(
    db: &DatabaseConnection,
    user_id: Uuid,
    template_id: Uuid,
) -> AppResult<report_template::Model> {
    let existing = find_owned(db, user_id, template_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Template".to_string()))?;

    let txn = db.begin().await?;

    ReportTemplate::update_many()
        .col_expr(report_template::Column::IsDefault, Expr::value(false))
        .filter(report_template::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    let mut active: report_template::ActiveModel = existing.into();
    active.is_default = Set(true);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}
