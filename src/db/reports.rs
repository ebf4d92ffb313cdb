//! Database operations for generated reports.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::report::{self, Entity as Report};
use crate::error::AppResult;

/// Upsert a report by (user, date).
///
/// Regenerating for an already-reported date overwrites title, content,
/// template reference and file URL in place; the row ID is stable.
pub async fn upsert(
    db: &DatabaseConnection,
    user_id: Uuid,
    date: &str,
    title: &str,
    content: &str,
    template_id: Option<Uuid>,
    file_url: &str,
) -> AppResult<report::Model> {
    let existing = Report::find()
        .filter(report::Column::UserId.eq(user_id))
        .filter(report::Column::Date.eq(date))
        .one(db)
        .await?;

    if let Some(m) = existing {
        let mut active: report::ActiveModel = m.into();
        active.title = Set(title.to_string());
        active.content = Set(content.to_string());
        active.template_id = Set(template_id);
        active.file_url = Set(file_url.to_string());
        active.updated_at = Set(Utc::now());
        return Ok(active.update(db).await?);
    }

    let now = Utc::now();
    let model = report::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        template_id: Set(template_id),
        date: Set(date.to_string()),
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        file_url: Set(file_url.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(model.insert(db).await?)
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<report::Model>> {
    Ok(Report::find()
        .filter(report::Column::UserId.eq(user_id))
        .order_by_desc(report::Column::Date)
        .all(db)
        .await?)
}

pub async fn find_owned(
    db: &DatabaseConnection,
    user_id: Uuid,
    report_id: Uuid,
) -> AppResult<Option<report::Model>> {
    Ok(Report::find_by_id(report_id)
        .filter(report::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Whether a report already exists for the user on the given date.
pub async fn exists_for_date(
    db: &DatabaseConnection,
    user_id: Uuid,
    date: &str,
) -> AppResult<bool> {
    let count = Report::find()
        .filter(report::Column::UserId.eq(user_id))
        .filter(report::Column::Date.eq(date))
        .count(db)
        .await?;
    Ok(count > 0)
}
