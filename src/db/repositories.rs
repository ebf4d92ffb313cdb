//! Database operations for tracked repositories.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::repository::{self, Entity as Repository};
use crate::error::{AppError, AppResult};
use crate::models::Provider;

pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    owner: &str,
    name: &str,
    provider: Provider,
    url: &str,
) -> AppResult<repository::Model> {
    let model = repository::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        owner: Set(owner.to_string()),
        name: Set(name.to_string()),
        provider: Set(provider.as_str().to_string()),
        url: Set(url.to_string()),
        is_valid: Set(true),
        last_synced_at: Set(None),
        created_at: Set(Utc::now()),
    };

    Ok(model.insert(db).await?)
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<repository::Model>> {
    Ok(Repository::find()
        .filter(repository::Column::UserId.eq(user_id))
        .all(db)
        .await?)
}

/// Find a repository only if it belongs to the given user.
pub async fn find_owned(
    db: &DatabaseConnection,
    user_id: Uuid,
    repo_id: Uuid,
) -> AppResult<Option<repository::Model>> {
    Ok(Repository::find_by_id(repo_id)
        .filter(repository::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Delete a repository; its commits cascade.
pub async fn delete(db: &DatabaseConnection, user_id: Uuid, repo_id: Uuid) -> AppResult<()> {
    let repo = find_owned(db, user_id, repo_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Repository".to_string()))?;

    Repository::delete_by_id(repo.id).exec(db).await?;
    Ok(())
}

/// Record a successful sync attempt: valid, with a fresh timestamp.
pub async fn mark_synced(db: &DatabaseConnection, repo: repository::Model) -> AppResult<()> {
    let mut active: repository::ActiveModel = repo.into();
    active.is_valid = Set(true);
    active.last_synced_at = Set(Some(Utc::now()));
    active.update(db).await?;
    Ok(())
}

/// Record a failed sync attempt.
pub async fn mark_invalid(db: &DatabaseConnection, repo: repository::Model) -> AppResult<()> {
    let mut active: repository::ActiveModel = repo.into();
    active.is_valid = Set(false);
    active.update(db).await?;
    Ok(())
}

/// Distinct IDs of users who track at least one repository.
pub async fn distinct_user_ids(db: &DatabaseConnection) -> AppResult<Vec<Uuid>> {
    let ids: Vec<Uuid> = Repository::find()
        .select_only()
        .column(repository::Column::UserId)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids)
}
