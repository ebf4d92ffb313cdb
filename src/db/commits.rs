//! Database operations for commits and manual card links.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::commit::{self, Entity as Commit};
use crate::entity::commit_card_link::{self, Entity as CommitCardLink};
use crate::entity::repository;
use crate::error::{AppError, AppResult};

/// A commit fetched from upstream, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCommit {
    pub repo_id: Uuid,
    pub sha: String,
    pub message: String,
    pub author: String,
    pub author_email: String,
    pub branch: String,
    pub date: DateTime<Utc>,
    pub card_key: Option<String>,
}

/// Insert a commit, silently skipping when the SHA is already stored.
///
/// Returns true when a row was inserted. Existing rows are never updated;
/// the first sync to record a SHA wins permanently. A concurrent insert
/// losing the unique-index race is treated the same as a pre-existing row.
pub async fn insert_if_new(db: &DatabaseConnection, new: NewCommit) -> AppResult<bool> {
    let existing = Commit::find()
        .filter(commit::Column::Sha.eq(new.sha.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let has_link = new.card_key.is_some();
    let model = commit::ActiveModel {
        id: Set(Uuid::new_v4()),
        repo_id: Set(new.repo_id),
        sha: Set(new.sha),
        message: Set(new.message),
        author: Set(new.author),
        author_email: Set(new.author_email),
        branch: Set(new.branch),
        date: Set(new.date),
        card_key: Set(new.card_key),
        has_link: Set(has_link),
        created_at: Set(Utc::now()),
    };

    match model.insert(db).await {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) => {
            Ok(false)
        }
        Err(e) => Err(AppError::Database(format!("Failed to insert commit: {}", e))),
    }
}

/// Commits for a user's repositories within `[from, to)`, oldest first,
/// paired with the owning repository.
pub async fn list_for_user_in_range(
    db: &DatabaseConnection,
    user_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> AppResult<Vec<(commit::Model, repository::Model)>> {
    let rows = Commit::find()
        .find_also_related(repository::Entity)
        .filter(repository::Column::UserId.eq(user_id))
        .filter(commit::Column::Date.gte(from))
        .filter(commit::Column::Date.lt(to))
        .order_by_asc(commit::Column::Date)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(c, r)| r.map(|r| (c, r)))
        .collect())
}

/// Find a commit only if it belongs to one of the user's repositories.
pub async fn find_owned(
    db: &DatabaseConnection,
    user_id: Uuid,
    commit_id: Uuid,
) -> AppResult<Option<commit::Model>> {
    let row = Commit::find_by_id(commit_id)
        .find_also_related(repository::Entity)
        .filter(repository::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(row.map(|(c, _)| c))
}

/// Create a manual commit-to-card link and flip `has_link` on the commit.
///
/// Links are append-only; the `has_link` flag only ever transitions
/// false to true.
pub async fn create_link(
    db: &DatabaseConnection,
    commit: commit::Model,
    card_key: &str,
) -> AppResult<commit_card_link::Model> {
    let link = commit_card_link::ActiveModel {
        id: Set(Uuid::new_v4()),
        commit_id: Set(commit.id),
        card_key: Set(card_key.to_string()),
        linked_at: Set(Utc::now()),
    };
    let inserted = link.insert(db).await?;

    if !commit.has_link {
        let mut active: commit::ActiveModel = commit.into();
        active.has_link = Set(true);
        active.update(db).await?;
    }

    Ok(inserted)
}

pub async fn links_for_commit(
    db: &DatabaseConnection,
    commit_id: Uuid,
) -> AppResult<Vec<commit_card_link::Model>> {
    Ok(CommitCardLink::find()
        .filter(commit_card_link::Column::CommitId.eq(commit_id))
        .order_by_asc(commit_card_link::Column::LinkedAt)
        .all(db)
        .await?)
}
