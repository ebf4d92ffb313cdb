//! Database operations for mirrored sprints and issue-tracker cards.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::jira_card::{self, Entity as JiraCard};
use crate::entity::sprint::{self, Entity as Sprint};
use crate::error::AppResult;
use crate::models::provider::SprintState;

/// Upsert a sprint by its upstream foreign ID. Upstream is authoritative
/// for every mirrored field.
pub async fn upsert_sprint(
    db: &DatabaseConnection,
    user_id: Uuid,
    foreign_id: &str,
    name: &str,
    state: SprintState,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> AppResult<sprint::Model> {
    let existing = Sprint::find()
        .filter(sprint::Column::ForeignId.eq(foreign_id))
        .one(db)
        .await?;

    if let Some(m) = existing {
        let mut active: sprint::ActiveModel = m.into();
        active.user_id = Set(user_id);
        active.name = Set(name.to_string());
        active.state = Set(state.as_str().to_string());
        active.start_date = Set(start_date);
        active.end_date = Set(end_date);
        return Ok(active.update(db).await?);
    }

    let model = sprint::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        foreign_id: Set(foreign_id.to_string()),
        name: Set(name.to_string()),
        state: Set(state.as_str().to_string()),
        start_date: Set(start_date),
        end_date: Set(end_date),
        created_at: Set(Utc::now()),
    };
    Ok(model.insert(db).await?)
}

/// Upsert a card by (user, key).
///
/// `details_json` is refreshed only when the caller has fresh detail; `None`
/// preserves whatever is cached.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_card(
    db: &DatabaseConnection,
    user_id: Uuid,
    card_key: &str,
    summary: &str,
    status: &str,
    assignee: &str,
    sprint_id: Option<Uuid>,
    details_json: Option<String>,
) -> AppResult<jira_card::Model> {
    let existing = JiraCard::find()
        .filter(jira_card::Column::UserId.eq(user_id))
        .filter(jira_card::Column::CardKey.eq(card_key))
        .one(db)
        .await?;

    if let Some(m) = existing {
        let mut active: jira_card::ActiveModel = m.into();
        active.summary = Set(summary.to_string());
        active.status = Set(status.to_string());
        active.assignee = Set(assignee.to_string());
        active.sprint_id = Set(sprint_id);
        if let Some(details) = details_json {
            active.details_json = Set(Some(details));
        }
        active.updated_at = Set(Utc::now());
        return Ok(active.update(db).await?);
    }

    let now = Utc::now();
    let model = jira_card::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        card_key: Set(card_key.to_string()),
        summary: Set(summary.to_string()),
        status: Set(status.to_string()),
        assignee: Set(assignee.to_string()),
        sprint_id: Set(sprint_id),
        details_json: Set(details_json),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(model.insert(db).await?)
}

pub async fn find_card(
    db: &DatabaseConnection,
    user_id: Uuid,
    card_key: &str,
) -> AppResult<Option<jira_card::Model>> {
    Ok(JiraCard::find()
        .filter(jira_card::Column::UserId.eq(user_id))
        .filter(jira_card::Column::CardKey.eq(card_key))
        .one(db)
        .await?)
}

pub async fn list_cards_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<jira_card::Model>> {
    Ok(JiraCard::find()
        .filter(jira_card::Column::UserId.eq(user_id))
        .all(db)
        .await?)
}
