//! Integration tests for storage semantics, run against in-memory SQLite
//! through the real migrations.

use chrono::{Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use worklog_lib::db;
use worklog_lib::entity::{commit, jira_card, report_template, sprint, user};
use worklog_lib::migration::Migrator;
use worklog_lib::models::Provider;
use worklog_lib::models::provider::SprintState;

async fn setup() -> DatabaseConnection {
    let conn = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&conn, None).await.expect("run migrations");
    conn
}

async fn create_user(conn: &DatabaseConnection, email: &str) -> user::Model {
    db::users::create(conn, email, "hash").await.expect("create user")
}

async fn create_repo(conn: &DatabaseConnection, user_id: Uuid) -> Uuid {
    db::repositories::create(
        conn,
        user_id,
        "acme",
        "worklog",
        Provider::Github,
        "https://github.com/acme/worklog",
    )
    .await
    .expect("create repository")
    .id
}

fn sample_commit(repo_id: Uuid, sha: &str) -> db::commits::NewCommit {
    db::commits::NewCommit {
        repo_id,
        sha: sha.to_string(),
        message: "PDT-1: fix parser".to_string(),
        author: "dev".to_string(),
        author_email: "dev@example.com".to_string(),
        branch: "main".to_string(),
        date: Utc::now(),
        card_key: Some("PDT-1".to_string()),
    }
}

#[tokio::test]
async fn test_commit_upsert_is_idempotent() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;
    let repo_id = create_repo(&conn, user.id).await;

    let first = db::commits::insert_if_new(&conn, sample_commit(repo_id, "abc123"))
        .await
        .unwrap();
    let second = db::commits::insert_if_new(&conn, sample_commit(repo_id, "abc123"))
        .await
        .unwrap();

    assert!(first);
    assert!(!second);

    let count = commit::Entity::find().count(&conn).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_commit_resync_never_updates_existing_row() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;
    let repo_id = create_repo(&conn, user.id).await;

    db::commits::insert_if_new(&conn, sample_commit(repo_id, "abc123"))
        .await
        .unwrap();

    // Same SHA with a different message must be silently skipped.
    let mut changed = sample_commit(repo_id, "abc123");
    changed.message = "rewritten message".to_string();
    db::commits::insert_if_new(&conn, changed).await.unwrap();

    let stored = commit::Entity::find().one(&conn).await.unwrap().unwrap();
    assert_eq!(stored.message, "PDT-1: fix parser");
}

#[tokio::test]
async fn test_manual_link_flips_has_link() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;
    let repo_id = create_repo(&conn, user.id).await;

    let mut unlinked = sample_commit(repo_id, "def456");
    unlinked.card_key = None;
    db::commits::insert_if_new(&conn, unlinked).await.unwrap();

    let stored = commit::Entity::find().one(&conn).await.unwrap().unwrap();
    assert!(!stored.has_link);

    db::commits::create_link(&conn, stored, "CORE-9").await.unwrap();

    let stored = commit::Entity::find().one(&conn).await.unwrap().unwrap();
    assert!(stored.has_link);

    let links = db::commits::links_for_commit(&conn, stored.id).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].card_key, "CORE-9");
}

#[tokio::test]
async fn test_repository_delete_cascades_commits() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;
    let repo_id = create_repo(&conn, user.id).await;

    db::commits::insert_if_new(&conn, sample_commit(repo_id, "abc123"))
        .await
        .unwrap();

    db::repositories::delete(&conn, user.id, repo_id).await.unwrap();

    let count = commit::Entity::find().count(&conn).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_default_template_is_exclusive() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;

    let a = db::templates::create(&conn, user.id, "A", "# {{date}}").await.unwrap();
    let b = db::templates::create(&conn, user.id, "B", "# {{date}}").await.unwrap();

    db::templates::set_default(&conn, user.id, a.id).await.unwrap();
    db::templates::set_default(&conn, user.id, b.id).await.unwrap();

    let templates = db::templates::list_for_user(&conn, user.id).await.unwrap();
    let defaults: Vec<&report_template::Model> =
        templates.iter().filter(|t| t.is_default).collect();

    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, b.id);
}

#[tokio::test]
async fn test_default_template_scoped_per_user() {
    let conn = setup().await;
    let alice = create_user(&conn, "alice@example.com").await;
    let bob = create_user(&conn, "bob@example.com").await;

    let a = db::templates::create(&conn, alice.id, "A", "x").await.unwrap();
    let b = db::templates::create(&conn, bob.id, "B", "y").await.unwrap();

    db::templates::set_default(&conn, alice.id, a.id).await.unwrap();
    db::templates::set_default(&conn, bob.id, b.id).await.unwrap();

    let found = db::templates::find_default(&conn, alice.id).await.unwrap().unwrap();
    assert_eq!(found.id, a.id);
}

#[tokio::test]
async fn test_report_upsert_keeps_row_id() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;

    let first = db::reports::upsert(&conn, user.id, "2026-08-29", "Title", "v1", None, "")
        .await
        .unwrap();
    let second = db::reports::upsert(&conn, user.id, "2026-08-29", "Title", "v2", None, "")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.content, "v2");

    let reports = db::reports::list_for_user(&conn, user.id).await.unwrap();
    assert_eq!(reports.len(), 1);
}

#[tokio::test]
async fn test_sprint_upsert_by_foreign_id() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;

    db::jira::upsert_sprint(&conn, user.id, "41", "Sprint 7", SprintState::Future, None, None)
        .await
        .unwrap();
    db::jira::upsert_sprint(&conn, user.id, "41", "Sprint 7 (renamed)", SprintState::Active, None, None)
        .await
        .unwrap();

    let sprints = sprint::Entity::find().all(&conn).await.unwrap();
    assert_eq!(sprints.len(), 1);
    assert_eq!(sprints[0].name, "Sprint 7 (renamed)");
    assert_eq!(sprints[0].state, "active");
}

#[tokio::test]
async fn test_card_upsert_preserves_cached_detail() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;

    db::jira::upsert_card(
        &conn,
        user.id,
        "PDT-1",
        "Ship it",
        "Open",
        "Dana",
        None,
        Some(r#"{"key":"PDT-1"}"#.to_string()),
    )
    .await
    .unwrap();

    // A lightweight refresh without detail must not wipe the cache.
    db::jira::upsert_card(&conn, user.id, "PDT-1", "Ship it", "Done", "Dana", None, None)
        .await
        .unwrap();

    let cards = jira_card::Entity::find().all(&conn).await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].status, "Done");
    assert_eq!(cards[0].details_json.as_deref(), Some(r#"{"key":"PDT-1"}"#));
}

#[tokio::test]
async fn test_settings_update_clears_with_empty_string() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;

    let update = db::users::SettingsUpdate {
        github_token: Some("ciphertext".to_string()),
        jira_workspace: Some("acme.atlassian.net".to_string()),
        ..Default::default()
    };
    let user_model = db::users::update_settings(&conn, user.id, update).await.unwrap();
    assert_eq!(user_model.github_token.as_deref(), Some("ciphertext"));

    // None leaves a field untouched; empty string clears it.
    let update = db::users::SettingsUpdate {
        github_token: Some(String::new()),
        ..Default::default()
    };
    let user_model = db::users::update_settings(&conn, user.id, update).await.unwrap();
    assert!(user_model.github_token.is_none());
    assert_eq!(
        user_model.jira_workspace.as_deref(),
        Some("acme.atlassian.net")
    );
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let conn = setup().await;
    create_user(&conn, "a@example.com").await;

    let err = db::users::create(&conn, "a@example.com", "hash").await;
    assert!(err.is_err());
}

#[tokio::test]
async fn test_commit_range_is_half_open() {
    let conn = setup().await;
    let user = create_user(&conn, "a@example.com").await;
    let repo_id = create_repo(&conn, user.id).await;

    let day_start = Utc.with_ymd_and_hms(2026, 8, 29, 0, 0, 0).unwrap();
    let day_end = day_start + Duration::hours(24);

    let mut at_start = sample_commit(repo_id, "aaa");
    at_start.date = day_start;
    let mut at_end = sample_commit(repo_id, "bbb");
    at_end.date = day_end;

    db::commits::insert_if_new(&conn, at_start).await.unwrap();
    db::commits::insert_if_new(&conn, at_end).await.unwrap();

    let rows = db::commits::list_for_user_in_range(&conn, user.id, day_start, day_end)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0.sha, "aaa");
}
