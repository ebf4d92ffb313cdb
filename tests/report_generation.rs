//! End-to-end report generation against in-memory SQLite: commit grouping,
//! template resolution and rendering.

use chrono::{Local, NaiveDate, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use worklog_lib::crypto::TokenCipher;
use worklog_lib::db;
use worklog_lib::entity::user;
use worklog_lib::migration::Migrator;
use worklog_lib::models::Provider;
use worklog_lib::services::report;
use worklog_lib::sync::reports as auto_reports;

async fn setup() -> (DatabaseConnection, user::Model, Uuid) {
    let conn = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&conn, None).await.expect("run migrations");

    let user = db::users::create(&conn, "dev@example.com", "hash")
        .await
        .expect("create user");
    let repo = db::repositories::create(
        &conn,
        user.id,
        "acme",
        "worklog",
        Provider::Github,
        "https://github.com/acme/worklog",
    )
    .await
    .expect("create repository");

    (conn, user, repo.id)
}

async fn insert_commit(
    conn: &DatabaseConnection,
    repo_id: Uuid,
    sha: &str,
    message: &str,
    card_key: Option<&str>,
    hour: u32,
) {
    let commit = db::commits::NewCommit {
        repo_id,
        sha: sha.to_string(),
        message: message.to_string(),
        author: "dev".to_string(),
        author_email: "dev@example.com".to_string(),
        branch: "main".to_string(),
        date: Utc.with_ymd_and_hms(2026, 8, 29, hour, 0, 0).unwrap(),
        card_key: card_key.map(str::to_string),
    };
    db::commits::insert_if_new(conn, commit).await.expect("insert commit");
}

fn report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
}

#[tokio::test]
async fn test_empty_day_produces_empty_report_data() {
    let (conn, user, _) = setup().await;

    let data = report::build_report_data(&conn, None, &user, report_date())
        .await
        .unwrap();

    assert_eq!(data.stats.total_commits, 0);
    assert_eq!(data.stats.total_cards, 0);
    assert!(data.cards.is_empty());
    assert!(data.unlinked_commits.is_empty());

    // An empty day still renders through the built-in template.
    let rendered = report::render(report::DEFAULT_TEMPLATE, &data).unwrap();
    assert!(rendered.contains("- **Commits:** 0"));
}

#[tokio::test]
async fn test_commits_grouped_by_card() {
    let (conn, user, repo_id) = setup().await;

    insert_commit(&conn, repo_id, "aaa111", "PDT-1: start work", Some("PDT-1"), 9).await;
    insert_commit(&conn, repo_id, "bbb222", "PDT-1: finish work", Some("PDT-1"), 11).await;
    insert_commit(&conn, repo_id, "ccc333", "tidy imports", None, 10).await;
    // Outside the requested day, must not appear.
    let next_day = db::commits::NewCommit {
        repo_id,
        sha: "ddd444".to_string(),
        message: "PDT-1: next day".to_string(),
        author: "dev".to_string(),
        author_email: "dev@example.com".to_string(),
        branch: "main".to_string(),
        date: Utc.with_ymd_and_hms(2026, 8, 30, 9, 0, 0).unwrap(),
        card_key: Some("PDT-1".to_string()),
    };
    db::commits::insert_if_new(&conn, next_day).await.unwrap();

    let data = report::build_report_data(&conn, None, &user, report_date())
        .await
        .unwrap();

    assert_eq!(data.stats.total_commits, 3);
    assert_eq!(data.stats.total_cards, 1);
    assert_eq!(data.cards.len(), 1);
    assert_eq!(data.cards[0].key, "PDT-1");
    assert_eq!(data.cards[0].commits.len(), 2);
    assert_eq!(data.unlinked_commits.len(), 1);
    assert_eq!(data.unlinked_commits[0].sha, "ccc333");
    assert_eq!(data.stats.repos, vec!["acme/worklog".to_string()]);
}

#[tokio::test]
async fn test_card_summary_from_local_mirror() {
    let (conn, user, repo_id) = setup().await;

    insert_commit(&conn, repo_id, "aaa111", "PDT-1: start work", Some("PDT-1"), 9).await;
    db::jira::upsert_card(
        &conn,
        user.id,
        "PDT-1",
        "Ship the report pipeline",
        "In Progress",
        "Dana",
        None,
        None,
    )
    .await
    .unwrap();

    let data = report::build_report_data(&conn, None, &user, report_date())
        .await
        .unwrap();

    assert_eq!(data.cards[0].summary, "Ship the report pipeline");
    assert_eq!(data.cards[0].status, "In Progress");
}

#[tokio::test]
async fn test_unknown_card_kept_with_empty_summary() {
    let (conn, user, repo_id) = setup().await;

    insert_commit(&conn, repo_id, "aaa111", "GHOST-7: mystery work", Some("GHOST-7"), 9).await;

    let data = report::build_report_data(&conn, None, &user, report_date())
        .await
        .unwrap();

    assert_eq!(data.cards.len(), 1);
    assert_eq!(data.cards[0].key, "GHOST-7");
    assert!(data.cards[0].summary.is_empty());
}

#[tokio::test]
async fn test_template_resolution_priority() {
    let (conn, user, _) = setup().await;

    // No templates at all: built-in wins.
    let (content, id) = report::resolve_template_content(&conn, user.id, None)
        .await
        .unwrap();
    assert_eq!(content, report::DEFAULT_TEMPLATE);
    assert!(id.is_none());

    let default_tmpl = db::templates::create(&conn, user.id, "mine", "default body")
        .await
        .unwrap();
    db::templates::set_default(&conn, user.id, default_tmpl.id)
        .await
        .unwrap();
    let other = db::templates::create(&conn, user.id, "other", "other body")
        .await
        .unwrap();

    // Flagged default wins when nothing is requested.
    let (content, id) = report::resolve_template_content(&conn, user.id, None)
        .await
        .unwrap();
    assert_eq!(content, "default body");
    assert_eq!(id, Some(default_tmpl.id));

    // An explicit request overrides the default.
    let (content, id) = report::resolve_template_content(&conn, user.id, Some(other.id))
        .await
        .unwrap();
    assert_eq!(content, "other body");
    assert_eq!(id, Some(other.id));

    // A missing ID falls through to the default instead of failing.
    let (content, _) = report::resolve_template_content(&conn, user.id, Some(Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(content, "default body");
}

#[tokio::test]
async fn test_auto_generation_continues_past_broken_user() {
    let (conn, broken, repo_id) = setup().await;
    let healthy = db::users::create(&conn, "healthy@example.com", "hash")
        .await
        .unwrap();
    let healthy_repo = db::repositories::create(
        &conn,
        healthy.id,
        "acme",
        "tools",
        Provider::Github,
        "https://github.com/acme/tools",
    )
    .await
    .unwrap();

    // The first user's default template references a field that does not
    // exist, so strict-mode rendering fails for them.
    let bad = db::templates::create(&conn, broken.id, "bad", "{{no_such_field}}")
        .await
        .unwrap();
    db::templates::set_default(&conn, broken.id, bad.id).await.unwrap();

    // Both users have a commit inside today's window.
    let today = Local::now().date_naive();
    let noon = Utc.from_utc_datetime(&today.and_hms_opt(12, 0, 0).unwrap());
    for (sha, repo) in [("aaa111", repo_id), ("bbb222", healthy_repo.id)] {
        let commit = db::commits::NewCommit {
            repo_id: repo,
            sha: sha.to_string(),
            message: "PDT-1: work".to_string(),
            author: "dev".to_string(),
            author_email: "dev@example.com".to_string(),
            branch: "main".to_string(),
            date: noon,
            card_key: Some("PDT-1".to_string()),
        };
        db::commits::insert_if_new(&conn, commit).await.unwrap();
    }

    let cipher = TokenCipher::new(&"ab".repeat(32)).unwrap();
    auto_reports::auto_generate_reports(&conn, &cipher, None)
        .await
        .unwrap();

    // The broken user is skipped, the healthy one still gets a report.
    assert!(db::reports::list_for_user(&conn, broken.id).await.unwrap().is_empty());
    let reports = db::reports::list_for_user(&conn, healthy.id).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].content.contains("PDT-1"));
}

#[tokio::test]
async fn test_requested_template_must_be_owned() {
    let (conn, user, _) = setup().await;
    let stranger = db::users::create(&conn, "other@example.com", "hash")
        .await
        .unwrap();
    let foreign = db::templates::create(&conn, stranger.id, "theirs", "their body")
        .await
        .unwrap();

    let (content, id) = report::resolve_template_content(&conn, user.id, Some(foreign.id))
        .await
        .unwrap();

    assert_eq!(content, report::DEFAULT_TEMPLATE);
    assert!(id.is_none());
}
