//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260829_000001_create_users;
mod m20260829_000002_create_repositories;
mod m20260829_000003_create_commits;
mod m20260829_000004_create_commit_card_links;
mod m20260829_000005_create_sprints;
mod m20260829_000006_create_jira_cards;
mod m20260829_000007_create_report_templates;
mod m20260829_000008_create_reports;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260829_000001_create_users::Migration),
            Box::new(m20260829_000002_create_repositories::Migration),
            Box::new(m20260829_000003_create_commits::Migration),
            Box::new(m20260829_000004_create_commit_card_links::Migration),
            Box::new(m20260829_000005_create_sprints::Migration),
            Box::new(m20260829_000006_create_jira_cards::Migration),
            Box::new(m20260829_000007_create_report_templates::Migration),
            Box::new(m20260829_000008_create_reports::Migration),
        ]
    }
}
