//! SeaORM entity definitions.

pub mod commit;
pub mod commit_card_link;
pub mod jira_card;
pub mod report;
pub mod report_template;
pub mod repository;
pub mod sprint;
pub mod user;
