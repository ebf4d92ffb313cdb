//! External service clients and report generation.

pub mod jira;
pub mod providers;
pub mod report;
pub mod storage;
