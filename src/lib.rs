//! Worklog server library.
//!
//! Syncs source-control commits and issue-tracker cards into local storage
//! and renders them into daily markdown reports.

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod entity;
pub mod error;
pub mod migration;
pub mod models;
pub mod services;
pub mod sync;
