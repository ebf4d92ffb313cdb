//! API endpoint modules.

pub mod auth;
pub mod commits;
pub mod health;
pub mod reports;
pub mod repositories;
pub mod sync;
pub mod templates;
pub mod users;

pub use auth::configure_routes as configure_auth_routes;
pub use commits::configure_routes as configure_commit_routes;
pub use health::configure_health_routes;
pub use reports::configure_routes as configure_report_routes;
pub use repositories::configure_routes as configure_repository_routes;
pub use sync::configure_routes as configure_sync_routes;
pub use templates::configure_routes as configure_template_routes;
pub use users::configure_routes as configure_user_routes;
