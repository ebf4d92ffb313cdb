//! Shared domain enums and API data transfer objects.

pub mod provider;
pub mod sync;
pub mod user;

pub use provider::Provider;
pub use sync::{CommitSyncResult, SyncInfo, SyncState};
pub use user::UserResponse;
