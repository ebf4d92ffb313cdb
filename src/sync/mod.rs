//! Background synchronization engines, scheduler and status tracking.

pub mod commits;
pub mod issues;
pub mod reports;
pub mod scheduler;
pub mod status;

pub use scheduler::Scheduler;
pub use status::SyncStatus;
