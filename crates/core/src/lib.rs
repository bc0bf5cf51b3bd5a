//! buildwatch core data models.
//!
//! This crate defines the normalized view of CI backends that the
//! resolution engine works on: statuses, build snapshots, investigations,
//! sponsors and the per-target detail handed to dashboards.

#![warn(missing_docs)]

// Identities
mod id;

// Status and progress
mod status;
mod percentage;

// Backend snapshots
mod build;
mod investigation;
mod sponsor;

// Targets
mod target;

// Re-exports
pub use id::TargetId;
pub use status::Status;
pub use percentage::Percentage;
pub use build::{BuildRef, BuildSnapshot, Change, RunningBuild};
pub use investigation::Investigation;
pub use sponsor::Sponsor;
pub use target::{Feature, TargetDetail, TargetHandle};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

/// The zero timestamp (Unix epoch), used for targets that were never inspected.
pub fn epoch() -> Time {
    chrono::DateTime::<chrono::Utc>::UNIX_EPOCH
}
