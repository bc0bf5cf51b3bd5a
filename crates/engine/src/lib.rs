//! Status resolution and blame attribution.
//!
//! Turns raw backend snapshots into one [`TargetDetail`] per monitored
//! target and works out who is implicated when a target is broken.
//!
//! [`TargetDetail`]: buildwatch_core::TargetDetail

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod attributor;
pub mod resolver;
pub mod catalog;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use attributor::{attribution_text, SponsorAttributor};
pub use resolver::StatusResolver;
pub use catalog::TargetCatalog;
