//! Backend adapter abstraction for buildwatch.
//!
//! This crate provides the trait every CI backend adapter implements, the
//! per-dialect status translation tables, and an in-memory reference adapter
//! loaded from a JSON fixture.

#![warn(missing_docs)]

pub mod trait_;
pub mod dialect;
pub mod memory;

pub use trait_::{Backend, BackendError, Result};
pub use dialect::{jenkins_is_building, jenkins_status, teamcity_status, Dialect};
pub use memory::{Fixture, FixtureBuild, FixtureTarget, MemoryBackend, TargetRecord};
