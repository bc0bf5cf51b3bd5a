//! Offender directory: maps change metadata to known sponsors.

#![warn(missing_docs)]

pub mod service;
pub mod known;

pub use service::{DirectoryError, OffenderDirectory, Result};
pub use known::{KnownOffenders, Offender};
