//! Progress estimation for in-flight builds.

#![warn(missing_docs)]

pub mod estimator;

pub use estimator::ProgressEstimator;
