//! Shared error types for the patch-priority analyzer and differential replay driver.
//!
//! Error categories follow the taxonomy used across the workspace:
//! configuration, filesystem, IR-shape surprises, and replay failures.

pub mod error;

pub use error::*;
