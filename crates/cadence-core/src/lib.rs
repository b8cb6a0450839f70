//! Cadence Core
//!
//! Domain vocabulary shared across the cadence crates: frequency classes
//! and policies, version labels, the job-record view, decision types, and
//! the diagnostic port. This crate has minimal dependencies and defines
//! the shared vocabulary used by the engine and the CLI.

pub mod decision;
pub mod error;
pub mod frequency;
pub mod job;
pub mod ports;
pub mod version;

pub use error::{Error, Result};
