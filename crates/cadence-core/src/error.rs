//! Error types for cadence.
//!
//! Most failure conditions in this tool are not errors: missing
//! identities, unparsable versions, and unclassifiable schedules are
//! contained to the offending record and surface as
//! [`crate::ports::Diagnostic`] values. This enum covers what actually
//! propagates — per-file infrastructure failures and version parsing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unparsable version label: {0}")]
    UnparsableVersion(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
