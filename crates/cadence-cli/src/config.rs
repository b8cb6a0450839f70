//! Tool configuration.

use cadence_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "cadence.yaml";

/// On-disk configuration. Every field has a default, so a missing or
/// partial file is never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Engine knobs: exempt prefixes, policy breakpoints, reference window.
    #[serde(flatten)]
    pub engine: EngineConfig,
    /// Label keys marking generated records; such records are never touched.
    pub generator_labels: Vec<String>,
    /// Label key carrying a release version on periodics.
    pub release_label: String,
    /// Process only paths containing one of these substrings (everything
    /// when empty).
    pub path_filters: Vec<String>,
    /// Append-only log of applied changes.
    pub change_log: PathBuf,
    /// Report of records lacking both `as` and `name`.
    pub missing_identity_log: PathBuf,
    /// Record of expressions the classifier could not place.
    pub unclassifiable_log: PathBuf,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            generator_labels: vec!["ci.openshift.io/generator".to_owned()],
            release_label: "job-release".to_owned(),
            path_filters: Vec::new(),
            change_log: PathBuf::from("cadence-changes.log"),
            missing_identity_log: PathBuf::from("cadence-missing-identity.log"),
            unclassifiable_log: PathBuf::from("cadence-unclassifiable.log"),
        }
    }
}

impl CadenceConfig {
    /// Load from an explicit path, else `cadence.yaml` in the working
    /// directory, else defaults. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let candidate = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if candidate.exists() {
            let content = std::fs::read_to_string(&candidate)?;
            Ok(serde_yaml::from_str(&content)?)
        } else if path.is_some() {
            Err(format!("config file {} not found", candidate.display()).into())
        } else {
            Ok(Self::default())
        }
    }
}
