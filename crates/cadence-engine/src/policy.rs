//! Version-to-policy resolution.

use cadence_core::frequency::FrequencyPolicy;
use cadence_core::version::VersionLabel;
use serde::{Deserialize, Serialize};

/// Outcome of resolving a raw version label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Private build; the record must be skipped entirely rather than
    /// given any policy.
    Excluded,
    /// Label did not parse; jobs under it are left unbounded.
    Unparsable { detail: String },
    /// Ceiling to enforce for this version.
    Apply(FrequencyPolicy),
}

/// Version breakpoints defining the policy tiers.
///
/// Breakpoints are data, not code: operators move them release by release
/// through configuration without touching the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTable {
    /// The release currently under active test; weekly ceiling.
    pub current: VersionLabel,
    /// Releases frozen mid-transition; never rewritten.
    pub frozen: Vec<VersionLabel>,
    /// Inclusive range of maintained legacy releases; bi-weekly ceiling.
    /// Anything strictly below the floor drops to a yearly ceiling.
    pub legacy_floor: VersionLabel,
    pub legacy_ceiling: VersionLabel,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            current: VersionLabel::new(4, 13),
            frozen: vec![VersionLabel::new(4, 12)],
            legacy_floor: VersionLabel::new(4, 7),
            legacy_ceiling: VersionLabel::new(4, 11),
        }
    }
}

impl PolicyTable {
    /// Resolve a raw version label to the applicable ceiling.
    ///
    /// Never fails to the caller: unparsable labels resolve to
    /// [`Resolution::Unparsable`] with a warning, and versions outside
    /// every tier (including above `current`) are unbounded.
    pub fn resolve(&self, label: &str) -> Resolution {
        if VersionLabel::is_private(label) {
            return Resolution::Excluded;
        }
        let version = match label.parse::<VersionLabel>() {
            Ok(version) => version,
            Err(err) => {
                tracing::warn!(label, %err, "unparsable version label, leaving jobs unbounded");
                return Resolution::Unparsable {
                    detail: err.to_string(),
                };
            }
        };
        let policy = if version == self.current {
            FrequencyPolicy::Weekly
        } else if self.frozen.contains(&version) {
            FrequencyPolicy::DoNotTouch
        } else if version >= self.legacy_floor && version <= self.legacy_ceiling {
            FrequencyPolicy::BiWeekly
        } else if version < self.legacy_floor {
            FrequencyPolicy::Yearly
        } else {
            FrequencyPolicy::Unbounded
        };
        Resolution::Apply(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(label: &str) -> Resolution {
        PolicyTable::default().resolve(label)
    }

    #[test]
    fn test_default_tiers() {
        assert_eq!(resolve("4.13"), Resolution::Apply(FrequencyPolicy::Weekly));
        assert_eq!(
            resolve("4.12"),
            Resolution::Apply(FrequencyPolicy::DoNotTouch)
        );
        for label in ["4.7", "4.9", "4.11"] {
            assert_eq!(
                resolve(label),
                Resolution::Apply(FrequencyPolicy::BiWeekly),
                "for {label}"
            );
        }
        assert_eq!(resolve("4.6"), Resolution::Apply(FrequencyPolicy::Yearly));
        assert_eq!(resolve("3.11"), Resolution::Apply(FrequencyPolicy::Yearly));
        assert_eq!(
            resolve("4.14"),
            Resolution::Apply(FrequencyPolicy::Unbounded)
        );
    }

    #[test]
    fn test_stream_prefix_and_qualifier() {
        assert_eq!(
            resolve("scos-4.13"),
            Resolution::Apply(FrequencyPolicy::Weekly)
        );
        assert_eq!(
            resolve("4.9-stable"),
            Resolution::Apply(FrequencyPolicy::BiWeekly)
        );
    }

    #[test]
    fn test_private_builds_are_excluded_before_parsing() {
        assert_eq!(resolve("4.13-priv"), Resolution::Excluded);
        assert_eq!(resolve("garbage-priv"), Resolution::Excluded);
    }

    #[test]
    fn test_unparsable_label_resolves_to_fallback() {
        assert!(matches!(resolve("not-a-version"), Resolution::Unparsable { .. }));
        assert!(matches!(resolve(""), Resolution::Unparsable { .. }));
    }

    #[test]
    fn test_breakpoints_are_configuration() {
        let table = PolicyTable {
            current: VersionLabel::new(5, 2),
            frozen: vec![VersionLabel::new(5, 1)],
            legacy_floor: VersionLabel::new(4, 14),
            legacy_ceiling: VersionLabel::new(5, 0),
        };
        assert_eq!(
            table.resolve("5.2"),
            Resolution::Apply(FrequencyPolicy::Weekly)
        );
        assert_eq!(
            table.resolve("4.16"),
            Resolution::Apply(FrequencyPolicy::BiWeekly)
        );
        assert_eq!(
            table.resolve("4.13"),
            Resolution::Apply(FrequencyPolicy::Yearly)
        );
    }
}
