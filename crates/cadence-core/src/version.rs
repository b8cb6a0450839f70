//! Version labels attached to jobs and release payloads.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Marker segment identifying a private build; such records are excluded
/// from processing entirely.
pub const PRIVATE_MARKER: &str = "priv";

/// Stream prefix stripped before parsing (e.g. `scos-4.13`).
const STREAM_PREFIX: &str = "scos-";

/// A `major.minor[.patch]` version label.
///
/// Ordering and equality treat an absent patch as zero, so `4.13` and
/// `4.13.0` compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionLabel {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}

impl VersionLabel {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: None,
        }
    }

    /// Whether a raw label carries the private-build marker as one of its
    /// dash-separated segments.
    pub fn is_private(label: &str) -> bool {
        label.split('-').any(|segment| segment == PRIVATE_MARKER)
    }

    fn key(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch.unwrap_or(0))
    }
}

impl FromStr for VersionLabel {
    type Err = Error;

    /// Parse a raw label as it appears in release metadata: an optional
    /// `scos-` stream prefix, the numeric version, and an optional
    /// `-<qualifier>` suffix which is split off before comparison.
    fn from_str(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::UnparsableVersion(s.to_owned()));
        }
        let stripped = trimmed.strip_prefix(STREAM_PREFIX).unwrap_or(trimmed);
        let numeric = stripped.split('-').next().unwrap_or(stripped);

        let mut parts = numeric.split('.');
        let major = parse_component(parts.next(), s)?;
        let minor = parse_component(parts.next(), s)?;
        let patch = match parts.next() {
            Some(part) => Some(parse_component(Some(part), s)?),
            None => None,
        };
        if parts.next().is_some() {
            return Err(Error::UnparsableVersion(s.to_owned()));
        }
        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

fn parse_component(part: Option<&str>, raw: &str) -> Result<u32, Error> {
    part.and_then(|p| p.parse().ok())
        .ok_or_else(|| Error::UnparsableVersion(raw.to_owned()))
}

impl TryFrom<String> for VersionLabel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        value.parse()
    }
}

impl From<VersionLabel> for String {
    fn from(label: VersionLabel) -> Self {
        label.to_string()
    }
}

impl PartialEq for VersionLabel {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for VersionLabel {}

impl PartialOrd for VersionLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_major_minor() {
        let label: VersionLabel = "4.13".parse().unwrap();
        assert_eq!((label.major, label.minor, label.patch), (4, 13, None));
    }

    #[test]
    fn test_parse_with_patch() {
        let label: VersionLabel = "4.13.2".parse().unwrap();
        assert_eq!(label.patch, Some(2));
    }

    #[test]
    fn test_parse_strips_stream_prefix() {
        let label: VersionLabel = "scos-4.12".parse().unwrap();
        assert_eq!(label, VersionLabel::new(4, 12));
    }

    #[test]
    fn test_parse_splits_qualifier_suffix() {
        let label: VersionLabel = "4.10-stable".parse().unwrap();
        assert_eq!(label, VersionLabel::new(4, 10));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "  ", "4", "four.ten", "4.x", "1.2.3.4"] {
            assert!(raw.parse::<VersionLabel>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_private_marker_detection() {
        assert!(VersionLabel::is_private("4.11-priv"));
        assert!(VersionLabel::is_private("scos-4.11-priv-build"));
        assert!(!VersionLabel::is_private("4.11"));
        // Substrings of other words do not count.
        assert!(!VersionLabel::is_private("4.11-privileged"));
    }

    #[test]
    fn test_ordering_treats_missing_patch_as_zero() {
        let plain: VersionLabel = "4.13".parse().unwrap();
        let zero: VersionLabel = "4.13.0".parse().unwrap();
        let patched: VersionLabel = "4.13.5".parse().unwrap();
        assert_eq!(plain, zero);
        assert!(plain < patched);
        assert!("4.9".parse::<VersionLabel>().unwrap() < plain);
    }
}
