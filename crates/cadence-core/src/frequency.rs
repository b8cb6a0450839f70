//! Frequency vocabulary: how often a schedule fires, and how often jobs of
//! a given version are allowed to fire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Day-of-week restriction carried by bi-weekly and monthly shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayFilter {
    Any,
    Weekdays,
    Weekends,
}

/// Classification of a schedule expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyClass {
    Hourly,
    Daily,
    Weekly,
    BiWeekly(DayFilter),
    Monthly(DayFilter),
    SemiAnnual,
    Yearly,
    /// Numerically classifiable but matching no named pattern; fires a
    /// handful of times per month.
    Custom,
    /// Parse failure or pathological input. Never rewritten.
    Unclassifiable,
}

impl FrequencyClass {
    /// Rank on the coarseness scale; higher fires less often. `None` for
    /// expressions that could not be classified.
    ///
    /// `Custom` ranks alongside `Weekly`: three or four firings a month
    /// satisfies a weekly ceiling but violates anything coarser.
    pub fn coarseness(&self) -> Option<u8> {
        match self {
            FrequencyClass::Hourly => Some(0),
            FrequencyClass::Daily => Some(1),
            FrequencyClass::Weekly | FrequencyClass::Custom => Some(2),
            FrequencyClass::BiWeekly(_) => Some(3),
            FrequencyClass::Monthly(_) => Some(4),
            FrequencyClass::SemiAnnual => Some(5),
            FrequencyClass::Yearly => Some(6),
            FrequencyClass::Unclassifiable => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, FrequencyClass::Unclassifiable)
    }
}

impl fmt::Display for FrequencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = |filter: &DayFilter| match filter {
            DayFilter::Any => "",
            DayFilter::Weekdays => " (weekdays)",
            DayFilter::Weekends => " (weekends)",
        };
        match self {
            FrequencyClass::Hourly => write!(f, "hourly"),
            FrequencyClass::Daily => write!(f, "daily"),
            FrequencyClass::Weekly => write!(f, "weekly"),
            FrequencyClass::BiWeekly(filter) => write!(f, "bi-weekly{}", suffix(filter)),
            FrequencyClass::Monthly(filter) => write!(f, "monthly{}", suffix(filter)),
            FrequencyClass::SemiAnnual => write!(f, "semi-annual"),
            FrequencyClass::Yearly => write!(f, "yearly"),
            FrequencyClass::Custom => write!(f, "custom"),
            FrequencyClass::Unclassifiable => write!(f, "unclassifiable"),
        }
    }
}

/// Frequency ceiling applied to jobs of a given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyPolicy {
    Yearly,
    Monthly,
    BiWeekly,
    Weekly,
    /// Version is explicitly excluded from any rewriting.
    DoNotTouch,
    /// No ceiling; any frequency is acceptable.
    Unbounded,
}

impl FrequencyPolicy {
    /// Minimum coarseness a schedule must reach to satisfy this ceiling.
    /// `None` means there is nothing to enforce.
    pub fn required_coarseness(&self) -> Option<u8> {
        match self {
            FrequencyPolicy::Yearly => FrequencyClass::Yearly.coarseness(),
            FrequencyPolicy::Monthly => FrequencyClass::Monthly(DayFilter::Any).coarseness(),
            FrequencyPolicy::BiWeekly => FrequencyClass::BiWeekly(DayFilter::Any).coarseness(),
            FrequencyPolicy::Weekly => FrequencyClass::Weekly.coarseness(),
            FrequencyPolicy::DoNotTouch | FrequencyPolicy::Unbounded => None,
        }
    }

    /// Whether a classified schedule satisfies this ceiling.
    ///
    /// Unclassifiable input is admitted: malformed data is left alone
    /// rather than destructively rewritten.
    pub fn admits(&self, class: FrequencyClass) -> bool {
        match (self.required_coarseness(), class.coarseness()) {
            (Some(required), Some(actual)) => actual >= required,
            _ => true,
        }
    }

    /// Whether violating this ceiling leads to a rewrite.
    pub fn is_enforceable(&self) -> bool {
        self.required_coarseness().is_some()
    }
}

impl fmt::Display for FrequencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencyPolicy::Yearly => write!(f, "yearly"),
            FrequencyPolicy::Monthly => write!(f, "monthly"),
            FrequencyPolicy::BiWeekly => write!(f, "bi-weekly"),
            FrequencyPolicy::Weekly => write!(f, "weekly"),
            FrequencyPolicy::DoNotTouch => write!(f, "do-not-touch"),
            FrequencyPolicy::Unbounded => write!(f, "unbounded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coarseness_ordering() {
        let finer_to_coarser = [
            FrequencyClass::Hourly,
            FrequencyClass::Daily,
            FrequencyClass::Weekly,
            FrequencyClass::BiWeekly(DayFilter::Any),
            FrequencyClass::Monthly(DayFilter::Weekends),
            FrequencyClass::SemiAnnual,
            FrequencyClass::Yearly,
        ];
        for pair in finer_to_coarser.windows(2) {
            assert!(pair[0].coarseness() < pair[1].coarseness());
        }
    }

    #[test]
    fn test_custom_ranks_as_weekly() {
        assert_eq!(
            FrequencyClass::Custom.coarseness(),
            FrequencyClass::Weekly.coarseness()
        );
    }

    #[test]
    fn test_weekly_policy_admits_weekly_and_coarser() {
        let policy = FrequencyPolicy::Weekly;
        assert!(policy.admits(FrequencyClass::Weekly));
        assert!(policy.admits(FrequencyClass::Monthly(DayFilter::Any)));
        assert!(policy.admits(FrequencyClass::Yearly));
        assert!(!policy.admits(FrequencyClass::Daily));
        assert!(!policy.admits(FrequencyClass::Hourly));
    }

    #[test]
    fn test_biweekly_policy_rejects_custom() {
        assert!(!FrequencyPolicy::BiWeekly.admits(FrequencyClass::Custom));
        assert!(FrequencyPolicy::Weekly.admits(FrequencyClass::Custom));
    }

    #[test]
    fn test_yearly_policy_rejects_semi_annual() {
        assert!(!FrequencyPolicy::Yearly.admits(FrequencyClass::SemiAnnual));
        assert!(FrequencyPolicy::Yearly.admits(FrequencyClass::Yearly));
    }

    #[test]
    fn test_unbounded_admits_everything() {
        for class in [
            FrequencyClass::Hourly,
            FrequencyClass::Custom,
            FrequencyClass::Unclassifiable,
        ] {
            assert!(FrequencyPolicy::Unbounded.admits(class));
            assert!(FrequencyPolicy::DoNotTouch.admits(class));
        }
    }

    #[test]
    fn test_unclassifiable_is_always_admitted() {
        for policy in [
            FrequencyPolicy::Yearly,
            FrequencyPolicy::Monthly,
            FrequencyPolicy::BiWeekly,
            FrequencyPolicy::Weekly,
        ] {
            assert!(policy.admits(FrequencyClass::Unclassifiable));
        }
    }

    #[test]
    fn test_policy_monotonicity() {
        // Anything admitted under a stricter ceiling is admitted under
        // every looser one.
        let stricter_to_looser = [
            FrequencyPolicy::Yearly,
            FrequencyPolicy::Monthly,
            FrequencyPolicy::BiWeekly,
            FrequencyPolicy::Weekly,
        ];
        let classes = [
            FrequencyClass::Hourly,
            FrequencyClass::Daily,
            FrequencyClass::Weekly,
            FrequencyClass::BiWeekly(DayFilter::Weekdays),
            FrequencyClass::Monthly(DayFilter::Any),
            FrequencyClass::SemiAnnual,
            FrequencyClass::Yearly,
            FrequencyClass::Custom,
        ];
        for pair in stricter_to_looser.windows(2) {
            for class in classes {
                if pair[0].admits(class) {
                    assert!(pair[1].admits(class), "{:?} vs {:?}", pair, class);
                }
            }
        }
    }
}
