//! The per-job decision procedure: exemptions, policy lookup,
//! classification, and replacement, applied to one record at a time.

use crate::classify::{ReferenceWindow, classify};
use crate::generate::generate;
use crate::policy::{PolicyTable, Resolution};
use cadence_core::decision::{Change, Decision, ExemptReason};
use cadence_core::frequency::FrequencyPolicy;
use cadence_core::job::JobRecord;
use cadence_core::ports::{Diagnostic, DiagnosticSink, TracingSink};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything operators may want to change, passed in explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identity prefixes that exempt a job from any rewriting.
    pub exempt_prefixes: Vec<String>,
    /// Version breakpoints for the policy tiers.
    pub policies: PolicyTable,
    /// Calendar month used by simulation-based classification.
    pub reference_window: ReferenceWindow,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exempt_prefixes: vec!["promote-".to_owned(), "mirror-nightly-image".to_owned()],
            policies: PolicyTable::default(),
            reference_window: ReferenceWindow::default(),
        }
    }
}

/// Stateless per-record decision engine. Holds no mutable state, so one
/// instance can serve any number of records and documents, concurrently.
pub struct DecisionEngine {
    config: EngineConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl DecisionEngine {
    pub fn new(config: EngineConfig, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            config,
            diagnostics,
        }
    }

    /// Engine with default breakpoints, reporting through `tracing` only.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default(), Arc::new(TracingSink))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decide one job record against a resolved version label, applying
    /// any mutation to the record in place.
    pub fn decide(&self, job: &mut JobRecord<'_>, version: &str) -> Decision {
        let Some(identity) = job.identity().map(str::to_owned) else {
            self.diagnostics.report(Diagnostic::MissingIdentity {
                record: job.render(),
            });
            return Decision::Exempted(ExemptReason::MissingIdentity);
        };

        // Exemption overrides everything, including conflict cleanup.
        if let Some(prefix) = self.exempt_prefix(&identity) {
            tracing::debug!(job = %identity, prefix, "exempt prefix, skipping");
            return Decision::Exempted(ExemptReason::Prefix(prefix.to_owned()));
        }

        let policy = match self.config.policies.resolve(version) {
            Resolution::Excluded => return Decision::Exempted(ExemptReason::PrivateBuild),
            Resolution::Unparsable { detail } => {
                self.diagnostics.report(Diagnostic::UnparsableVersion {
                    label: version.to_owned(),
                    detail,
                });
                FrequencyPolicy::Unbounded
            }
            Resolution::Apply(FrequencyPolicy::DoNotTouch) => {
                return Decision::Exempted(ExemptReason::FrozenVersion);
            }
            Resolution::Apply(policy) => policy,
        };

        let mut changes = Vec::new();

        // A record carrying both fields keeps the cron; the stray interval
        // is dropped even when nothing else changes.
        if job.interval().is_some() && job.cron().is_some() {
            job.remove_interval();
            self.diagnostics.report(Diagnostic::ScheduleConflict {
                job: identity.clone(),
            });
            changes.push(Change::DroppedInterval);
        }

        let Some(expr) = job.cron().or_else(|| job.interval()).map(str::to_owned) else {
            self.diagnostics.report(Diagnostic::UnclassifiableSchedule {
                job: identity,
                expr: String::new(),
                detail: Some("record has no interval or cron field".to_owned()),
            });
            return seal(changes);
        };

        let classification = classify(&expr, &self.config.reference_window);
        if !classification.class.is_classified() {
            self.diagnostics.report(Diagnostic::UnclassifiableSchedule {
                job: identity,
                expr,
                detail: classification.detail,
            });
            return seal(changes);
        }

        if policy.admits(classification.class) {
            tracing::debug!(
                job = %identity,
                class = %classification.class,
                %policy,
                "schedule within ceiling"
            );
            return seal(changes);
        }

        let Some(replacement) = generate(policy, &mut rand::thread_rng()) else {
            // admits() accepts everything under unenforceable policies, so
            // this arm is unreachable; stay a no-op if that ever changes.
            return seal(changes);
        };
        job.remove_interval();
        job.set_cron(replacement.clone());
        tracing::info!(
            job = %identity,
            from = %expr,
            to = %replacement,
            class = %classification.class,
            %policy,
            "schedule replaced"
        );
        changes.push(Change::Rewrote {
            previous: expr,
            cron: replacement,
        });
        seal(changes)
    }

    fn exempt_prefix(&self, identity: &str) -> Option<&str> {
        self.config
            .exempt_prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| identity.starts_with(prefix))
    }
}

fn seal(changes: Vec<Change>) -> Decision {
    if changes.is_empty() {
        Decision::Unchanged
    } else {
        Decision::Replaced { changes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::ports::CollectingSink;
    use pretty_assertions::assert_eq;
    use serde_yaml::Mapping;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn engine_with_sink() -> (DecisionEngine, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let engine = DecisionEngine::new(EngineConfig::default(), sink.clone());
        (engine, sink)
    }

    #[test]
    fn test_exempt_prefix_overrides_everything() {
        let (engine, _) = engine_with_sink();
        let mut m = mapping("name: promote-release\ninterval: 1h\n");
        let before = m.clone();

        let decision = engine.decide(&mut JobRecord::new(&mut m), "4.13");
        assert_eq!(
            decision,
            Decision::Exempted(ExemptReason::Prefix("promote-".to_owned()))
        );
        assert_eq!(m, before);
    }

    #[test]
    fn test_missing_identity_is_exempted_and_reported() {
        let (engine, sink) = engine_with_sink();
        let mut m = mapping("interval: 1h\n");

        let decision = engine.decide(&mut JobRecord::new(&mut m), "4.13");
        assert_eq!(decision, Decision::Exempted(ExemptReason::MissingIdentity));
        assert!(matches!(
            sink.drain().as_slice(),
            [Diagnostic::MissingIdentity { .. }]
        ));
    }

    #[test]
    fn test_private_build_and_frozen_version_are_exempted() {
        let (engine, _) = engine_with_sink();
        let mut m = mapping("name: e2e\ninterval: 1h\n");
        assert_eq!(
            engine.decide(&mut JobRecord::new(&mut m), "4.13-priv"),
            Decision::Exempted(ExemptReason::PrivateBuild)
        );
        assert_eq!(
            engine.decide(&mut JobRecord::new(&mut m), "4.12"),
            Decision::Exempted(ExemptReason::FrozenVersion)
        );
        assert_eq!(m, mapping("name: e2e\ninterval: 1h\n"));
    }

    #[test]
    fn test_violating_interval_is_replaced_with_weekend_weekly() {
        let (engine, _) = engine_with_sink();
        let mut m = mapping("name: e2e-aws\ninterval: 4h\n");

        let decision = engine.decide(&mut JobRecord::new(&mut m), "4.13");
        let Decision::Replaced { changes } = decision else {
            panic!("expected replacement, got {decision:?}");
        };
        assert_eq!(changes.len(), 1);

        assert!(!m.contains_key("interval"));
        let cron = m.get("cron").unwrap().as_str().unwrap();
        let dow = cron.split_whitespace().last().unwrap();
        assert!(dow == "6" || dow == "0", "day-of-week was {dow}");
    }

    #[test]
    fn test_compliant_biweekly_cron_is_unchanged() {
        let (engine, _) = engine_with_sink();
        let mut m = mapping("name: nightly-scan\ncron: 0 3 */14 * 1-5\n");
        assert_eq!(
            engine.decide(&mut JobRecord::new(&mut m), "4.9"),
            Decision::Unchanged
        );
        assert_eq!(m.get("cron").unwrap().as_str(), Some("0 3 */14 * 1-5"));
    }

    #[test]
    fn test_monthly_interval_violates_yearly_ceiling() {
        let (engine, _) = engine_with_sink();
        let mut m = mapping("name: legacy-check\ninterval: '@monthly'\n");

        let decision = engine.decide(&mut JobRecord::new(&mut m), "4.6");
        assert!(decision.is_change());
        assert!(!m.contains_key("interval"));
        // Yearly shape: fixed day and month.
        let cron = m.get("cron").unwrap().as_str().unwrap();
        let fields: Vec<&str> = cron.split_whitespace().collect();
        assert!(fields[2].parse::<u32>().is_ok());
        assert!(fields[3].parse::<u32>().is_ok());
    }

    #[test]
    fn test_conflict_drop_counts_as_replaced_even_when_cron_complies() {
        let (engine, sink) = engine_with_sink();
        let mut m = mapping("name: e2e\ninterval: 4h\ncron: 17 23 * * 6\n");

        let decision = engine.decide(&mut JobRecord::new(&mut m), "4.13");
        assert_eq!(
            decision,
            Decision::Replaced {
                changes: vec![Change::DroppedInterval]
            }
        );
        assert!(!m.contains_key("interval"));
        assert_eq!(m.get("cron").unwrap().as_str(), Some("17 23 * * 6"));
        assert!(matches!(
            sink.drain().as_slice(),
            [Diagnostic::ScheduleConflict { .. }]
        ));
    }

    #[test]
    fn test_unclassifiable_schedule_is_conservative_noop() {
        let (engine, sink) = engine_with_sink();
        let mut m = mapping("name: odd\ncron: not a cron at all\n");
        let before = m.clone();

        assert_eq!(
            engine.decide(&mut JobRecord::new(&mut m), "4.13"),
            Decision::Unchanged
        );
        assert_eq!(m, before);
        assert!(matches!(
            sink.drain().as_slice(),
            [Diagnostic::UnclassifiableSchedule { .. }]
        ));
    }

    #[test]
    fn test_record_without_schedule_is_reported_not_rewritten() {
        let (engine, sink) = engine_with_sink();
        let mut m = mapping("name: no-schedule\n");

        assert_eq!(
            engine.decide(&mut JobRecord::new(&mut m), "4.13"),
            Decision::Unchanged
        );
        assert_eq!(m, mapping("name: no-schedule\n"));
        assert!(matches!(
            sink.drain().as_slice(),
            [Diagnostic::UnclassifiableSchedule { .. }]
        ));
    }

    #[test]
    fn test_unparsable_version_leaves_record_unbounded() {
        let (engine, sink) = engine_with_sink();
        let mut m = mapping("name: e2e\ninterval: 1h\n");

        assert_eq!(
            engine.decide(&mut JobRecord::new(&mut m), "main"),
            Decision::Unchanged
        );
        assert!(matches!(
            sink.drain().as_slice(),
            [Diagnostic::UnparsableVersion { .. }]
        ));
    }

    #[test]
    fn test_decide_is_idempotent() {
        let (engine, _) = engine_with_sink();
        for (schedule, version) in [
            ("interval: 4h", "4.13"),
            ("cron: 0 */2 * * *", "4.9"),
            ("interval: 30m", "4.6"),
        ] {
            let mut m = mapping(&format!("name: job\n{schedule}\n"));
            let first = engine.decide(&mut JobRecord::new(&mut m), version);
            assert!(first.is_change(), "first pass for {schedule}/{version}");

            let second = engine.decide(&mut JobRecord::new(&mut m), version);
            assert_eq!(
                second,
                Decision::Unchanged,
                "second pass for {schedule}/{version}"
            );
        }
    }
}
