//! Locating job records and version labels inside loaded documents.
//!
//! Two document shapes carry periodic jobs: ci-operator-style configs (a
//! `tests` sequence governed by the release version under
//! `releases.latest`) and job files (a `periodics` sequence where each
//! record resolves its own version from `extra_refs` base refs or a
//! release label). Everything else in a document is left untouched.

use cadence_core::decision::Decision;
use cadence_core::job::JobRecord;
use cadence_engine::DecisionEngine;
use serde_yaml::{Mapping, Value};

/// Document-shape knobs taken from the configuration file.
pub struct ScanOptions<'a> {
    pub generator_labels: &'a [String],
    pub release_label: &'a str,
}

/// Outcome of scanning one document.
#[derive(Debug, Default)]
pub struct DocumentOutcome {
    pub changed: bool,
    /// Change-log lines, one per applied change.
    pub notes: Vec<String>,
}

/// Apply the engine to every job record reachable in the document. The
/// document is changed iff any record decision was a replacement.
pub fn process_document(
    doc: &mut Value,
    engine: &DecisionEngine,
    options: &ScanOptions<'_>,
) -> DocumentOutcome {
    let mut outcome = DocumentOutcome::default();
    process_config_tests(doc, engine, &mut outcome);
    process_periodics(doc, engine, options, &mut outcome);
    outcome
}

/// ci-operator config shape: one release version governs every test.
fn process_config_tests(doc: &mut Value, engine: &DecisionEngine, outcome: &mut DocumentOutcome) {
    let Some(version) = release_version(doc) else {
        return;
    };
    let Some(tests) = doc.get_mut("tests").and_then(Value::as_sequence_mut) else {
        return;
    };
    for test in tests {
        if let Some(mapping) = test.as_mapping_mut() {
            decide_record(mapping, &version, engine, outcome);
        }
    }
}

/// Job-file shape: every periodic resolves its own version.
fn process_periodics(
    doc: &mut Value,
    engine: &DecisionEngine,
    options: &ScanOptions<'_>,
    outcome: &mut DocumentOutcome,
) {
    let Some(periodics) = doc.get_mut("periodics").and_then(Value::as_sequence_mut) else {
        return;
    };
    for periodic in periodics {
        let Some(mapping) = periodic.as_mapping_mut() else {
            continue;
        };
        let record = JobRecord::new(mapping);
        if options
            .generator_labels
            .iter()
            .any(|label| record.has_label(label))
        {
            continue;
        }
        let Some(version) = periodic_version(&record, options.release_label) else {
            tracing::info!(
                job = record.identity().unwrap_or("<unnamed>"),
                "no resolvable version on periodic, skipping"
            );
            continue;
        };
        decide_record(mapping, &version, engine, outcome);
    }
}

fn decide_record(
    mapping: &mut Mapping,
    version: &str,
    engine: &DecisionEngine,
    outcome: &mut DocumentOutcome,
) {
    let mut record = JobRecord::new(mapping);
    let name = record.identity().unwrap_or("<unnamed>").to_owned();
    if let Decision::Replaced { changes } = engine.decide(&mut record, version) {
        outcome.changed = true;
        for change in changes {
            outcome.notes.push(format!("{name}: {change}"));
        }
    }
}

/// Version label of a ci-operator config: the first ref under
/// `releases.latest`, reading `version`, then `name`, then
/// `version_bounds.upper`.
fn release_version(doc: &Value) -> Option<String> {
    let latest = doc.get("releases")?.get("latest")?.as_mapping()?;
    let (_, release) = latest.iter().next()?;
    let version = release
        .get("version")
        .or_else(|| release.get("name"))
        .or_else(|| release.get("version_bounds")?.get("upper"))?;
    version.as_str().map(str::to_owned)
}

/// Version from the first `<stream>-<version>` base ref, else the release
/// label. Base refs of any other shape are logged and passed over.
fn periodic_version(record: &JobRecord<'_>, release_label: &str) -> Option<String> {
    for base_ref in record.base_refs() {
        let parts: Vec<&str> = base_ref.split('-').collect();
        match parts.as_slice() {
            [_, version] if !version.is_empty() => return Some((*version).to_owned()),
            _ => tracing::info!(base_ref, "unrecognized base_ref shape"),
        }
    }
    record.label(release_label).map(str::to_owned)
}
