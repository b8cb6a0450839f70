//! Command handlers.

use crate::config::{CadenceConfig, DEFAULT_CONFIG_FILE};
use crate::document::{ScanOptions, process_document};
use crate::logs::{ChangeLog, FileSink};
use cadence_engine::DecisionEngine;
use cadence_engine::classify::classify;
use console::style;
use rayon::prelude::*;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// What happened to one file.
struct FileReport {
    path: PathBuf,
    changed: bool,
    notes: Vec<String>,
    error: Option<String>,
}

/// Normalize schedules across the given paths, in parallel.
pub fn run(paths: &[PathBuf], config: &CadenceConfig, dry_run: bool) -> CliResult {
    let files = discover(paths, &config.path_filters)?;
    if files.is_empty() {
        println!("{} no YAML files matched", style("!").yellow());
        return Ok(());
    }

    let sink = Arc::new(FileSink::open(config)?);
    let engine = DecisionEngine::new(config.engine.clone(), sink);
    let change_log = ChangeLog::open(&config.change_log)?;

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|file| {
            let report = process_file(file, &engine, config, dry_run);
            if report.changed && !dry_run {
                change_log.record(&report.path, &report.notes);
            }
            report
        })
        .collect();

    summarize(&reports, dry_run);
    Ok(())
}

fn process_file(
    path: &Path,
    engine: &DecisionEngine,
    config: &CadenceConfig,
    dry_run: bool,
) -> FileReport {
    let mut report = FileReport {
        path: path.to_path_buf(),
        changed: false,
        notes: Vec::new(),
        error: None,
    };
    let options = ScanOptions {
        generator_labels: &config.generator_labels,
        release_label: &config.release_label,
    };

    let mut documents = match load_documents(path) {
        Ok(documents) => documents,
        Err(err) => {
            report.error = Some(err.to_string());
            return report;
        }
    };

    for doc in &mut documents {
        let outcome = process_document(doc, engine, &options);
        report.changed |= outcome.changed;
        report.notes.extend(outcome.notes);
    }

    if report.changed && !dry_run {
        if let Err(err) = write_documents(path, &documents) {
            report.error = Some(err.to_string());
        }
    }
    report
}

/// Parse one file as a multi-document YAML stream.
fn load_documents(path: &Path) -> cadence_core::Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    let mut documents = Vec::new();
    for de in serde_yaml::Deserializer::from_str(&content) {
        documents.push(Value::deserialize(de)?);
    }
    Ok(documents)
}

/// Render and write back a multi-document YAML stream.
fn write_documents(path: &Path, documents: &[Value]) -> cadence_core::Result<()> {
    let mut out = String::new();
    for (index, doc) in documents.iter().enumerate() {
        if index > 0 {
            out.push_str("---\n");
        }
        out.push_str(&serde_yaml::to_string(doc)?);
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Expand paths to YAML files, applying the configured path filters.
fn discover(paths: &[PathBuf], filters: &[String]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path) {
                let entry = entry?;
                if entry.file_type().is_file() && is_yaml(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    files.retain(|file| matches_filters(file, filters));
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

/// An empty filter set admits everything.
fn matches_filters(path: &Path, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let text = path.to_string_lossy();
    filters.iter().any(|filter| text.contains(filter.as_str()))
}

fn summarize(reports: &[FileReport], dry_run: bool) {
    let changed: Vec<&FileReport> = reports.iter().filter(|r| r.changed).collect();
    let failed: Vec<&FileReport> = reports.iter().filter(|r| r.error.is_some()).collect();

    for report in &changed {
        let verb = if dry_run { "would change" } else { "changed" };
        println!(
            "{} {} {}",
            style("~").cyan(),
            verb,
            style(report.path.display()).bold()
        );
        for note in &report.notes {
            println!("    {note}");
        }
    }
    for report in &failed {
        println!(
            "{} {}: {}",
            style("x").red(),
            report.path.display(),
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!(
        "{} {} file(s) processed, {} changed, {} failed",
        style("*").green(),
        reports.len(),
        changed.len(),
        failed.len()
    );
}

/// Classify one expression and print the verdict.
pub fn classify_expr(expr: &str, config: &CadenceConfig) {
    let classification = classify(expr, &config.engine.reference_window);
    println!(
        "{} `{}` classifies as {}",
        style("*").green(),
        expr,
        style(classification.class).bold()
    );
    if let Some(detail) = classification.detail {
        println!("    {detail}");
    }
}

/// Write a commented default configuration file.
pub fn init() -> CliResult {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        println!(
            "{} {} already exists",
            style("!").yellow(),
            DEFAULT_CONFIG_FILE
        );
        return Ok(());
    }

    let template = r#"# Identity prefixes that exempt a job from any rewriting.
exempt_prefixes:
  - promote-
  - mirror-nightly-image

# Version breakpoints for the policy tiers. The current release gets a
# weekly ceiling, frozen releases are never rewritten, the legacy range
# gets a bi-weekly ceiling, and anything below the floor drops to yearly.
policies:
  current: "4.13"
  frozen: ["4.12"]
  legacy_floor: "4.7"
  legacy_ceiling: "4.11"

# Calendar month used by simulation-based classification. Keep this
# fixed so repeated runs agree on ambiguous expressions.
reference_window:
  year: 2023
  month: 1

# Label keys marking generated records; such records are never touched.
generator_labels:
  - ci.openshift.io/generator

# Label key carrying a release version on periodics.
release_label: job-release

# Process only paths containing one of these substrings (everything
# when empty).
path_filters: []

# Run artifacts, appended to on every run.
change_log: cadence-changes.log
missing_identity_log: cadence-missing-identity.log
unclassifiable_log: cadence-unclassifiable.log
"#;

    std::fs::write(path, template)?;
    println!("{} created {}", style("*").green(), DEFAULT_CONFIG_FILE);
    Ok(())
}
