//! Append-only run artifacts: the change log, the missing-identity
//! report, and the unclassifiable-expression record.

use crate::config::CadenceConfig;
use cadence_core::ports::{Diagnostic, DiagnosticSink};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// A log file appended one whole block at a time. The mutex keeps
/// parallel writers from interleaving partial lines; append is the only
/// write mode these files ever see.
#[derive(Debug)]
pub struct AppendLog {
    file: Mutex<File>,
}

impl AppendLog {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub fn append(&self, text: &str) {
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        if let Err(err) = writeln!(file, "{text}") {
            tracing::warn!(%err, "failed to append to log file");
        }
    }
}

/// Append-only record of applied changes, grouped per file.
#[derive(Debug)]
pub struct ChangeLog {
    log: AppendLog,
}

impl ChangeLog {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            log: AppendLog::open(path)?,
        })
    }

    pub fn record(&self, file: &Path, notes: &[String]) {
        if notes.is_empty() {
            return;
        }
        let mut block = format!("Changes in {}:\n", file.display());
        for note in notes {
            block.push_str(note);
            block.push('\n');
        }
        self.log.append(&block);
    }
}

/// Diagnostic sink used by the CLI: everything goes to `tracing`, and the
/// conditions operators triage offline also land in their log files.
pub struct FileSink {
    missing_identity: AppendLog,
    unclassifiable: AppendLog,
}

impl FileSink {
    pub fn open(config: &CadenceConfig) -> std::io::Result<Self> {
        Ok(Self {
            missing_identity: AppendLog::open(&config.missing_identity_log)?,
            unclassifiable: AppendLog::open(&config.unclassifiable_log)?,
        })
    }
}

impl DiagnosticSink for FileSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MissingIdentity { record } => {
                tracing::warn!("job record has no `as` or `name` field");
                self.missing_identity.append(record);
            }
            Diagnostic::UnparsableVersion { label, detail } => {
                tracing::warn!(%label, %detail, "unparsable version label, jobs left unbounded");
            }
            Diagnostic::UnclassifiableSchedule { job, expr, detail } => {
                tracing::warn!(%job, %expr, ?detail, "unclassifiable schedule left unchanged");
                self.unclassifiable.append(&format!("{job}\t{expr}"));
            }
            Diagnostic::ScheduleConflict { job } => {
                tracing::info!(%job, "record carried both interval and cron");
            }
        }
    }
}
