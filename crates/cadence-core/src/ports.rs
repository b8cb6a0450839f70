//! Diagnostic channel injected into the engine.
//!
//! Business logic never writes files directly; conditions worth operator
//! attention are reported through a [`DiagnosticSink`] capability and the
//! caller decides where they land.

use std::sync::Mutex;

/// A reportable condition encountered while deciding a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Record carries neither `as` nor `name`; the rendered record is
    /// attached for the missing-identity report.
    MissingIdentity { record: String },
    /// Version label did not parse; jobs under it were left unbounded.
    UnparsableVersion { label: String, detail: String },
    /// Expression could not be classified; the record was left untouched.
    UnclassifiableSchedule {
        job: String,
        expr: String,
        detail: Option<String>,
    },
    /// Record carried both `interval` and `cron`.
    ScheduleConflict { job: String },
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Sink that forwards everything to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MissingIdentity { record } => {
                tracing::warn!(%record, "job record has no `as` or `name` field");
            }
            Diagnostic::UnparsableVersion { label, detail } => {
                tracing::warn!(%label, %detail, "unparsable version label, jobs left unbounded");
            }
            Diagnostic::UnclassifiableSchedule { job, expr, detail } => {
                tracing::warn!(%job, %expr, ?detail, "unclassifiable schedule left unchanged");
            }
            Diagnostic::ScheduleConflict { job } => {
                tracing::info!(%job, "record carried both interval and cron");
            }
        }
    }
}

/// Sink that collects diagnostics in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    collected: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything reported so far.
    pub fn drain(&self) -> Vec<Diagnostic> {
        match self.collected.lock() {
            Ok(mut collected) => std::mem::take(&mut *collected),
            Err(_) => Vec::new(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut collected) = self.collected.lock() {
            collected.push(diagnostic);
        }
    }
}
