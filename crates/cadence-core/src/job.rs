//! In-place view over a periodic job record.

use serde_yaml::{Mapping, Value};

const INTERVAL_KEY: &str = "interval";
const CRON_KEY: &str = "cron";

/// A typed view over one job mapping.
///
/// Records are mutated through the view rather than deserialized into a
/// struct, so every field the tool does not recognize rounds-trips
/// untouched when the document is written back.
#[derive(Debug)]
pub struct JobRecord<'a> {
    inner: &'a mut Mapping,
}

impl<'a> JobRecord<'a> {
    pub fn new(inner: &'a mut Mapping) -> Self {
        Self { inner }
    }

    /// Job identity: the `as` field, else `name`. Absence is an error
    /// condition the caller must surface, never a silent default.
    pub fn identity(&self) -> Option<&str> {
        self.get_str("as").or_else(|| self.get_str("name"))
    }

    pub fn interval(&self) -> Option<&str> {
        self.get_str(INTERVAL_KEY)
    }

    pub fn cron(&self) -> Option<&str> {
        self.get_str(CRON_KEY)
    }

    pub fn has_label(&self, key: &str) -> bool {
        self.labels().is_some_and(|labels| labels.contains_key(key))
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels()?.get(key)?.as_str()
    }

    /// `base_ref` values of the record's extra refs, in order.
    pub fn base_refs(&self) -> Vec<&str> {
        self.inner
            .get("extra_refs")
            .and_then(Value::as_sequence)
            .map(|refs| {
                refs.iter()
                    .filter_map(|r| r.as_mapping()?.get("base_ref")?.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop the `interval` field; reports whether it was present.
    pub fn remove_interval(&mut self) -> bool {
        self.inner.remove(INTERVAL_KEY).is_some()
    }

    pub fn set_cron(&mut self, expr: String) {
        self.inner
            .insert(Value::from(CRON_KEY), Value::from(expr));
    }

    /// Compact single-line rendering for diagnostics.
    pub fn render(&self) -> String {
        serde_json::to_string(self.inner).unwrap_or_else(|_| "<unrenderable record>".to_owned())
    }

    fn labels(&self) -> Option<&Mapping> {
        self.inner.get("labels")?.as_mapping()
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.inner.get(key)?.as_str()
    }
}
