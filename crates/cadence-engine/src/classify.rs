//! Schedule classification.
//!
//! Expressions arrive in three shapes: named aliases (`@daily`), 5-field
//! cron strings, and duration intervals (`4h`, `30m`). Classification is
//! total: any input, however malformed, yields a class, with
//! [`FrequencyClass::Unclassifiable`] as the catch-all that leaves the
//! record untouched.
//!
//! Cron strings are matched against canonical shapes first. Cron's field
//! algebra allows many non-canonical expressions that still have an
//! unambiguous empirical frequency, so anything unmatched falls back to
//! counting trigger times over a fixed reference month.

use cadence_core::frequency::{DayFilter, FrequencyClass};
use chrono::{DateTime, TimeZone, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fixed calendar month used by the simulation fallback.
///
/// Held constant across runs so classification of an unchanged expression
/// never drifts between invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceWindow {
    pub year: i32,
    pub month: u32,
}

impl Default for ReferenceWindow {
    fn default() -> Self {
        Self {
            year: 2023,
            month: 1,
        }
    }
}

impl ReferenceWindow {
    /// Half-open bounds of the reference month; `None` for an invalid
    /// year/month pair.
    fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = Utc
            .with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()?;
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        let end = Utc
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .single()?;
        Some((start, end))
    }
}

/// Classification result plus a parse detail for the unclassifiable case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub class: FrequencyClass,
    pub detail: Option<String>,
}

impl Classification {
    fn of(class: FrequencyClass) -> Self {
        Self {
            class,
            detail: None,
        }
    }

    fn unclassifiable(detail: impl Into<String>) -> Self {
        Self {
            class: FrequencyClass::Unclassifiable,
            detail: Some(detail.into()),
        }
    }
}

/// Classify a schedule expression against the reference window.
///
/// Total over all string inputs; never panics and never loops unbounded.
pub fn classify(expr: &str, window: &ReferenceWindow) -> Classification {
    let expr = expr.trim();
    if expr.is_empty() {
        return Classification::unclassifiable("empty expression");
    }
    if let Some(class) = alias_class(expr) {
        return Classification::of(class);
    }
    if expr.starts_with('@') {
        return Classification::unclassifiable(format!("unknown alias `{expr}`"));
    }
    if let Some(class) = classify_duration(expr) {
        return Classification::of(class);
    }
    classify_cron(expr, window)
}

/// Named aliases, including the calendar tokens interval fields may carry.
fn alias_class(token: &str) -> Option<FrequencyClass> {
    match token {
        "@yearly" | "@annually" => Some(FrequencyClass::Yearly),
        "@monthly" => Some(FrequencyClass::Monthly(DayFilter::Any)),
        "@weekly" => Some(FrequencyClass::Weekly),
        "@daily" => Some(FrequencyClass::Daily),
        "@hourly" => Some(FrequencyClass::Hourly),
        _ => None,
    }
}

const MINUTES_PER_DAY: u64 = 24 * 60;

/// `<N>h` / `<N>m` duration intervals, classified by magnitude.
fn classify_duration(expr: &str) -> Option<FrequencyClass> {
    let minutes = if let Some(digits) = expr.strip_suffix('h') {
        digits.parse::<u64>().ok()?.checked_mul(60)?
    } else if let Some(digits) = expr.strip_suffix('m') {
        digits.parse::<u64>().ok()?
    } else {
        return None;
    };
    let class = match minutes {
        m if m < MINUTES_PER_DAY => FrequencyClass::Hourly,
        m if m < 7 * MINUTES_PER_DAY => FrequencyClass::Daily,
        m if m < 14 * MINUTES_PER_DAY => FrequencyClass::Weekly,
        m if m < 28 * MINUTES_PER_DAY => FrequencyClass::BiWeekly(DayFilter::Any),
        _ => FrequencyClass::Monthly(DayFilter::Any),
    };
    Some(class)
}

fn classify_cron(expr: &str, window: &ReferenceWindow) -> Classification {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Classification::unclassifiable(format!(
            "expected 5 cron fields, got {}",
            fields.len()
        ));
    }
    if let Some(class) = match_shape(fields[0], fields[1], fields[2], fields[3], fields[4]) {
        return Classification::of(class);
    }
    simulate(expr, window)
}

/// Whether a field is a single fixed numeric value.
fn fixed(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

fn fixed_value(field: &str) -> Option<u32> {
    if fixed(field) { field.parse().ok() } else { None }
}

/// Two comma-separated fixed values.
fn fixed_pair(field: &str) -> Option<(u32, u32)> {
    let (a, b) = field.split_once(',')?;
    Some((fixed_value(a)?, fixed_value(b)?))
}

/// Day-of-week restriction accepted on bi-weekly and monthly shapes.
fn day_filter(dow: &str) -> Option<DayFilter> {
    match dow {
        "*" => Some(DayFilter::Any),
        "1-5" => Some(DayFilter::Weekdays),
        "6-7" | "6-0" | "0,6" | "6,0" => Some(DayFilter::Weekends),
        _ => None,
    }
}

/// Canonical cron shapes, checked before any simulation.
fn match_shape(
    minute: &str,
    hour: &str,
    dom: &str,
    month: &str,
    dow: &str,
) -> Option<FrequencyClass> {
    // Every canonical shape fixes the trigger to one minute of one hour.
    if !fixed(minute) || !fixed(hour) {
        return None;
    }
    if month == "*" {
        if dom == "*" {
            return match dow {
                "*" => Some(FrequencyClass::Daily),
                d if fixed(d) => Some(FrequencyClass::Weekly),
                _ => None,
            };
        }
        if dom == "*/7" {
            return Some(FrequencyClass::Weekly);
        }
        if dom == "*/14" {
            return day_filter(dow).map(FrequencyClass::BiWeekly);
        }
        if let Some((day1, day2)) = fixed_pair(dom) {
            // Two slots at least two weeks apart is a bi-weekly cadence.
            if day2 >= day1 && day2 - day1 >= 14 {
                return day_filter(dow).map(FrequencyClass::BiWeekly);
            }
            return None;
        }
        if fixed(dom) {
            return day_filter(dow).map(FrequencyClass::Monthly);
        }
        return None;
    }
    if dow == "*" && fixed(dom) {
        if fixed(month) {
            return Some(FrequencyClass::Yearly);
        }
        if let Some((month1, month2)) = fixed_pair(month) {
            if month2 >= month1 && month2 - month1 == 6 {
                return Some(FrequencyClass::SemiAnnual);
            }
        }
    }
    None
}

/// Hard cap on simulated trigger enumerations. A month of every-minute
/// firing is 44,640 ticks; anything past this is already far finer than
/// any enforceable ceiling.
const MAX_TICKS: usize = 50_000;

/// Count-based fallback for expressions with no canonical shape: enumerate
/// trigger times inside the reference month and bucket by count.
fn simulate(expr: &str, window: &ReferenceWindow) -> Classification {
    let Some((start, end)) = window.bounds() else {
        return Classification::unclassifiable(format!(
            "invalid reference window {}-{:02}",
            window.year, window.month
        ));
    };
    // The cron crate wants a seconds field; standard 5-field input gets a
    // fixed zero second prepended.
    let six_field = format!("0 {expr}");
    let schedule = match Schedule::from_str(&six_field) {
        Ok(schedule) => schedule,
        Err(err) => return Classification::unclassifiable(err.to_string()),
    };
    let count = schedule
        .after(&start)
        .take(MAX_TICKS)
        .take_while(|tick| *tick < end)
        .count();
    let class = match count {
        1 => FrequencyClass::Monthly(DayFilter::Any),
        2 => FrequencyClass::BiWeekly(DayFilter::Any),
        count if count > 4 => FrequencyClass::Daily,
        _ => FrequencyClass::Custom,
    };
    Classification::of(class)
}
