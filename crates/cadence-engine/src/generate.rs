//! Replacement schedule synthesis.
//!
//! Generated values are randomized within fixed bands so rewritten jobs
//! spread out instead of piling onto one slot; the randomness is
//! load-spreading only, not security-relevant, and every call is
//! independent. The bands are chosen so that the output always classifies
//! back to the class it was generated for.

use cadence_core::frequency::FrequencyPolicy;
use rand::Rng;

/// Produce a cron expression satisfying `target`.
///
/// `DoNotTouch` and `Unbounded` have nothing to satisfy and yield `None`;
/// the decision engine never requests a replacement under them.
pub fn generate(target: FrequencyPolicy, rng: &mut impl Rng) -> Option<String> {
    match target {
        FrequencyPolicy::Weekly => Some(weekly(rng)),
        FrequencyPolicy::BiWeekly => Some(bi_weekly(rng)),
        FrequencyPolicy::Monthly => Some(monthly(rng)),
        FrequencyPolicy::Yearly => Some(yearly(rng)),
        FrequencyPolicy::DoNotTouch | FrequencyPolicy::Unbounded => None,
    }
}

/// Once a week on a weekend day (0 = Sunday, 6 = Saturday), spreading
/// load off weekday peak usage.
fn weekly(rng: &mut impl Rng) -> String {
    let day = if rng.gen_bool(0.5) { 6 } else { 0 };
    format!(
        "{} {} * * {}",
        rng.gen_range(0..=59),
        rng.gen_range(0..=23),
        day
    )
}

/// Twice a month in the off-peak hour band, at least two weeks apart and
/// clear of month boundaries so short months never skip a run.
fn bi_weekly(rng: &mut impl Rng) -> String {
    let day1 = rng.gen_range(5..=10);
    let day2 = rng.gen_range((day1 + 14).max(15)..=25);
    format!(
        "{} {} {},{} * *",
        rng.gen_range(0..=59),
        rng.gen_range(1..=10),
        day1,
        day2
    )
}

/// One fixed day a month, clear of month boundaries.
fn monthly(rng: &mut impl Rng) -> String {
    format!(
        "{} {} {} * *",
        rng.gen_range(0..=59),
        rng.gen_range(1..=10),
        rng.gen_range(5..=25)
    )
}

/// One fixed day of one fixed month a year.
fn yearly(rng: &mut impl Rng) -> String {
    format!(
        "{} {} {} {} *",
        rng.gen_range(0..=59),
        rng.gen_range(1..=10),
        rng.gen_range(1..=28),
        rng.gen_range(1..=12)
    )
}
