// Score normalization.
//
// Collapses a fighter's event history into one value per month-day, keeping
// the best single-year result for each calendar day. Every other aggregate
// in the engine builds on this map.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::model::{MonthDay, ScoreEvent};

/// Highest scaled value per month-day, ordered by calendar position.
pub type DailyScores = BTreeMap<MonthDay, f64>;

/// Scale every event by `multiplier` and keep the maximum per month-day.
///
/// The fold is a per-key max, so the result does not depend on input order.
pub fn normalize(scores: &[ScoreEvent], multiplier: f64) -> DailyScores {
    let mut daily = DailyScores::new();
    for event in scores {
        let scaled = event.value * multiplier;
        match daily.entry(event.month_day()) {
            Entry::Vacant(slot) => {
                slot.insert(scaled);
            }
            Entry::Occupied(mut slot) => {
                if scaled > *slot.get() {
                    slot.insert(scaled);
                }
            }
        }
    }
    daily
}

/// Sum of every value in a normalized map.
pub fn raw_total(daily: &DailyScores) -> f64 {
    daily.values().sum()
}

/// Per-month sums of a normalized map, in calendar order. Months without any
/// claimed day are omitted.
pub fn monthly_totals(daily: &DailyScores) -> Vec<(u8, f64)> {
    let mut months: BTreeMap<u8, f64> = BTreeMap::new();
    for (day, value) in daily {
        *months.entry(day.month()).or_insert(0.0) += value;
    }
    months.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
