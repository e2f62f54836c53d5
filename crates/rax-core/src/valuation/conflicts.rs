// Claim conflict resolution across a selection set.
//
// Each selected fighter claims every month-day in its normalized history.
// When more fighters claim a day than the concurrency threshold allows, the
// claims are ranked by value and everything past the threshold is forfeited.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{Fighter, MonthDay};
use crate::selection::MultiplierChoices;
use crate::valuation::normalize::normalize;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One fighter's best scaled value on a month-day.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub name: String,
    pub value: f64,
}

/// An over-subscribed month-day.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub month_day: MonthDay,
    /// All claims for the day, highest value first. Ties keep selection order.
    pub ranked_claims: Vec<Claim>,
    /// Number of leading claims that keep their value.
    pub allowed: usize,
    /// Sum of the forfeited claims.
    pub lost_value: f64,
}

impl Conflict {
    /// Claims that keep their value.
    pub fn winners(&self) -> &[Claim] {
        &self.ranked_claims[..self.allowed.min(self.ranked_claims.len())]
    }

    /// Claims ranked past the threshold.
    pub fn losers(&self) -> &[Claim] {
        &self.ranked_claims[self.allowed.min(self.ranked_claims.len())..]
    }

    /// Whether `name` forfeits its claim on this day. Fighters that are not
    /// part of the conflict never forfeit.
    pub fn forfeits(&self, name: &str) -> bool {
        self.ranked_claims
            .iter()
            .position(|c| c.name == name)
            .is_some_and(|idx| idx >= self.allowed)
    }
}

/// Value of one fighter after removing forfeited days.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdjustedValue {
    pub adjusted_value: f64,
    pub lost_value: f64,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Detect every month-day claimed by more than `max_concurrent_claims`
/// fighters. Output is sorted by month-day.
pub fn resolve_conflicts(
    fighters: &[Fighter],
    choices: &MultiplierChoices,
    max_concurrent_claims: usize,
) -> Vec<Conflict> {
    let mut claims_by_day: BTreeMap<MonthDay, Vec<Claim>> = BTreeMap::new();

    for fighter in fighters {
        let multiplier = choices.multiplier_of(&fighter.name);
        for (day, value) in normalize(&fighter.scores, multiplier) {
            claims_by_day.entry(day).or_default().push(Claim {
                name: fighter.name.clone(),
                value,
            });
        }
    }

    let conflicts: Vec<Conflict> = claims_by_day
        .into_iter()
        .filter(|(_, claims)| claims.len() > max_concurrent_claims)
        .map(|(month_day, mut claims)| {
            // Stable sort keeps selection order among equal values.
            claims.sort_by(|a, b| {
                b.value
                    .partial_cmp(&a.value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let lost_value = claims[max_concurrent_claims..].iter().map(|c| c.value).sum();
            Conflict {
                month_day,
                ranked_claims: claims,
                allowed: max_concurrent_claims,
                lost_value,
            }
        })
        .collect();

    debug!(
        "resolved {} conflicts across {} fighters (threshold {})",
        conflicts.len(),
        fighters.len(),
        max_concurrent_claims
    );

    conflicts
}

/// Look up the conflict for a month-day in a sorted conflict list.
pub fn conflict_on(conflicts: &[Conflict], day: MonthDay) -> Option<&Conflict> {
    conflicts
        .binary_search_by_key(&day, |c| c.month_day)
        .ok()
        .map(|idx| &conflicts[idx])
}

/// Whether `name` forfeits its claim on `day`.
pub fn forfeits(conflicts: &[Conflict], day: MonthDay, name: &str) -> bool {
    conflict_on(conflicts, day).is_some_and(|c| c.forfeits(name))
}

/// Sum a fighter's normalized days, splitting out the forfeited ones. No cap
/// is applied.
pub fn adjust_for_conflicts(
    fighter: &Fighter,
    multiplier: f64,
    conflicts: &[Conflict],
) -> AdjustedValue {
    let mut out = AdjustedValue::default();
    for (day, value) in normalize(&fighter.scores, multiplier) {
        if forfeits(conflicts, day, &fighter.name) {
            out.lost_value += value;
        } else {
            out.adjusted_value += value;
        }
    }
    out
}

/// Total forfeited value across a conflict list.
pub fn total_lost(conflicts: &[Conflict]) -> f64 {
    conflicts.iter().map(|c| c.lost_value).sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PassDistribution, ScoreEvent};
    use chrono::NaiveDate;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn fighter(name: &str, scores: &[(&str, f64)]) -> Fighter {
        Fighter {
            name: name.into(),
            base_value: 0.0,
            scores: scores
                .iter()
                .map(|(d, v)| {
                    ScoreEvent::new(NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(), *v)
                })
                .collect(),
            active: true,
            owned_passes: 10,
            id: None,
            pass_distribution: PassDistribution::default(),
            age_years: None,
        }
    }

    fn md(s: &str) -> MonthDay {
        s.parse().unwrap()
    }

    fn three_way() -> Vec<Fighter> {
        vec![
            fighter("Mid", &[("2022-05-10", 250.0)]),
            fighter("Low", &[("2023-05-10", 200.0)]),
            fighter("Top", &[("2021-05-10", 300.0)]),
        ]
    }

    #[test]
    fn three_claims_over_threshold_two() {
        let conflicts = resolve_conflicts(&three_way(), &MultiplierChoices::new(1.0), 2);
        assert_eq!(conflicts.len(), 1);

        let c = &conflicts[0];
        assert_eq!(c.month_day, md("05-10"));
        let ranked: Vec<f64> = c.ranked_claims.iter().map(|x| x.value).collect();
        assert_eq!(ranked, vec![300.0, 250.0, 200.0]);
        assert!(approx_eq(c.lost_value, 200.0, 1e-9));
        assert_eq!(c.winners().len(), 2);
        assert_eq!(c.losers()[0].name, "Low");
        assert!(c.forfeits("Low"));
        assert!(!c.forfeits("Top"));
        assert!(!c.forfeits("Stranger"));
    }

    #[test]
    fn three_claims_within_threshold_three() {
        let conflicts = resolve_conflicts(&three_way(), &MultiplierChoices::new(1.0), 3);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn multipliers_change_the_ranking() {
        let choices = MultiplierChoices::new(1.0).with("Low", 2.0);
        let conflicts = resolve_conflicts(&three_way(), &choices, 2);
        let c = &conflicts[0];
        assert_eq!(c.ranked_claims[0].name, "Low");
        assert!(approx_eq(c.ranked_claims[0].value, 400.0, 1e-9));
        assert_eq!(c.losers()[0].name, "Mid");
        assert!(approx_eq(c.lost_value, 250.0, 1e-9));
    }

    #[test]
    fn each_fighter_claims_a_day_once() {
        // Two events on the same month-day from one fighter are one claim.
        let fighters = vec![
            fighter("A", &[("2020-01-01", 10.0), ("2021-01-01", 40.0)]),
            fighter("B", &[("2022-01-01", 20.0)]),
        ];
        let conflicts = resolve_conflicts(&fighters, &MultiplierChoices::new(1.0), 1);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].ranked_claims.len(), 2);
        assert!(approx_eq(conflicts[0].ranked_claims[0].value, 40.0, 1e-9));
        assert!(approx_eq(conflicts[0].lost_value, 20.0, 1e-9));
    }

    #[test]
    fn ties_keep_selection_order() {
        let fighters = vec![
            fighter("First", &[("2020-02-02", 100.0)]),
            fighter("Second", &[("2021-02-02", 100.0)]),
            fighter("Third", &[("2022-02-02", 100.0)]),
        ];
        let conflicts = resolve_conflicts(&fighters, &MultiplierChoices::new(1.0), 2);
        let names: Vec<&str> = conflicts[0]
            .ranked_claims
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
        assert!(conflicts[0].forfeits("Third"));
    }

    #[test]
    fn conflicts_sorted_by_month_day() {
        let fighters = vec![
            fighter("A", &[("2020-12-01", 1.0), ("2020-01-15", 1.0)]),
            fighter("B", &[("2020-12-01", 2.0), ("2020-01-15", 2.0)]),
        ];
        let conflicts = resolve_conflicts(&fighters, &MultiplierChoices::new(1.0), 1);
        let days: Vec<String> = conflicts.iter().map(|c| c.month_day.to_string()).collect();
        assert_eq!(days, vec!["01-15", "12-01"]);
        assert!(conflict_on(&conflicts, md("12-01")).is_some());
        assert!(conflict_on(&conflicts, md("06-01")).is_none());
    }

    #[test]
    fn empty_selection_has_no_conflicts() {
        assert!(resolve_conflicts(&[], &MultiplierChoices::new(1.2), 3).is_empty());
    }

    #[test]
    fn adjust_splits_lost_value() {
        let mut fighters = three_way();
        fighters[1] = fighter("Low", &[("2023-05-10", 200.0), ("2023-06-01", 50.0)]);
        let conflicts = resolve_conflicts(&fighters, &MultiplierChoices::new(1.0), 2);

        let low = adjust_for_conflicts(&fighters[1], 1.0, &conflicts);
        assert!(approx_eq(low.adjusted_value, 50.0, 1e-9));
        assert!(approx_eq(low.lost_value, 200.0, 1e-9));

        let top = adjust_for_conflicts(&fighters[2], 1.0, &conflicts);
        assert!(approx_eq(top.adjusted_value, 300.0, 1e-9));
        assert_eq!(top.lost_value, 0.0);
        assert!(approx_eq(total_lost(&conflicts), 200.0, 1e-9));
    }
}
