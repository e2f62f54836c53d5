// Conflict-aware roll-ups for a selection set.
//
// Every non-forfeited normalized day of every selected fighter is counted
// exactly once, under both its month bucket and its day bucket.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{Fighter, MonthDay};
use crate::selection::MultiplierChoices;
use crate::valuation::conflicts::{forfeits, Conflict};
use crate::valuation::normalize::normalize;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single fighter's share of a bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct FighterShare {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub month_day: MonthDay,
    pub total: f64,
    /// Highest value first.
    pub fighters: Vec<FighterShare>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    /// 1-based calendar month.
    pub month: u8,
    pub total: f64,
    /// Highest value first.
    pub fighters: Vec<FighterShare>,
}

/// What each selected fighter contributes after conflicts.
#[derive(Debug, Clone, PartialEq)]
pub struct FighterContribution {
    pub name: String,
    pub multiplier: f64,
    pub included: f64,
    pub lost: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregate {
    /// Sum of every included day across all fighters.
    pub total: f64,
    /// Calendar order.
    pub by_month: Vec<MonthSummary>,
    /// Calendar order.
    pub by_day: Vec<DaySummary>,
    /// Selection order.
    pub per_fighter: Vec<FighterContribution>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Per-bucket accumulator keeping fighters in first-seen order.
#[derive(Default)]
struct Bucket {
    total: f64,
    fighters: Vec<FighterShare>,
}

impl Bucket {
    fn add(&mut self, name: &str, value: f64) {
        self.total += value;
        match self.fighters.iter_mut().find(|s| s.name == name) {
            Some(share) => share.value += value,
            None => self.fighters.push(FighterShare {
                name: name.to_string(),
                value,
            }),
        }
    }

    fn into_sorted_shares(mut self) -> (f64, Vec<FighterShare>) {
        self.fighters.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        (self.total, self.fighters)
    }
}

/// Build the total, monthly and daily roll-ups for a selection set.
///
/// `conflicts` must come from `resolve_conflicts` over the same fighters and
/// choices; days a fighter forfeits are excluded from every sum.
pub fn aggregate(
    fighters: &[Fighter],
    choices: &MultiplierChoices,
    conflicts: &[Conflict],
) -> Aggregate {
    let mut days: BTreeMap<MonthDay, Bucket> = BTreeMap::new();
    let mut months: BTreeMap<u8, Bucket> = BTreeMap::new();
    let mut per_fighter = Vec::with_capacity(fighters.len());
    let mut total = 0.0;

    for fighter in fighters {
        let multiplier = choices.multiplier_of(&fighter.name);
        let mut contribution = FighterContribution {
            name: fighter.name.clone(),
            multiplier,
            included: 0.0,
            lost: 0.0,
        };

        for (day, value) in normalize(&fighter.scores, multiplier) {
            if forfeits(conflicts, day, &fighter.name) {
                contribution.lost += value;
                continue;
            }
            contribution.included += value;
            total += value;
            days.entry(day).or_default().add(&fighter.name, value);
            months.entry(day.month()).or_default().add(&fighter.name, value);
        }

        per_fighter.push(contribution);
    }

    let by_day = days
        .into_iter()
        .map(|(month_day, bucket)| {
            let (total, fighters) = bucket.into_sorted_shares();
            DaySummary {
                month_day,
                total,
                fighters,
            }
        })
        .collect();

    let by_month = months
        .into_iter()
        .map(|(month, bucket)| {
            let (total, fighters) = bucket.into_sorted_shares();
            MonthSummary {
                month,
                total,
                fighters,
            }
        })
        .collect();

    debug!("aggregated {} fighters, total {:.1}", fighters.len(), total);

    Aggregate {
        total,
        by_month,
        by_day,
        per_fighter,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PassDistribution, ScoreEvent};
    use crate::valuation::conflicts::resolve_conflicts;
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

    #[test]
    fn empty_selection_is_zero() {
        let agg = aggregate(&[], &MultiplierChoices::new(1.2), &[]);
        assert_eq!(agg.total, 0.0);
        assert!(agg.by_month.is_empty());
        assert!(agg.by_day.is_empty());
        assert!(agg.per_fighter.is_empty());
    }

    #[test]
    fn forfeited_claim_excluded_everywhere() {
        let fighters = vec![
            fighter("A", &[("2021-05-10", 300.0)]),
            fighter("B", &[("2022-05-10", 250.0)]),
            fighter("C", &[("2023-05-10", 200.0), ("2023-05-11", 10.0)]),
        ];
        let choices = MultiplierChoices::new(1.0);
        let conflicts = resolve_conflicts(&fighters, &choices, 2);
        let agg = aggregate(&fighters, &choices, &conflicts);

        assert!(approx_eq(agg.total, 560.0, 1e-9));

        let may10 = &agg.by_day[0];
        assert_eq!(may10.month_day.to_string(), "05-10");
        assert!(approx_eq(may10.total, 550.0, 1e-9));
        assert!(may10.fighters.iter().all(|s| s.name != "C"));

        assert_eq!(agg.by_month.len(), 1);
        assert_eq!(agg.by_month[0].month, 5);
        assert!(approx_eq(agg.by_month[0].total, 560.0, 1e-9));

        let c = &agg.per_fighter[2];
        assert_eq!(c.name, "C");
        assert!(approx_eq(c.included, 10.0, 1e-9));
        assert!(approx_eq(c.lost, 200.0, 1e-9));
    }

    #[test]
    fn month_buckets_merge_days_per_fighter() {
        let fighters = vec![
            fighter("A", &[("2021-03-01", 10.0), ("2021-03-15", 20.0), ("2021-04-01", 5.0)]),
            fighter("B", &[("2020-03-15", 40.0)]),
        ];
        let choices = MultiplierChoices::new(2.0);
        let agg = aggregate(&fighters, &choices, &[]);

        assert!(approx_eq(agg.total, 150.0, 1e-9));
        let march = &agg.by_month[0];
        assert_eq!(march.month, 3);
        assert!(approx_eq(march.total, 140.0, 1e-9));
        // B (80) outranks A (60) within March.
        assert_eq!(march.fighters[0].name, "B");
        assert!(approx_eq(march.fighters[1].value, 60.0, 1e-9));
        assert_eq!(agg.by_month[1].month, 4);
        assert_eq!(agg.by_day.len(), 3);
    }

    #[test]
    fn buckets_sum_to_total() {
        let fighters = vec![
            fighter("A", &[("2021-01-01", 1.5), ("2021-07-04", 2.5)]),
            fighter("B", &[("2020-07-04", 3.0), ("2020-12-25", 4.0)]),
        ];
        let choices = MultiplierChoices::new(1.2);
        let agg = aggregate(&fighters, &choices, &[]);
        let by_month: f64 = agg.by_month.iter().map(|m| m.total).sum();
        let by_day: f64 = agg.by_day.iter().map(|d| d.total).sum();
        assert!(approx_eq(by_month, agg.total, 1e-9));
        assert!(approx_eq(by_day, agg.total, 1e-9));
    }

    #[test]
    fn recomputation_is_identical() {
        let fighters = vec![
            fighter("A", &[("2021-01-01", 1.5), ("2021-07-04", 2.5)]),
            fighter("B", &[("2020-07-04", 3.0)]),
            fighter("C", &[("2019-07-04", 3.5)]),
        ];
        let choices = MultiplierChoices::new(1.4);
        let conflicts = resolve_conflicts(&fighters, &choices, 2);
        let first = aggregate(&fighters, &choices, &conflicts);
        let second = aggregate(&fighters, &choices, &conflicts);
        assert_eq!(first, second);
        assert_eq!(first.total.to_bits(), second.total.to_bits());
    }
}
