// Annual Rax valuation.
//
// Applies a rarity multiplier to a fighter's normalized daily scores, sums
// them, and clamps the result to the tier's annual cap.

use crate::model::Fighter;
use crate::selection::MultiplierChoices;
use crate::tiers::TierTable;
use crate::valuation::normalize::{normalize, raw_total};

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

/// Full breakdown of one fighter's annual value at one multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub name: String,
    pub multiplier: f64,
    /// Sum of the normalized daily maxima before the cap.
    pub raw_total: f64,
    /// Annual ceiling for the multiplier. `None` means unbounded.
    pub cap: Option<f64>,
    /// `min(raw_total, cap)`, or `raw_total` when uncapped.
    pub value: f64,
}

impl Valuation {
    pub fn capped(&self) -> bool {
        self.value < self.raw_total
    }
}

/// Clamp a raw total to an optional cap.
pub fn apply_cap(raw_total: f64, cap: Option<f64>) -> f64 {
    match cap {
        Some(cap) => raw_total.min(cap),
        None => raw_total,
    }
}

/// Value a fighter at the given multiplier.
pub fn value_fighter(fighter: &Fighter, multiplier: f64, tiers: &TierTable) -> Valuation {
    let raw = raw_total(&normalize(&fighter.scores, multiplier));
    let cap = tiers.cap_for(multiplier);
    Valuation {
        name: fighter.name.clone(),
        multiplier,
        raw_total: raw,
        cap,
        value: apply_cap(raw, cap),
    }
}

/// Annual Rax for a fighter: normalized daily maxima, summed, then capped.
pub fn annual_value(fighter: &Fighter, multiplier: f64, tiers: &TierTable) -> f64 {
    value_fighter(fighter, multiplier, tiers).value
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// One row of the roster-wide leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    /// 1-based rank by legacy base value across the whole roster.
    pub rank: usize,
    pub name: String,
    pub active: bool,
    pub multiplier: f64,
    /// Legacy baseline scaled by the chosen multiplier.
    pub display_value: f64,
}

/// Rank the full roster by base value (descending, stable on roster order).
///
/// Ranks are fixed over the whole roster so filtering the result afterwards
/// keeps each fighter's position.
pub fn leaderboard(fighters: &[Fighter], choices: &MultiplierChoices) -> Vec<LeaderboardRow> {
    let mut ordered: Vec<&Fighter> = fighters.iter().collect();
    ordered.sort_by(|a, b| {
        b.base_value
            .partial_cmp(&a.base_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, f)| {
            let multiplier = choices.multiplier_of(&f.name);
            LeaderboardRow {
                rank: i + 1,
                name: f.name.clone(),
                active: f.active,
                multiplier,
                display_value: f.base_value * multiplier,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
