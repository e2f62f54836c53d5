// Recommendation ranking for fighters not yet in the selection set.
//
// Candidates are sorted by their conflict-adjusted annual value at the base
// multiplier. A separate scarcity score (value over squared log-ownership,
// with an activity bonus) is reported alongside as supporting information.

use std::collections::HashSet;

use tracing::debug;

use crate::config::Policy;
use crate::model::Fighter;
use crate::valuation::conflicts::{adjust_for_conflicts, Conflict};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A ranked recommendation candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFighter {
    pub name: String,
    pub active: bool,
    pub owned_passes: u32,
    /// Uncapped daily-max total at the base multiplier, net of forfeits.
    pub adjusted_value: f64,
    pub lost_value: f64,
    /// Auxiliary ranking signal. `None` when the fighter has no owners.
    pub scarcity_score: Option<f64>,
    /// Position in the candidate roster, used as the tie-break.
    roster_index: usize,
}

// ---------------------------------------------------------------------------
// Scarcity score
// ---------------------------------------------------------------------------

/// `round((base_value * multiplier) / log10(owned_passes + 1)^2 * bonus)`,
/// with `bonus = active_bonus` for active fighters and 1 otherwise.
///
/// Returns `None` for a fighter with no owned passes, where the ownership
/// penalty is zero.
pub fn scarcity_score(fighter: &Fighter, multiplier: f64, active_bonus: f64) -> Option<f64> {
    let penalty = ((fighter.owned_passes as f64) + 1.0).log10();
    if penalty <= 0.0 {
        return None;
    }
    let bonus = if fighter.active { active_bonus } else { 1.0 };
    let rax = fighter.base_value * multiplier;
    Some((rax / penalty.powi(2) * bonus).round())
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank every candidate that is neither selected nor excluded.
///
/// Candidates are valued at `base_multiplier` against the current selection's
/// conflicts, sorted descending with roster order as the tie-break, and
/// truncated to `policy.recommendation_limit`.
pub fn rank(
    candidates: &[Fighter],
    selected: &HashSet<&str>,
    excluded: &HashSet<String>,
    conflicts: &[Conflict],
    base_multiplier: f64,
    policy: &Policy,
) -> Vec<ScoredFighter> {
    let mut scored: Vec<ScoredFighter> = candidates
        .iter()
        .enumerate()
        .filter(|(_, f)| !selected.contains(f.name.as_str()) && !excluded.contains(&f.name))
        .map(|(roster_index, f)| {
            let adjusted = adjust_for_conflicts(f, base_multiplier, conflicts);
            ScoredFighter {
                name: f.name.clone(),
                active: f.active,
                owned_passes: f.owned_passes,
                adjusted_value: adjusted.adjusted_value,
                lost_value: adjusted.lost_value,
                scarcity_score: scarcity_score(f, base_multiplier, policy.active_bonus),
                roster_index,
            }
        })
        .collect();

    let pool = scored.len();

    scored.sort_by(|a, b| {
        b.adjusted_value
            .partial_cmp(&a.adjusted_value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.roster_index.cmp(&b.roster_index))
    });
    scored.truncate(policy.recommendation_limit);

    debug!(
        "ranked {} of {} candidates ({} selected, {} excluded)",
        scored.len(),
        pool,
        selected.len(),
        excluded.len()
    );

    scored
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
