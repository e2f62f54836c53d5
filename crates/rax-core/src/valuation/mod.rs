// Valuation engine: normalization, capped annual value, claim conflicts,
// roll-ups, and recommendations.

pub mod aggregate;
pub mod annual;
pub mod conflicts;
pub mod normalize;
pub mod recommend;

use std::collections::HashSet;

use tracing::info;

use crate::config::Config;
use crate::model::Fighter;
use crate::selection::{MultiplierChoices, Selection};

use self::aggregate::Aggregate;
use self::annual::Valuation;
use self::conflicts::{AdjustedValue, Conflict};
use self::recommend::ScoredFighter;

/// Everything the dashboard shows for one selection snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamReport {
    /// Capped annual value of each selected fighter, in selection order.
    pub valuations: Vec<Valuation>,
    /// Conflict-adjusted value of each selected fighter, in selection order.
    pub adjusted: Vec<AdjustedValue>,
    pub conflicts: Vec<Conflict>,
    pub aggregate: Aggregate,
    pub recommendations: Vec<ScoredFighter>,
}

/// Run the full pipeline for a selection: conflicts first, then roll-ups and
/// recommendations against those conflicts. Nothing is cached between calls.
pub fn evaluate_team(
    roster: &[Fighter],
    selection: &Selection,
    choices: &MultiplierChoices,
    excluded: &HashSet<String>,
    config: &Config,
) -> TeamReport {
    let fighters = selection.fighters();

    let valuations: Vec<Valuation> = fighters
        .iter()
        .map(|f| annual::value_fighter(f, choices.multiplier_of(&f.name), &config.tiers))
        .collect();

    let conflicts = conflicts::resolve_conflicts(
        fighters,
        choices,
        config.policy.max_concurrent_claims,
    );

    let adjusted = fighters
        .iter()
        .map(|f| conflicts::adjust_for_conflicts(f, choices.multiplier_of(&f.name), &conflicts))
        .collect();

    let aggregate = aggregate::aggregate(fighters, choices, &conflicts);

    let selected: HashSet<&str> = selection.names().collect();
    let recommendations = recommend::rank(
        roster,
        &selected,
        excluded,
        &conflicts,
        config.policy.default_multiplier,
        &config.policy,
    );

    info!(
        "evaluated {} fighters: total {:.0}, {} conflicts, {} recommendations",
        fighters.len(),
        aggregate.total,
        conflicts.len(),
        recommendations.len()
    );

    TeamReport {
        valuations,
        adjusted,
        conflicts,
        aggregate,
        recommendations,
    }
}
