// Parsing of `--pick NAME[=TIER]` arguments into a selection and the
// per-fighter multiplier choices that go with it.

use anyhow::{anyhow, bail, Result};

use rax_core::model::Fighter;
use rax_core::roster::Roster;
use rax_core::selection::{MultiplierChoices, Selection};
use rax_core::tiers::TierTable;

/// One `--pick` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub name: String,
    /// Tier label or multiplier value. `None` uses the default multiplier.
    pub tier: Option<String>,
}

/// clap value parser for `NAME` or `NAME=TIER`.
///
/// Splits on the last `=` so names containing `=` still work when a tier is
/// given.
pub fn parse_pick(raw: &str) -> Result<Pick, String> {
    let (name, tier) = match raw.rsplit_once('=') {
        Some((name, tier)) => (name.trim(), Some(tier.trim())),
        None => (raw.trim(), None),
    };
    if name.is_empty() {
        return Err(format!("empty fighter name in pick `{raw}`"));
    }
    if tier.is_some_and(str::is_empty) {
        return Err(format!("empty tier in pick `{raw}`"));
    }
    Ok(Pick {
        name: name.to_string(),
        tier: tier.map(str::to_string),
    })
}

/// Resolve a tier reference to its multiplier.
pub fn resolve_multiplier(tiers: &TierTable, reference: &str) -> Result<f64> {
    tiers
        .resolve(reference)
        .map(|t| t.multiplier)
        .ok_or_else(|| anyhow!("unknown tier `{reference}`"))
}

/// Look up a fighter by exact name, falling back to a search that must match
/// exactly one fighter.
pub fn find_fighter<'a>(roster: &'a Roster, query: &str) -> Result<&'a Fighter> {
    if let Some(fighter) = roster.get(query) {
        return Ok(fighter);
    }
    match roster.search(query).as_slice() {
        [only] => Ok(*only),
        [] => bail!("no fighter matches `{query}`"),
        many => {
            let names: Vec<&str> = many.iter().take(5).map(|f| f.name.as_str()).collect();
            bail!("`{query}` matches several fighters: {}", names.join(", "))
        }
    }
}

/// Build the selection and multiplier map for a list of picks.
///
/// Every name must exist in the roster. The selection is bounded by `limit`.
pub fn build_selection(
    picks: &[Pick],
    roster: &Roster,
    tiers: &TierTable,
    default_multiplier: f64,
    limit: usize,
) -> Result<(Selection, MultiplierChoices)> {
    let mut selection = Selection::new(limit);
    let mut choices = MultiplierChoices::new(default_multiplier);

    for pick in picks {
        let Some(fighter) = roster.get(&pick.name) else {
            let suggestions: Vec<&str> = roster
                .search(&pick.name)
                .into_iter()
                .take(3)
                .map(|f| f.name.as_str())
                .collect();
            if suggestions.is_empty() {
                bail!("no fighter named `{}`", pick.name);
            }
            bail!(
                "no fighter named `{}` (did you mean {}?)",
                pick.name,
                suggestions.join(", ")
            );
        };
        selection.add(fighter.clone())?;
        if let Some(tier) = &pick.tier {
            choices.set(pick.name.clone(), resolve_multiplier(tiers, tier)?);
        }
    }

    Ok((selection, choices))
}
