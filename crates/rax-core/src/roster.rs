// Roster loading and the offline snapshot build.
//
// The engine consumes a processed JSON snapshot. `build_roster` produces that
// snapshot from the raw per-fighter value CSV, the fight history CSV, and the
// owned-pass counts, marking fighters active when they scored within the
// trailing two years and then applying manual overrides.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::model::{Fighter, PassDistribution, ScoreEvent, MAX_PASS_LEVEL, MIN_PASS_LEVEL};

/// How far back a scored event still counts toward `active`.
pub const ACTIVE_WINDOW_MONTHS: u32 = 24;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The immutable fighter roster, in snapshot order.
#[derive(Debug, Clone)]
pub struct Roster {
    fighters: Vec<Fighter>,
    index: HashMap<String, usize>,
}

/// On-disk shape of the processed snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct RosterSnapshot {
    fighters: Vec<Fighter>,
}

impl Roster {
    /// Validate fighters and build the name index. Scores are re-sorted
    /// ascending by date.
    pub fn new(mut fighters: Vec<Fighter>) -> Result<Self, RosterError> {
        let mut index = HashMap::with_capacity(fighters.len());
        for (i, fighter) in fighters.iter_mut().enumerate() {
            validate_fighter(fighter)?;
            if index.insert(fighter.name.clone(), i).is_some() {
                return Err(RosterError::Validation(format!(
                    "duplicate fighter name `{}`",
                    fighter.name
                )));
            }
            fighter.scores.sort_by_key(|s| s.date);
        }
        Ok(Self { fighters, index })
    }

    pub fn get(&self, name: &str) -> Option<&Fighter> {
        self.index.get(name).map(|&i| &self.fighters[i])
    }

    pub fn fighters(&self) -> &[Fighter] {
        &self.fighters
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fighter> {
        self.fighters.iter()
    }

    pub fn len(&self) -> usize {
        self.fighters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fighters.is_empty()
    }

    /// Case-insensitive substring search over names, in roster order.
    pub fn search(&self, query: &str) -> Vec<&Fighter> {
        let needle = query.trim().to_lowercase();
        self.fighters
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .collect()
    }
}

fn validate_fighter(fighter: &Fighter) -> Result<(), RosterError> {
    if fighter.name.trim().is_empty() {
        return Err(RosterError::Validation("fighter with empty name".into()));
    }
    if !fighter.base_value.is_finite() || fighter.base_value < 0.0 {
        return Err(RosterError::Validation(format!(
            "fighter `{}` has invalid base value {}",
            fighter.name, fighter.base_value
        )));
    }
    if let Some(bad) = fighter
        .scores
        .iter()
        .find(|s| !s.value.is_finite() || s.value < 0.0)
    {
        return Err(RosterError::Validation(format!(
            "fighter `{}` has invalid score {} on {}",
            fighter.name, bad.value, bad.date
        )));
    }
    if let Some((level, _)) = fighter
        .pass_distribution
        .levels()
        .find(|(level, _)| !(MIN_PASS_LEVEL..=MAX_PASS_LEVEL).contains(level))
    {
        return Err(RosterError::Validation(format!(
            "fighter `{}` has pass level {} outside {}..={}",
            fighter.name, level, MIN_PASS_LEVEL, MAX_PASS_LEVEL
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Snapshot I/O
// ---------------------------------------------------------------------------

fn parse_snapshot<R: Read>(rdr: R) -> Result<RosterSnapshot, serde_json::Error> {
    serde_json::from_reader(rdr)
}

/// Parse and validate a roster snapshot from any reader.
pub fn roster_from_reader<R: Read>(rdr: R) -> Result<Roster, RosterError> {
    let snapshot = parse_snapshot(rdr).map_err(|e| RosterError::Json {
        path: "<reader>".into(),
        source: e,
    })?;
    Roster::new(snapshot.fighters)
}

/// Load the processed roster snapshot.
pub fn load_roster(path: &Path) -> Result<Roster, RosterError> {
    let file = std::fs::File::open(path).map_err(|e| RosterError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let snapshot =
        parse_snapshot(std::io::BufReader::new(file)).map_err(|e| RosterError::Json {
            path: path.display().to_string(),
            source: e,
        })?;
    let roster = Roster::new(snapshot.fighters)?;
    info!("loaded {} fighters from {}", roster.len(), path.display());
    Ok(roster)
}

fn write_roster_to<W: Write>(roster: &Roster, writer: W) -> Result<(), serde_json::Error> {
    let snapshot = RosterSnapshot {
        fighters: roster.fighters.clone(),
    };
    serde_json::to_writer_pretty(writer, &snapshot)
}

/// Write a roster as a processed snapshot.
pub fn write_roster(roster: &Roster, path: &Path) -> Result<(), RosterError> {
    let file = std::fs::File::create(path).map_err(|e| RosterError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_roster_to(roster, std::io::BufWriter::new(file)).map_err(|e| RosterError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Raw build inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawValue {
    name: String,
    Value: f64,
}

#[derive(Debug, Deserialize)]
struct RawHistory {
    fighter_name: String,
    date: String,
    total_points: f64,
}

fn load_values_from_reader<R: Read>(rdr: R) -> Result<Vec<(String, f64)>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut values = Vec::new();
    for result in reader.deserialize::<RawValue>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim().to_string();
                if name.is_empty() || !raw.Value.is_finite() || raw.Value < 0.0 {
                    warn!("skipping fighter value row for '{}': bad name or value", name);
                    continue;
                }
                values.push((name, raw.Value));
            }
            Err(e) => {
                warn!("skipping malformed fighter value row: {}", e);
            }
        }
    }
    Ok(values)
}

fn load_history_from_reader<R: Read>(rdr: R) -> Result<Vec<(String, ScoreEvent)>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut events = Vec::new();
    for result in reader.deserialize::<RawHistory>() {
        match result {
            Ok(raw) => {
                let name = raw.fighter_name.trim().to_string();
                let Ok(date) = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d") else {
                    warn!("skipping fight for '{}': unparseable date '{}'", name, raw.date);
                    continue;
                };
                if !raw.total_points.is_finite() || raw.total_points < 0.0 {
                    warn!("skipping fight for '{}' on {}: invalid points", name, date);
                    continue;
                }
                events.push((name, ScoreEvent::new(date, raw.total_points.round())));
            }
            Err(e) => {
                warn!("skipping malformed fight history row: {}", e);
            }
        }
    }
    Ok(events)
}

/// Owned-pass counts keyed by fighter name. Counts may be numbers or
/// numeric strings; anything else counts as zero.
fn load_owned_passes_from_reader<R: Read>(rdr: R) -> Result<HashMap<String, u32>, serde_json::Error> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_reader(rdr)?;
    Ok(raw
        .into_iter()
        .map(|(name, v)| {
            let count = match &v {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };
            let count = count.unwrap_or_else(|| {
                warn!("owned passes for '{}' is not a count: {}", name, v);
                0
            });
            (name, u32::try_from(count).unwrap_or(u32::MAX))
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Assemble a roster from raw inputs.
///
/// Fighters appear in value-file order. History rows for unknown fighters are
/// skipped. A fighter is active if any event falls strictly after
/// `as_of - 24 months`; `overrides` are applied last.
pub fn build_roster(
    values: Vec<(String, f64)>,
    history: Vec<(String, ScoreEvent)>,
    owned_passes: &HashMap<String, u32>,
    overrides: &HashMap<String, bool>,
    as_of: NaiveDate,
) -> Result<Roster, RosterError> {
    let cutoff = as_of
        .checked_sub_months(Months::new(ACTIVE_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MIN);

    let mut fighters: Vec<Fighter> = Vec::with_capacity(values.len());
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for (name, value) in values {
        if let Some(&i) = by_name.get(&name) {
            warn!("duplicate fighter value for '{}', using latest value", name);
            fighters[i].base_value = value;
            continue;
        }
        let id = fighters.len() as u64 + 1;
        by_name.insert(name.clone(), fighters.len());
        fighters.push(Fighter {
            owned_passes: owned_passes.get(&name).copied().unwrap_or(0),
            name,
            base_value: value,
            scores: Vec::new(),
            active: false,
            id: Some(id),
            pass_distribution: PassDistribution::default(),
            age_years: None,
        });
    }

    let mut unknown = 0usize;
    for (name, event) in history {
        let Some(&i) = by_name.get(&name) else {
            unknown += 1;
            continue;
        };
        if event.date > cutoff {
            fighters[i].active = true;
        }
        fighters[i].scores.push(event);
    }
    if unknown > 0 {
        warn!("skipped {} fight history rows for fighters without a value", unknown);
    }

    for (name, &active) in overrides {
        match by_name.get(name) {
            Some(&i) => fighters[i].active = active,
            None => warn!("active override for unknown fighter '{}'", name),
        }
    }

    Roster::new(fighters)
}

/// Build a roster from the raw files on disk.
pub fn build_roster_from_paths(
    values_path: &Path,
    history_path: &Path,
    owned_passes_path: Option<&Path>,
    overrides: &HashMap<String, bool>,
    as_of: NaiveDate,
) -> Result<Roster, RosterError> {
    let open = |path: &Path| {
        std::fs::File::open(path).map_err(|e| RosterError::Io {
            path: path.display().to_string(),
            source: e,
        })
    };

    let values = load_values_from_reader(open(values_path)?).map_err(|e| RosterError::Csv {
        path: values_path.display().to_string(),
        source: e,
    })?;
    if values.is_empty() {
        return Err(RosterError::Validation(
            "fighter value CSV produced zero valid rows".into(),
        ));
    }

    let history = load_history_from_reader(open(history_path)?).map_err(|e| RosterError::Csv {
        path: history_path.display().to_string(),
        source: e,
    })?;

    let owned = match owned_passes_path {
        Some(path) => load_owned_passes_from_reader(open(path)?).map_err(|e| RosterError::Json {
            path: path.display().to_string(),
            source: e,
        })?,
        None => HashMap::new(),
    };

    build_roster(values, history, &owned, overrides, as_of)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
