// Roster data model: fighters, their scored events, and the month-day key
// that folds multi-year history into a single annual cycle.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Score events
// ---------------------------------------------------------------------------

/// A single scored event in a fighter's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub date: NaiveDate,
    pub value: f64,
}

impl ScoreEvent {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// The calendar day of this event with the year dropped.
    pub fn month_day(&self) -> MonthDay {
        MonthDay::from_date(self.date)
    }
}

// ---------------------------------------------------------------------------
// MonthDay
// ---------------------------------------------------------------------------

/// A date key that ignores the year. Orders by month, then day, and
/// displays as `MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    month: u8,
    day: u8,
}

impl MonthDay {
    /// Build a key from raw components. Returns `None` for a day that does
    /// not exist in any year (Feb 29 is accepted).
    pub fn new(month: u8, day: u8) -> Option<Self> {
        // 2024 is a leap year, so every valid month-day resolves.
        NaiveDate::from_ymd_opt(2024, month as u32, day as u32).map(|_| Self { month, day })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month-day `{0}`, expected MM-DD")]
pub struct ParseMonthDayError(String);

impl FromStr for MonthDay {
    type Err = ParseMonthDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthDayError(s.to_string());
        let (m, d) = s.trim().split_once('-').ok_or_else(err)?;
        let month: u8 = m.parse().map_err(|_| err())?;
        let day: u8 = d.parse().map_err(|_| err())?;
        MonthDay::new(month, day).ok_or_else(err)
    }
}

/// English month name for a 1-based month number.
pub fn month_name(month: u8) -> &'static str {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July",
        "August", "September", "October", "November", "December",
    ];
    NAMES
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("Unknown")
}

// ---------------------------------------------------------------------------
// Pass distribution
// ---------------------------------------------------------------------------

/// Lowest and highest pass rarity levels tracked per fighter.
pub const MIN_PASS_LEVEL: u8 = 3;
pub const MAX_PASS_LEVEL: u8 = 7;

/// Human-readable label for a pass rarity level.
pub fn pass_level_label(level: u8) -> &'static str {
    match level {
        3 => "Rare",
        4 => "Epic",
        5 => "Legendary",
        6 => "Mythical",
        7 => "Iconic",
        _ => "Unknown",
    }
}

/// Count of passes owned at each rarity level (3..=7).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassDistribution(BTreeMap<u8, u32>);

impl PassDistribution {
    pub fn new(counts: BTreeMap<u8, u32>) -> Self {
        Self(counts)
    }

    pub fn count(&self, level: u8) -> u32 {
        self.0.get(&level).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Largest single-level count, used to scale distribution bars.
    pub fn max_count(&self) -> u32 {
        self.0.values().copied().max().unwrap_or(0)
    }

    /// Levels present in the distribution, highest rarity first.
    pub fn levels(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.0.iter().rev().map(|(&level, &count)| (level, count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Fighter
// ---------------------------------------------------------------------------

/// A rankable entity with a historical score series.
///
/// Deserializes from the processed roster snapshot, where the legacy
/// baseline is stored under `value` and keys are camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fighter {
    pub name: String,
    #[serde(rename = "value")]
    pub base_value: f64,
    pub scores: Vec<ScoreEvent>,
    pub active: bool,
    pub owned_passes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "PassDistribution::is_empty")]
    pub pass_distribution: PassDistribution,
    #[serde(default, rename = "age", skip_serializing_if = "Option::is_none")]
    pub age_years: Option<f64>,
}

impl Fighter {
    /// Date of the most recent scored event, if any.
    pub fn last_event(&self) -> Option<NaiveDate> {
        self.scores.iter().map(|s| s.date).max()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_day_drops_year() {
        let a = MonthDay::from_date(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        let b = MonthDay::from_date(NaiveDate::from_ymd_opt(2019, 3, 1).unwrap());
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "03-01");
    }

    #[test]
    fn month_day_orders_by_month_then_day() {
        let jan31: MonthDay = "01-31".parse().unwrap();
        let feb01: MonthDay = "02-01".parse().unwrap();
        let dec25: MonthDay = "12-25".parse().unwrap();
        assert!(jan31 < feb01);
        assert!(feb01 < dec25);
    }

    #[test]
    fn month_day_parse_rejects_garbage() {
        assert!("13-01".parse::<MonthDay>().is_err());
        assert!("02-30".parse::<MonthDay>().is_err());
        assert!("0301".parse::<MonthDay>().is_err());
        assert!("02-29".parse::<MonthDay>().is_ok());
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
        assert_eq!(month_name(13), "Unknown");
    }

    #[test]
    fn fighter_deserializes_snapshot_schema() {
        let json = r#"{
            "name": "Jon Jones",
            "value": 900,
            "scores": [{"date": "2023-03-04", "value": 120}],
            "active": true,
            "ownedPasses": 42,
            "id": 7,
            "passDistribution": {"3": 10, "4": 5, "5": 2, "6": 0, "7": 1},
            "age": 36
        }"#;
        let fighter: Fighter = serde_json::from_str(json).unwrap();
        assert_eq!(fighter.name, "Jon Jones");
        assert_eq!(fighter.base_value, 900.0);
        assert_eq!(fighter.scores.len(), 1);
        assert_eq!(fighter.scores[0].month_day().to_string(), "03-04");
        assert_eq!(fighter.owned_passes, 42);
        assert_eq!(fighter.id, Some(7));
        assert_eq!(fighter.pass_distribution.count(3), 10);
        assert_eq!(fighter.pass_distribution.count(7), 1);
        assert_eq!(fighter.pass_distribution.total(), 18);
        assert_eq!(fighter.age_years, Some(36.0));
    }

    #[test]
    fn fighter_missing_required_field_fails() {
        let json = r#"{ "name": "No Scores", "value": 1, "active": false, "ownedPasses": 0 }"#;
        assert!(serde_json::from_str::<Fighter>(json).is_err());
    }

    #[test]
    fn pass_levels_highest_first() {
        let mut counts = BTreeMap::new();
        counts.insert(3, 4);
        counts.insert(7, 1);
        counts.insert(5, 9);
        let dist = PassDistribution::new(counts);
        let levels: Vec<u8> = dist.levels().map(|(l, _)| l).collect();
        assert_eq!(levels, vec![7, 5, 3]);
        assert_eq!(dist.max_count(), 9);
        assert_eq!(pass_level_label(6), "Mythical");
    }
}
