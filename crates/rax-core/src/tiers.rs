// Rarity tier table: multiplier, label, and annual Rax cap per tier.
//
// Tiers are grouped into bands (Basic, Legendary, Mystic, Iconic). The table
// is ordered by ascending multiplier and caps form a non-decreasing step
// function over it, with the top band uncapped.

use serde::Deserialize;
use tracing::debug;

/// Absolute tolerance used when matching a raw multiplier to a tier.
pub const MULTIPLIER_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Tier types
// ---------------------------------------------------------------------------

/// A single selectable rarity tier.
#[derive(Debug, Clone, PartialEq)]
pub struct RarityTier {
    pub label: String,
    pub band: String,
    pub multiplier: f64,
    /// Annual Rax ceiling. `None` means unbounded.
    pub cap: Option<u32>,
}

/// The full ordered tier table consumed by the valuation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable {
    tiers: Vec<RarityTier>,
}

// ---------------------------------------------------------------------------
// tiers.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TiersFile {
    pub bands: Vec<BandSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BandSection {
    pub name: String,
    /// Band-wide cap, used by sub-tiers that do not set their own.
    #[serde(default)]
    pub cap: Option<u32>,
    #[serde(default)]
    pub tiers: Vec<TierEntry>,
    /// Shorthand for numbered sub-tiers sharing the band cap.
    #[serde(default)]
    pub multipliers: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TierEntry {
    pub label: String,
    pub multiplier: f64,
    #[serde(default)]
    pub cap: Option<u32>,
}

impl TiersFile {
    /// Flatten bands into an ordered tier list. Explicit tiers come before
    /// numbered shorthand tiers within a band.
    pub(crate) fn into_table(self) -> TierTable {
        let mut tiers = Vec::new();
        for band in self.bands {
            for entry in band.tiers {
                tiers.push(RarityTier {
                    label: entry.label,
                    band: band.name.clone(),
                    multiplier: entry.multiplier,
                    cap: entry.cap.or(band.cap),
                });
            }
            for (i, &multiplier) in band.multipliers.iter().enumerate() {
                tiers.push(RarityTier {
                    label: format!("{} {}", band.name, i + 1),
                    band: band.name.clone(),
                    multiplier,
                    cap: band.cap,
                });
            }
        }
        TierTable { tiers }
    }
}

// ---------------------------------------------------------------------------
// Table construction and lookup
// ---------------------------------------------------------------------------

/// Round away float drift from stepped multipliers (5.0 + 3 * 0.4 etc).
fn round_tenths(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn stepped(band: &str, start: f64, step: f64, count: usize, cap: Option<u32>) -> Vec<RarityTier> {
    (0..count)
        .map(|i| RarityTier {
            label: format!("{} {}", band, i + 1),
            band: band.to_string(),
            multiplier: round_tenths(start + step * i as f64),
            cap,
        })
        .collect()
}

impl Default for TierTable {
    /// The standard table: four Basic tiers, then Legendary (5), Mystic (10)
    /// and Iconic (20) sub-tiers.
    fn default() -> Self {
        let basic = [
            ("Common", 1.2, 1500),
            ("Uncommon", 1.4, 2500),
            ("Rare", 1.6, 4000),
            ("Epic", 2.0, 6000),
        ];
        let mut tiers: Vec<RarityTier> = basic
            .iter()
            .map(|&(label, multiplier, cap)| RarityTier {
                label: label.to_string(),
                band: "Basic".to_string(),
                multiplier,
                cap: Some(cap),
            })
            .collect();
        tiers.extend(stepped("Legendary", 5.0, 0.4, 5, Some(12_000)));
        tiers.extend(stepped("Mystic", 10.0, 0.2, 10, Some(24_000)));
        tiers.extend(stepped("Iconic", 20.0, 0.3, 20, None));
        TierTable { tiers }
    }
}

impl TierTable {
    /// Build a table from an explicit tier list. Ordering and cap
    /// monotonicity are checked by config validation, not here.
    pub fn new(tiers: Vec<RarityTier>) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &[RarityTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// The lowest tier; its multiplier is the default for unchosen fighters.
    pub fn base(&self) -> Option<&RarityTier> {
        self.tiers.first()
    }

    /// Find the tier whose multiplier matches within `MULTIPLIER_TOLERANCE`.
    pub fn find(&self, multiplier: f64) -> Option<&RarityTier> {
        self.tiers
            .iter()
            .find(|t| (t.multiplier - multiplier).abs() < MULTIPLIER_TOLERANCE)
    }

    /// Find a tier by label, ignoring ASCII case.
    pub fn by_label(&self, label: &str) -> Option<&RarityTier> {
        let label = label.trim();
        self.tiers.iter().find(|t| t.label.eq_ignore_ascii_case(label))
    }

    /// Annual cap for a multiplier. Unknown multipliers are unbounded.
    pub fn cap_for(&self, multiplier: f64) -> Option<f64> {
        match self.find(multiplier) {
            Some(tier) => tier.cap.map(f64::from),
            None => {
                debug!("multiplier {} not in tier table, treating as uncapped", multiplier);
                None
            }
        }
    }

    /// Resolve a user-supplied tier reference: a label ("Epic",
    /// "Legendary 3") or a multiplier value ("2.0").
    pub fn resolve(&self, reference: &str) -> Option<&RarityTier> {
        self.by_label(reference).or_else(|| {
            reference
                .trim()
                .trim_end_matches(['x', 'X'])
                .parse::<f64>()
                .ok()
                .and_then(|m| self.find(m))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
