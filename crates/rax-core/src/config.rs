// Configuration loading and parsing (policy.toml, tiers.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::tiers::{TierTable, TiersFile};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub policy: Policy,
    pub tiers: TierTable,
    pub data_paths: DataPaths,
    /// Forced activity flags applied last during roster builds.
    pub active_overrides: HashMap<String, bool>,
}

// ---------------------------------------------------------------------------
// policy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire policy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct PolicyFile {
    policy: Policy,
    data_paths: DataPaths,
    #[serde(default)]
    active_overrides: HashMap<String, bool>,
}

/// Tunable engine policy. Passed explicitly into the engine entry points.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Policy {
    /// Fighters allowed to claim the same month-day before the rest forfeit.
    pub max_concurrent_claims: usize,
    /// Upper bound on the size of a selection set.
    pub max_selection: usize,
    /// Multiplier used for any fighter without an explicit choice.
    pub default_multiplier: f64,
    /// Number of recommendations returned by the ranker.
    pub recommendation_limit: usize,
    /// Scarcity score bonus applied to active fighters.
    pub active_bonus: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_concurrent_claims: 3,
            max_selection: 15,
            default_multiplier: 1.2,
            recommendation_limit: 5,
            active_bonus: 1.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Processed roster snapshot (JSON).
    pub roster: String,
    /// Raw inputs for rebuilding the snapshot.
    #[serde(default)]
    pub fighter_values: Option<String>,
    #[serde(default)]
    pub fight_history: Option<String>,
    #[serde(default)]
    pub owned_passes: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/policy.toml` and
/// `config/tiers.toml`, both relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- policy.toml (required) ---
    let policy_path = config_dir.join("policy.toml");
    let policy_text = read_file(&policy_path)?;
    let policy_file: PolicyFile =
        toml::from_str(&policy_text).map_err(|e| ConfigError::ParseError {
            path: policy_path.clone(),
            source: e,
        })?;

    // --- tiers.toml (required) ---
    let tiers_path = config_dir.join("tiers.toml");
    let tiers_text = read_file(&tiers_path)?;
    let tiers_file: TiersFile =
        toml::from_str(&tiers_text).map_err(|e| ConfigError::ParseError {
            path: tiers_path.clone(),
            source: e,
        })?;

    let config = Config {
        policy: policy_file.policy,
        tiers: tiers_file.into_table(),
        data_paths: policy_file.data_paths,
        active_overrides: policy_file.active_overrides,
    };

    validate(&config)?;

    Ok(config)
}

/// Files under `config/` that are seeded from `defaults/`.
pub const CONFIG_FILES: [&str; 2] = ["policy.toml", "tiers.toml"];

/// Seed `config/` with any of `CONFIG_FILES` it lacks, copying from
/// `defaults/`. Existing files are left alone. Returns the files written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let missing: Vec<&str> = CONFIG_FILES
        .iter()
        .copied()
        .filter(|name| !config_dir.join(name).exists())
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let copy_error = |message: String| ConfigError::DefaultsCopyError { message };

    if !defaults_dir.is_dir() {
        return Err(copy_error(format!(
            "config/ is missing {} and no defaults/ directory exists in {}",
            missing.join(", "),
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create {}: {e}", config_dir.display())))?;

    let mut copied = Vec::with_capacity(missing.len());
    for name in missing {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        std::fs::copy(&source, &target).map_err(|e| {
            copy_error(format!("failed to copy {}: {e}", source.display()))
        })?;
        info!("seeded {} from defaults", target.display());
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_policy(&config.policy)?;
    validate_tiers(&config.tiers)?;

    if config.tiers.find(config.policy.default_multiplier).is_none() {
        return Err(invalid(
            "policy.default_multiplier",
            format!(
                "{} does not match any tier in tiers.toml",
                config.policy.default_multiplier
            ),
        ));
    }

    Ok(())
}

pub(crate) fn validate_policy(policy: &Policy) -> Result<(), ConfigError> {
    let count_fields: &[(&str, usize)] = &[
        ("policy.max_concurrent_claims", policy.max_concurrent_claims),
        ("policy.max_selection", policy.max_selection),
        ("policy.recommendation_limit", policy.recommendation_limit),
    ];
    for (name, val) in count_fields {
        if *val == 0 {
            return Err(invalid(*name, "must be > 0"));
        }
    }

    if !policy.active_bonus.is_finite() || policy.active_bonus <= 0.0 {
        return Err(invalid(
            "policy.active_bonus",
            format!("must be a finite value > 0, got {}", policy.active_bonus),
        ));
    }

    Ok(())
}

pub(crate) fn validate_tiers(tiers: &TierTable) -> Result<(), ConfigError> {
    if tiers.is_empty() {
        return Err(invalid("tiers", "at least one tier is required"));
    }

    for tier in tiers.tiers() {
        if !tier.multiplier.is_finite() || tier.multiplier <= 0.0 {
            return Err(invalid(
                format!("tiers.{}.multiplier", tier.label),
                format!("must be a finite value > 0, got {}", tier.multiplier),
            ));
        }
    }

    for pair in tiers.tiers().windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if hi.multiplier <= lo.multiplier {
            return Err(invalid(
                format!("tiers.{}.multiplier", hi.label),
                format!(
                    "must be greater than the preceding tier `{}` ({} <= {})",
                    lo.label, hi.multiplier, lo.multiplier
                ),
            ));
        }
        match (lo.cap, hi.cap) {
            (None, Some(_)) => {
                return Err(invalid(
                    format!("tiers.{}.cap", hi.label),
                    format!("cannot be capped after the uncapped tier `{}`", lo.label),
                ));
            }
            (Some(a), Some(b)) if b < a => {
                return Err(invalid(
                    format!("tiers.{}.cap", hi.label),
                    format!("must not decrease ({} < {} of `{}`)", b, a, lo.label),
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
