// Selection sets and per-fighter multiplier choices.
//
// Both are caller-owned inputs: the engine only ever reads a snapshot of
// them and never keeps them between calls.

use std::collections::HashMap;
use thiserror::Error;

use crate::model::Fighter;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection is full ({limit} fighters)")]
    Full { limit: usize },

    #[error("fighter `{name}` is already selected")]
    Duplicate { name: String },
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// An ordered, size-bounded set of fighters with unique names.
#[derive(Debug, Clone)]
pub struct Selection {
    fighters: Vec<Fighter>,
    limit: usize,
}

impl Selection {
    pub fn new(limit: usize) -> Self {
        Self {
            fighters: Vec::new(),
            limit,
        }
    }

    /// Append a fighter, keeping insertion order.
    pub fn add(&mut self, fighter: Fighter) -> Result<(), SelectionError> {
        if self.contains(&fighter.name) {
            return Err(SelectionError::Duplicate { name: fighter.name });
        }
        if self.fighters.len() >= self.limit {
            return Err(SelectionError::Full { limit: self.limit });
        }
        self.fighters.push(fighter);
        Ok(())
    }

    /// Remove a fighter by name. Returns the removed fighter, if present.
    pub fn remove(&mut self, name: &str) -> Option<Fighter> {
        let idx = self.fighters.iter().position(|f| f.name == name)?;
        Some(self.fighters.remove(idx))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fighters.iter().any(|f| f.name == name)
    }

    pub fn fighters(&self) -> &[Fighter] {
        &self.fighters
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fighters.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fighters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fighters.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.fighters.len() >= self.limit
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

// ---------------------------------------------------------------------------
// Multiplier choices
// ---------------------------------------------------------------------------

/// The multiplier chosen for each fighter, with a fallback for fighters the
/// user has not set.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplierChoices {
    default: f64,
    by_name: HashMap<String, f64>,
}

impl MultiplierChoices {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            by_name: HashMap::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, multiplier: f64) {
        self.by_name.insert(name.into(), multiplier);
    }

    /// Builder-style variant of `set`.
    pub fn with(mut self, name: impl Into<String>, multiplier: f64) -> Self {
        self.set(name, multiplier);
        self
    }

    pub fn multiplier_of(&self, name: &str) -> f64 {
        self.by_name.get(name).copied().unwrap_or(self.default)
    }

    pub fn default_multiplier(&self) -> f64 {
        self.default
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PassDistribution;

    fn fighter(name: &str) -> Fighter {
        Fighter {
            name: name.into(),
            base_value: 100.0,
            scores: Vec::new(),
            active: true,
            owned_passes: 10,
            id: None,
            pass_distribution: PassDistribution::default(),
            age_years: None,
        }
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut sel = Selection::new(15);
        sel.add(fighter("B")).unwrap();
        sel.add(fighter("A")).unwrap();
        sel.add(fighter("C")).unwrap();
        assert_eq!(sel.names().collect::<Vec<_>>(), vec!["B", "A", "C"]);
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut sel = Selection::new(15);
        sel.add(fighter("A")).unwrap();
        let err = sel.add(fighter("A")).unwrap_err();
        assert_eq!(err, SelectionError::Duplicate { name: "A".into() });
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn add_rejects_when_full() {
        let mut sel = Selection::new(2);
        sel.add(fighter("A")).unwrap();
        sel.add(fighter("B")).unwrap();
        assert!(sel.is_full());
        let err = sel.add(fighter("C")).unwrap_err();
        assert_eq!(err, SelectionError::Full { limit: 2 });
    }

    #[test]
    fn remove_frees_a_slot() {
        let mut sel = Selection::new(2);
        sel.add(fighter("A")).unwrap();
        sel.add(fighter("B")).unwrap();
        assert_eq!(sel.remove("A").map(|f| f.name), Some("A".to_string()));
        assert!(sel.remove("A").is_none());
        sel.add(fighter("C")).unwrap();
        assert_eq!(sel.names().collect::<Vec<_>>(), vec!["B", "C"]);
    }

    #[test]
    fn multiplier_falls_back_to_default() {
        let choices = MultiplierChoices::new(1.2).with("A", 2.0);
        assert_eq!(choices.multiplier_of("A"), 2.0);
        assert_eq!(choices.multiplier_of("B"), 1.2);
        assert_eq!(choices.default_multiplier(), 1.2);
    }
}
