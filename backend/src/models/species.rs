//! Species model
//!
//! A chemical species taking part in the reaction. Each species has:
//! - A unique name (e.g., "A", "NO2")
//! - A stoichiometric coefficient (positive integer)
//! - A current concentration and its complete recorded history
//!
//! # History Invariant
//!
//! `history[0]` is the initial concentration, and every call to
//! [`Species::record_and_set`] appends exactly one entry. Reading the
//! concentration never touches the history.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a single species (serializable setup data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Unique species identifier
    pub name: String,

    /// Stoichiometric coefficient in the balanced equation
    pub coefficient: u32,

    /// Concentration at tick 0
    pub initial_concentration: f64,
}

/// A reacting species with a concentration history
///
/// # Example
/// ```
/// use equilibrium_sim_core::Species;
///
/// let mut a = Species::new("A", 1, 1.0);
/// assert_eq!(a.concentration(), 1.0);
///
/// a.record_and_set(0.9);
/// assert_eq!(a.concentration(), 0.9);
/// assert_eq!(a.history(), &[1.0, 0.9]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    name: String,
    coefficient: u32,
    concentration: f64,
    history: Vec<f64>,
}

impl Species {
    /// Create a species with its initial concentration recorded as `history[0]`
    pub fn new(name: impl Into<String>, coefficient: u32, initial_concentration: f64) -> Self {
        Self {
            name: name.into(),
            coefficient,
            concentration: initial_concentration,
            history: vec![initial_concentration],
        }
    }

    /// Restore a species with an existing history (checkpoint restore)
    pub(crate) fn from_snapshot(
        name: String,
        coefficient: u32,
        concentration: f64,
        history: Vec<f64>,
    ) -> Self {
        Self {
            name,
            coefficient,
            concentration,
            history,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coefficient(&self) -> u32 {
        self.coefficient
    }

    /// Current concentration (read-only, never records)
    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    /// All recorded concentrations, oldest first
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Number of recorded ticks (history length minus the initial entry)
    pub fn recorded_ticks(&self) -> usize {
        self.history.len() - 1
    }

    /// Record `value` into the history, then make it the current concentration
    ///
    /// This is the only mutation path for the concentration. No validation
    /// is done: the engine owns numerical stability.
    pub fn record_and_set(&mut self, value: f64) {
        self.history.push(value);
        self.concentration = value;
    }

    /// Re-record the current concentration unchanged
    ///
    /// Keeps this species' history aligned with the shared time axis on
    /// ticks where it was not otherwise touched.
    pub fn record_unchanged(&mut self) {
        self.record_and_set(self.concentration);
    }

    /// `concentration ^ coefficient`, this species' mass-action factor
    ///
    /// Coefficients beyond `i32::MAX` saturate; the engine rejects them at setup.
    pub fn activity(&self) -> f64 {
        let exponent = i32::try_from(self.coefficient).unwrap_or(i32::MAX);
        self.concentration.powi(exponent)
    }

    /// Setup data equivalent to this species at tick 0
    pub fn to_config(&self) -> SpeciesConfig {
        SpeciesConfig {
            name: self.name.clone(),
            coefficient: self.coefficient,
            initial_concentration: self.history[0],
        }
    }
}

impl From<&SpeciesConfig> for Species {
    fn from(config: &SpeciesConfig) -> Self {
        Species::new(
            config.name.clone(),
            config.coefficient,
            config.initial_concentration,
        )
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}: {}", self.name, self.coefficient, self.concentration)
    }
}
