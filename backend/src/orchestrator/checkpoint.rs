//! Checkpoint - Save/Load Simulation State
//!
//! Enables serialization and deserialization of complete reaction state
//! for pause/resume functionality.
//!
//! # Critical Invariants
//!
//! - **Continuity**: A restored run produces the same trajectory as an uninterrupted one
//! - **History Alignment**: All histories have equal length
//! - **One-shot Perturbations**: Applied flags survive the round trip
//! - **Config Matching**: State can only be loaded with matching config
//! - **Finite Values**: Only finite concentrations and histories are saved

use crate::core::clock::SimulationClock;
use crate::events::handler::PerturbationSchedule;
use crate::events::types::{Perturbation, ScheduledPerturbation};
use crate::kinetics::RateModel;
use crate::models::event::EventLog;
use crate::models::species::Species;
use crate::models::state::{ReactionState, SpeciesRole};
use crate::orchestrator::engine::{Reaction, ReactionConfig, SimulationError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete reaction state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Current tick position
    pub current_tick: usize,

    /// Rate constants at the time of the snapshot (may differ from config)
    pub rate_model: RateModel,

    pub species: Vec<SpeciesSnapshot>,

    pub perturbations: Vec<PerturbationSnapshot>,

    pub times: Vec<usize>,
    pub quotient_history: Vec<f64>,
    pub constant_history: Vec<f64>,

    /// Audit trail up to the snapshot tick
    #[serde(default)]
    pub event_log: EventLog,

    /// SHA256 hash of the reaction config (for validation)
    pub config_hash: String,
}

/// Species state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSnapshot {
    pub name: String,
    pub role: SpeciesRole,
    pub coefficient: u32,
    pub concentration: f64,
    pub history: Vec<f64>,
}

impl SpeciesSnapshot {
    fn capture(role: SpeciesRole, species: &Species) -> Self {
        SpeciesSnapshot {
            name: species.name().to_string(),
            role,
            coefficient: species.coefficient(),
            concentration: species.concentration(),
            history: species.history().to_vec(),
        }
    }
}

impl From<SpeciesSnapshot> for Species {
    fn from(snapshot: SpeciesSnapshot) -> Self {
        Species::from_snapshot(
            snapshot.name,
            snapshot.coefficient,
            snapshot.concentration,
            snapshot.history,
        )
    }
}

/// Perturbation state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationSnapshot {
    pub perturbation: Perturbation,
    pub applied: bool,
}

impl From<&ScheduledPerturbation> for PerturbationSnapshot {
    fn from(scheduled: &ScheduledPerturbation) -> Self {
        PerturbationSnapshot {
            perturbation: scheduled.perturbation().clone(),
            applied: scheduled.is_applied(),
        }
    }
}

impl From<PerturbationSnapshot> for ScheduledPerturbation {
    fn from(snapshot: PerturbationSnapshot) -> Self {
        ScheduledPerturbation::from_snapshot(snapshot.perturbation, snapshot.applied)
    }
}

// ============================================================================
// Save / Load
// ============================================================================

impl Reaction {
    /// Capture the full engine state
    ///
    /// # Errors
    ///
    /// * `StateValidationError` - a concentration or history entry is NaN or
    ///   infinite (JSON cannot carry it back)
    pub fn snapshot(&self) -> Result<StateSnapshot, SimulationError> {
        ensure_finite("quotient history", self.quotient_history())?;
        ensure_finite("constant history", self.constant_history())?;
        for s in self.state().all_species() {
            ensure_finite(s.name(), &[s.concentration()])?;
            ensure_finite(s.name(), s.history())?;
        }

        let species = self
            .reactants()
            .iter()
            .map(|s| SpeciesSnapshot::capture(SpeciesRole::Reactant, s))
            .chain(
                self.products()
                    .iter()
                    .map(|s| SpeciesSnapshot::capture(SpeciesRole::Product, s)),
            )
            .collect();

        Ok(StateSnapshot {
            current_tick: self.current_tick(),
            rate_model: *self.rate_model(),
            species,
            perturbations: self.perturbations().iter().map(PerturbationSnapshot::from).collect(),
            times: self.times().to_vec(),
            quotient_history: self.quotient_history().to_vec(),
            constant_history: self.constant_history().to_vec(),
            event_log: self.event_log().clone(),
            config_hash: compute_config_hash(self.config())?,
        })
    }

    /// Serialize the full engine state to JSON
    pub fn save_state(&self) -> Result<String, SimulationError> {
        let snapshot = self.snapshot()?;
        serde_json::to_string(&snapshot).map_err(|e| {
            SimulationError::SerializationError(format!("Snapshot serialization failed: {}", e))
        })
    }

    /// Restore an engine from a JSON snapshot taken with the same config
    ///
    /// # Errors
    ///
    /// * `SerializationError` - malformed JSON
    /// * `ConfigMismatch` - snapshot was taken under a different config
    /// * `StateValidationError` - snapshot violates a history invariant
    /// * `InvalidRateConstant` - snapshot rate model has a zero constant
    pub fn load_state(config: ReactionConfig, json: &str) -> Result<Self, SimulationError> {
        let snapshot: StateSnapshot = serde_json::from_str(json).map_err(|e| {
            SimulationError::SerializationError(format!("Snapshot deserialization failed: {}", e))
        })?;
        Self::from_snapshot(config, snapshot)
    }

    /// Restore an engine from a snapshot taken with the same config
    pub fn from_snapshot(
        config: ReactionConfig,
        snapshot: StateSnapshot,
    ) -> Result<Self, SimulationError> {
        let expected = compute_config_hash(&config)?;
        if snapshot.config_hash != expected {
            return Err(SimulationError::ConfigMismatch {
                expected,
                actual: snapshot.config_hash,
            });
        }
        Reaction::validate_config(&config)?;
        validate_snapshot(&snapshot, &config)?;

        let mut state = ReactionState::default();
        for species in snapshot.species {
            let role = species.role;
            state.push(role, Species::from(species));
        }

        let schedule = PerturbationSchedule::from_scheduled(
            snapshot
                .perturbations
                .into_iter()
                .map(ScheduledPerturbation::from)
                .collect(),
        );

        let clock = SimulationClock::at_tick(config.dt, snapshot.current_tick);

        Ok(Reaction::from_parts(
            config,
            state,
            snapshot.rate_model,
            clock,
            schedule,
            snapshot.times,
            snapshot.quotient_history,
            snapshot.constant_history,
            snapshot.event_log,
        ))
    }
}

fn ensure_finite(series: &str, values: &[f64]) -> Result<(), SimulationError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SimulationError::StateValidationError(format!(
            "Non-finite value {} in {} at index {}",
            values[index], series, index
        ))),
        None => Ok(()),
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on field order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validate state snapshot integrity
///
/// Checks critical invariants:
/// - Non-zero rate constants
/// - Aligned histories (engine and every species)
/// - Each species concentration equals its last recorded value
/// - Species match the config (names, roles, coefficients)
/// - Perturbations match the config, and none applied in the future
pub fn validate_snapshot(
    snapshot: &StateSnapshot,
    config: &ReactionConfig,
) -> Result<(), SimulationError> {
    // 1. Rate constants
    snapshot.rate_model.validate()?;
    if snapshot.rate_model.name() != config.rate_model.name() {
        return Err(SimulationError::StateValidationError(format!(
            "Snapshot uses a {} rate model but config uses {}",
            snapshot.rate_model.name(),
            config.rate_model.name()
        )));
    }

    // 2. History alignment
    let len = snapshot.times.len();
    if len == 0 || snapshot.quotient_history.len() != len || snapshot.constant_history.len() != len
    {
        return Err(SimulationError::StateValidationError(format!(
            "Misaligned engine histories: times={}, quotient={}, constant={}",
            len,
            snapshot.quotient_history.len(),
            snapshot.constant_history.len()
        )));
    }
    if snapshot.times.last() != Some(&snapshot.current_tick) {
        return Err(SimulationError::StateValidationError(format!(
            "Time axis ends at {:?} but current tick is {}",
            snapshot.times.last(),
            snapshot.current_tick
        )));
    }
    for species in &snapshot.species {
        if species.history.len() != len {
            return Err(SimulationError::StateValidationError(format!(
                "Species {} has {} history entries, expected {}",
                species.name,
                species.history.len(),
                len
            )));
        }
        if species.history.last() != Some(&species.concentration) {
            return Err(SimulationError::StateValidationError(format!(
                "Species {} concentration {} does not match its last recorded value {:?}",
                species.name,
                species.concentration,
                species.history.last()
            )));
        }
    }

    // 3. Species identity
    let expected: Vec<(SpeciesRole, &str, u32)> = config
        .reactants
        .iter()
        .map(|s| (SpeciesRole::Reactant, s.name.as_str(), s.coefficient))
        .chain(
            config
                .products
                .iter()
                .map(|s| (SpeciesRole::Product, s.name.as_str(), s.coefficient)),
        )
        .collect();
    let actual: Vec<(SpeciesRole, &str, u32)> = snapshot
        .species
        .iter()
        .map(|s| (s.role, s.name.as_str(), s.coefficient))
        .collect();
    if expected != actual {
        return Err(SimulationError::StateValidationError(
            "Snapshot species do not match config".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for species in &snapshot.species {
        if !names.insert(species.name.as_str()) {
            return Err(SimulationError::StateValidationError(format!(
                "Duplicate species in snapshot: {}",
                species.name
            )));
        }
    }

    // 4. Perturbations
    if snapshot.perturbations.len() != config.perturbations.len()
        || snapshot
            .perturbations
            .iter()
            .zip(&config.perturbations)
            .any(|(s, c)| &s.perturbation != c)
    {
        return Err(SimulationError::StateValidationError(
            "Snapshot perturbations do not match config".to_string(),
        ));
    }
    for p in &snapshot.perturbations {
        if p.applied && p.perturbation.tick > snapshot.current_tick {
            return Err(SimulationError::StateValidationError(format!(
                "Perturbation '{}' marked applied before its tick {}",
                p.perturbation.label(),
                p.perturbation.tick
            )));
        }
    }

    Ok(())
}
