//! Reaction Engine
//!
//! Main simulation loop for a single reversible reaction:
//! - Perturbation application (scheduled, one-shot)
//! - Mass-action rate evaluation
//! - Forward Euler integration of species concentrations
//! - History recording (time axis, quotient, constant)
//!
//! # Architecture
//!
//! ```text
//! For each tick t:
//! 1. Apply perturbations due at t (each concentration jump records a point at t)
//! 2. Compute forward/backward rates
//! 3. Integrate reactants and products by dt * coefficient * net rate
//! 4. Advance time to t + 1
//! 5. Record t + 1, Q, and the current constant
//! ```
//!
//! # Example
//!
//! ```rust
//! use equilibrium_sim_core::{Perturbation, RateModel, Reaction, ReactionConfig, SpeciesConfig};
//!
//! let config = ReactionConfig {
//!     rate_model: RateModel::SingleConstant { k: 1.2 },
//!     reactants: vec![
//!         SpeciesConfig { name: "A".to_string(), coefficient: 1, initial_concentration: 0.5 },
//!         SpeciesConfig { name: "B".to_string(), coefficient: 2, initial_concentration: 0.75 },
//!     ],
//!     products: vec![
//!         SpeciesConfig { name: "C".to_string(), coefficient: 1, initial_concentration: 0.0 },
//!     ],
//!     perturbations: vec![Perturbation::concentration("C", 0.2, 30).with_label("add C")],
//!     ..ReactionConfig::default()
//! };
//!
//! let mut reaction = Reaction::new(config).unwrap();
//! let summary = reaction.run_to_equilibrium(0.001).unwrap();
//! assert!(summary.end_tick > 30);
//! assert_eq!(reaction.equation_string(), "1A + 2B <=> 1C");
//! ```

use crate::core::clock::SimulationClock;
use crate::events::handler::{PerturbationEffect, PerturbationSchedule};
use crate::events::types::{Perturbation, PerturbationKind, ScheduledPerturbation};
use crate::kinetics::RateModel;
use crate::models::event::{Event, EventLog};
use crate::models::species::{Species, SpeciesConfig};
use crate::models::state::{ReactionState, SpeciesRole};
use crate::reporting;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Step size used when a config does not specify one
pub const DEFAULT_DT: f64 = 0.03;

/// Iteration cap used when a config does not specify one
pub const DEFAULT_MAX_ITERATIONS: usize = 1_000_000;

/// Largest stoichiometric coefficient accepted (the `powi` exponent range)
pub const MAX_COEFFICIENT: u32 = i32::MAX as u32;

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete reaction configuration
///
/// # Fields
///
/// * `rate_model` - Single `K` or independent `kf`/`kr`
/// * `dt` - Forward Euler step size
/// * `reactants` / `products` - Species in equation order
/// * `perturbations` - Scheduled one-shot mutations
/// * `max_iterations` - Step cap for convergence runs
/// * `strict_species_references` - Reject perturbations naming unknown species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionConfig {
    pub rate_model: RateModel,

    #[serde(default = "default_dt")]
    pub dt: f64,

    #[serde(default)]
    pub reactants: Vec<SpeciesConfig>,

    #[serde(default)]
    pub products: Vec<SpeciesConfig>,

    #[serde(default)]
    pub perturbations: Vec<Perturbation>,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_strict")]
    pub strict_species_references: bool,
}

fn default_dt() -> f64 {
    DEFAULT_DT
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_strict() -> bool {
    true
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            rate_model: RateModel::SingleConstant { k: 1.0 },
            dt: DEFAULT_DT,
            reactants: Vec::new(),
            products: Vec::new(),
            perturbations: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            strict_species_references: true,
        }
    }
}

impl ReactionConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::SerializationError(format!("Invalid config JSON: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimulationError::SerializationError(format!("Config serialization failed: {}", e)))
    }
}

// ============================================================================
// Errors and Results
// ============================================================================

/// Simulation error types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid rate constant {parameter}={value}: rate constants must be non-zero and finite")]
    InvalidRateConstant { parameter: &'static str, value: f64 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown species '{species}' referenced by perturbation at tick {tick}")]
    UnknownSpeciesReference { species: String, tick: usize },

    #[error("Perturbation {perturbation} cannot act on a {model} rate model")]
    RateModelMismatch { perturbation: String, model: String },

    #[error("No equilibrium after {iterations} iterations (residual {residual})")]
    NonConvergence { iterations: usize, residual: f64 },

    #[error("Run cancelled at tick {tick}")]
    Cancelled { tick: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("State validation error: {0}")]
    StateValidationError(String),

    #[error("Config mismatch: expected hash {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },
}

/// Result of a single integration step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Tick reached by this step
    pub tick: usize,

    /// Rates used for the integration
    pub forward: f64,
    pub backward: f64,

    /// Quotient recorded for this tick
    pub quotient: f64,

    /// Perturbations that fired before integrating
    pub perturbations_applied: usize,
}

/// Outcome of a multi-step run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub start_tick: usize,
    pub end_tick: usize,
    pub steps: usize,
    /// `|forward - backward|` at the final state
    pub final_residual: f64,
    pub final_quotient: f64,
    pub final_constant: f64,
    pub perturbations_applied: usize,
}

// ============================================================================
// Reaction
// ============================================================================

/// Reaction engine owning species, rate model, schedule, and histories
///
/// # History Invariant
///
/// `times`, `quotient_history`, `constant_history`, and every species
/// history always have the same length. A tick at which a concentration
/// perturbation fires is recorded twice: once after the perturbation, once
/// after the integration step that follows it.
#[derive(Debug, Clone)]
pub struct Reaction {
    /// Setup data, kept current with incremental additions
    config: ReactionConfig,

    /// Reactant and product species
    state: ReactionState,

    /// Rate constants (mutated by perturbations)
    rate_model: RateModel,

    /// Tick counter and step size
    clock: SimulationClock,

    /// Registered perturbations
    schedule: PerturbationSchedule,

    times: Vec<usize>,
    quotient_history: Vec<f64>,
    constant_history: Vec<f64>,

    event_log: EventLog,
}

impl Reaction {
    /// Create a reaction from configuration
    ///
    /// All validation happens before any state is built.
    ///
    /// # Errors
    ///
    /// * `InvalidRateConstant` - K, kf, or kr is zero or non-finite
    /// * `InvalidConfig` - bad dt, coefficient, concentration, or duplicate names
    /// * `UnknownSpeciesReference` - strict mode and a perturbation names a missing species
    /// * `RateModelMismatch` - a rate perturbation targets a constant the model lacks
    pub fn new(config: ReactionConfig) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        let reactants = config.reactants.iter().map(Species::from).collect();
        let products = config.products.iter().map(Species::from).collect();
        let state = ReactionState::new(reactants, products);

        let mut schedule = PerturbationSchedule::new();
        for perturbation in &config.perturbations {
            schedule.push(perturbation.clone());
        }

        let mut reaction = Self {
            rate_model: config.rate_model,
            clock: SimulationClock::new(config.dt),
            state,
            schedule,
            times: Vec::new(),
            quotient_history: Vec::new(),
            constant_history: Vec::new(),
            event_log: EventLog::new(),
            config,
        };
        reaction.reset_initial_point();
        Ok(reaction)
    }

    /// Validate configuration
    pub(crate) fn validate_config(config: &ReactionConfig) -> Result<(), SimulationError> {
        config.rate_model.validate()?;

        if !(config.dt > 0.0 && config.dt.is_finite()) {
            return Err(SimulationError::InvalidConfig(format!(
                "dt must be positive and finite, got {}",
                config.dt
            )));
        }

        if config.max_iterations == 0 {
            return Err(SimulationError::InvalidConfig(
                "max_iterations must be > 0".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for species in config.reactants.iter().chain(config.products.iter()) {
            validate_species(species)?;
            if !names.insert(species.name.as_str()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "Duplicate species name: {}",
                    species.name
                )));
            }
        }

        for perturbation in &config.perturbations {
            validate_perturbation(
                perturbation,
                &config.rate_model,
                |name| names.contains(name),
                config.strict_species_references,
            )?;
        }

        Ok(())
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Append a reactant (only before the first step)
    pub fn add_reactant(&mut self, species: Species) -> Result<(), SimulationError> {
        self.add_species(SpeciesRole::Reactant, species)
    }

    /// Append a product (only before the first step)
    pub fn add_product(&mut self, species: Species) -> Result<(), SimulationError> {
        self.add_species(SpeciesRole::Product, species)
    }

    fn add_species(&mut self, role: SpeciesRole, species: Species) -> Result<(), SimulationError> {
        if self.has_started() {
            return Err(SimulationError::InvalidConfig(format!(
                "Cannot add {} {} after the simulation has started",
                role,
                species.name()
            )));
        }
        if species.recorded_ticks() != 0 {
            return Err(SimulationError::InvalidConfig(format!(
                "Species {} already has recorded history",
                species.name()
            )));
        }

        let species_config = species.to_config();
        validate_species(&species_config)?;
        if self.state.contains(species.name()) {
            return Err(SimulationError::InvalidConfig(format!(
                "Duplicate species name: {}",
                species.name()
            )));
        }

        match role {
            SpeciesRole::Reactant => self.config.reactants.push(species_config),
            SpeciesRole::Product => self.config.products.push(species_config),
        }
        self.state.push(role, species);
        self.reset_initial_point();
        Ok(())
    }

    /// Register a perturbation
    ///
    /// # Errors
    ///
    /// * `InvalidConfig` - scheduled before the current tick (it could never fire)
    /// * `UnknownSpeciesReference` - strict mode and the species is absent
    /// * `RateModelMismatch` - the rate model has no such constant
    pub fn add_perturbation(&mut self, perturbation: Perturbation) -> Result<(), SimulationError> {
        let current_tick = self.clock.current_tick();
        if perturbation.tick < current_tick {
            return Err(SimulationError::InvalidConfig(format!(
                "Perturbation '{}' scheduled at tick {} but simulation is at tick {}",
                perturbation.label(),
                perturbation.tick,
                current_tick
            )));
        }
        let state = &self.state;
        validate_perturbation(
            &perturbation,
            &self.rate_model,
            |name| state.contains(name),
            self.config.strict_species_references,
        )?;

        self.config.perturbations.push(perturbation.clone());
        self.schedule.push(perturbation);
        Ok(())
    }

    /// Rebuild the tick-0 history entries from the current species set
    fn reset_initial_point(&mut self) {
        self.times = vec![0];
        self.quotient_history = vec![self.reaction_quotient()];
        self.constant_history = vec![self.current_constant()];
    }

    fn has_started(&self) -> bool {
        self.clock.current_tick() > 0 || self.times.len() > 1
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn current_tick(&self) -> usize {
        self.clock.current_tick()
    }

    pub fn dt(&self) -> f64 {
        self.clock.dt()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn config(&self) -> &ReactionConfig {
        &self.config
    }

    pub fn rate_model(&self) -> &RateModel {
        &self.rate_model
    }

    pub fn state(&self) -> &ReactionState {
        &self.state
    }

    pub fn reactants(&self) -> &[Species] {
        self.state.reactants()
    }

    pub fn products(&self) -> &[Species] {
        self.state.products()
    }

    pub fn species(&self, name: &str) -> Option<&Species> {
        self.state.get_species(name)
    }

    pub fn perturbations(&self) -> &[ScheduledPerturbation] {
        self.schedule.perturbations()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Time axis: one entry per recorded point
    pub fn times(&self) -> &[usize] {
        &self.times
    }

    /// Concentration history of the named species
    pub fn history(&self, name: &str) -> Option<&[f64]> {
        self.state.get_species(name).map(Species::history)
    }

    pub fn quotient_history(&self) -> &[f64] {
        &self.quotient_history
    }

    pub fn constant_history(&self) -> &[f64] {
        &self.constant_history
    }

    /// Latest scheduled perturbation tick; runs stop only after passing it
    pub fn min_end_tick(&self) -> usize {
        self.schedule.min_end_tick()
    }

    /// `"1A + 2B <=> 1C"` built from the ordered species lists
    pub fn equation_string(&self) -> String {
        reporting::format_equation(self.state.reactants(), self.state.products())
    }

    /// Full read-only trajectory for downstream plotting
    pub fn trajectory(&self) -> reporting::Trajectory {
        reporting::Trajectory::from_reaction(self)
    }

    // ========================================================================
    // Kinetics
    // ========================================================================

    /// Forward and backward mass-action rates at the current concentrations
    pub fn rates(&self) -> (f64, f64) {
        self.rate_model
            .rates(self.state.reactant_activity(), self.state.product_activity())
    }

    /// Reaction quotient at the current concentrations
    pub fn reaction_quotient(&self) -> f64 {
        let (forward, backward) = self.rates();
        self.rate_model.reaction_quotient(forward, backward)
    }

    /// Current equilibrium constant (`K` or `kf / kr`)
    pub fn current_constant(&self) -> f64 {
        self.rate_model.current_constant()
    }

    /// `|forward - backward|` at the current concentrations
    pub fn residual(&self) -> f64 {
        let (forward, backward) = self.rates();
        (forward - backward).abs()
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Apply every unapplied perturbation scheduled for the current tick
    ///
    /// Perturbations fire in registration order. Each concentration
    /// adjustment records an extra point at the current tick.
    ///
    /// The batch is all-or-nothing: if any due perturbation would fail,
    /// none is applied and no point is recorded.
    ///
    /// # Returns
    ///
    /// Number of perturbations applied
    pub fn apply_due_perturbations(&mut self) -> Result<usize, SimulationError> {
        let tick = self.clock.current_tick();
        let strict = self.config.strict_species_references;
        let due = self.schedule.due_indices(tick);

        if let Err(e) = self
            .schedule
            .check_batch(&due, &self.state, &self.rate_model, strict)
        {
            warn!("t={}: perturbation batch rejected: {}", tick, e);
            return Err(e);
        }

        for &index in &due {
            let effect =
                self.schedule
                    .apply_at(index, &mut self.state, &mut self.rate_model, strict)?;

            let perturbation = self.schedule.perturbations()[index].perturbation();
            let label = perturbation.label();
            let kind = perturbation.kind.name().to_string();

            match &effect {
                PerturbationEffect::ConcentrationAdjusted { species, old, new } => {
                    debug!("t={}: '{}' moved {} from {} to {}", tick, label, species, old, new);
                }
                PerturbationEffect::UnknownSpecies { species } => {
                    warn!(
                        "t={}: '{}' references unknown species {}, ignoring",
                        tick, label, species
                    );
                    self.event_log.log(Event::UnknownSpeciesIgnored {
                        tick,
                        species: species.clone(),
                    });
                }
                PerturbationEffect::RateChanged {
                    old_constant,
                    new_constant,
                } => {
                    debug!(
                        "t={}: '{}' changed constant from {} to {}",
                        tick, label, old_constant, new_constant
                    );
                }
            }

            if effect.records_point() {
                self.record_point(tick);
            }
            self.event_log
                .log(Event::PerturbationApplied { tick, label, kind });
        }

        Ok(due.len())
    }

    /// Execute one integration step
    ///
    /// 1. Apply due perturbations
    /// 2. Compute rates
    /// 3. Integrate every species by `dt * coefficient * net rate`
    /// 4. Advance time and record the new point
    ///
    /// The recorded quotient is evaluated from the rates used for the
    /// integration, i.e. the concentrations at the start of the step.
    pub fn step(&mut self) -> Result<StepResult, SimulationError> {
        self.ensure_runnable()?;

        let perturbations_applied = self.apply_due_perturbations()?;

        let (forward, backward) = self.rates();
        let net = forward - backward;
        let dt = self.clock.dt();

        for r in self.state.reactants_mut() {
            let updated = r.concentration() - dt * r.coefficient() as f64 * net;
            r.record_and_set(updated);
        }
        for p in self.state.products_mut() {
            let updated = p.concentration() - dt * p.coefficient() as f64 * -net;
            p.record_and_set(updated);
        }

        self.clock.advance_tick();
        let tick = self.clock.current_tick();
        let quotient = self.rate_model.reaction_quotient(forward, backward);

        self.times.push(tick);
        self.quotient_history.push(quotient);
        self.constant_history.push(self.current_constant());

        Ok(StepResult {
            tick,
            forward,
            backward,
            quotient,
            perturbations_applied,
        })
    }

    /// Step until `|forward - backward| < threshold` and every perturbation had its chance
    ///
    /// # Errors
    ///
    /// * `NonConvergence` - `max_iterations` steps taken without terminating
    /// * any error raised by [`Reaction::step`]
    pub fn run_to_equilibrium(&mut self, threshold: f64) -> Result<RunSummary, SimulationError> {
        self.run_until_equilibrium(threshold, None)
    }

    /// Same as [`Reaction::run_to_equilibrium`], checking `cancel` before every iteration
    pub fn run_to_equilibrium_with_cancel(
        &mut self,
        threshold: f64,
        cancel: &AtomicBool,
    ) -> Result<RunSummary, SimulationError> {
        self.run_until_equilibrium(threshold, Some(cancel))
    }

    fn run_until_equilibrium(
        &mut self,
        threshold: f64,
        cancel: Option<&AtomicBool>,
    ) -> Result<RunSummary, SimulationError> {
        if !(threshold > 0.0 && threshold.is_finite()) {
            return Err(SimulationError::InvalidConfig(format!(
                "threshold must be positive and finite, got {}",
                threshold
            )));
        }
        self.ensure_runnable()?;

        let start_tick = self.clock.current_tick();
        let min_end_tick = self.schedule.min_end_tick();
        let applied_before = self.schedule.applied_count();
        let max_iterations = self.config.max_iterations;

        info!(
            "Running {} to equilibrium (threshold={}, dt={}, min_end_tick={})",
            self.equation_string(),
            threshold,
            self.clock.dt(),
            min_end_tick
        );
        self.event_log.log(Event::RunStarted {
            tick: start_tick,
            threshold,
            min_end_tick,
        });

        let mut iterations = 0;
        loop {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(SimulationError::Cancelled {
                        tick: self.clock.current_tick(),
                    });
                }
            }

            let residual = self.residual();
            if residual < threshold && self.clock.is_past(min_end_tick) {
                let tick = self.clock.current_tick();
                let quotient = self.reaction_quotient();
                self.event_log.log(Event::EquilibriumReached {
                    tick,
                    residual,
                    quotient,
                });
                info!(
                    "Equilibrium reached at t={} after {} steps (Q={}, K={})",
                    tick,
                    iterations,
                    quotient,
                    self.current_constant()
                );
                debug!("{}", self.state_summary());

                return Ok(RunSummary {
                    start_tick,
                    end_tick: tick,
                    steps: iterations,
                    final_residual: residual,
                    final_quotient: quotient,
                    final_constant: self.current_constant(),
                    perturbations_applied: self.schedule.applied_count() - applied_before,
                });
            }

            if iterations >= max_iterations {
                warn!(
                    "No equilibrium after {} iterations (residual={})",
                    iterations, residual
                );
                return Err(SimulationError::NonConvergence {
                    iterations,
                    residual,
                });
            }

            self.step()?;
            iterations += 1;
        }
    }

    /// Execute exactly `ticks` steps regardless of convergence
    pub fn run_for(&mut self, ticks: usize) -> Result<RunSummary, SimulationError> {
        let start_tick = self.clock.current_tick();
        let applied_before = self.schedule.applied_count();

        for _ in 0..ticks {
            self.step()?;
        }

        Ok(RunSummary {
            start_tick,
            end_tick: self.clock.current_tick(),
            steps: ticks,
            final_residual: self.residual(),
            final_quotient: self.reaction_quotient(),
            final_constant: self.current_constant(),
            perturbations_applied: self.schedule.applied_count() - applied_before,
        })
    }

    /// Human-readable dump of every species at the current tick
    pub fn state_summary(&self) -> String {
        let mut out = format!("{}:\n\tReactants:\n", self.clock.current_tick());
        for r in self.state.reactants() {
            out.push_str(&format!("\t\t{}\n", r));
        }
        out.push_str("\tProducts:\n");
        for p in self.state.products() {
            out.push_str(&format!("\t\t{}\n", p));
        }
        out
    }

    fn record_point(&mut self, tick: usize) {
        self.times.push(tick);
        self.quotient_history.push(self.reaction_quotient());
        self.constant_history.push(self.current_constant());
    }

    fn ensure_runnable(&self) -> Result<(), SimulationError> {
        if self.state.reactants().is_empty() || self.state.products().is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Reaction needs at least one reactant and one product".to_string(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Checkpoint Support
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config: ReactionConfig,
        state: ReactionState,
        rate_model: RateModel,
        clock: SimulationClock,
        schedule: PerturbationSchedule,
        times: Vec<usize>,
        quotient_history: Vec<f64>,
        constant_history: Vec<f64>,
        event_log: EventLog,
    ) -> Self {
        Self {
            config,
            state,
            rate_model,
            clock,
            schedule,
            times,
            quotient_history,
            constant_history,
            event_log,
        }
    }
}

fn validate_species(species: &SpeciesConfig) -> Result<(), SimulationError> {
    if species.name.is_empty() {
        return Err(SimulationError::InvalidConfig(
            "Species name must not be empty".to_string(),
        ));
    }
    if species.coefficient == 0 {
        return Err(SimulationError::InvalidConfig(format!(
            "Species {} must have a positive coefficient",
            species.name
        )));
    }
    if species.coefficient > MAX_COEFFICIENT {
        return Err(SimulationError::InvalidConfig(format!(
            "Species {} coefficient {} exceeds {}",
            species.name, species.coefficient, MAX_COEFFICIENT
        )));
    }
    if !(species.initial_concentration >= 0.0 && species.initial_concentration.is_finite()) {
        return Err(SimulationError::InvalidConfig(format!(
            "Species {} has invalid initial concentration {}",
            species.name, species.initial_concentration
        )));
    }
    Ok(())
}

fn validate_perturbation<F>(
    perturbation: &Perturbation,
    rate_model: &RateModel,
    has_species: F,
    strict: bool,
) -> Result<(), SimulationError>
where
    F: Fn(&str) -> bool,
{
    if !rate_model.accepts(&perturbation.kind) {
        return Err(SimulationError::RateModelMismatch {
            perturbation: perturbation.kind.name().to_string(),
            model: rate_model.name().to_string(),
        });
    }
    if let PerturbationKind::AdjustConcentration { species, .. } = &perturbation.kind {
        if strict && !has_species(species) {
            return Err(SimulationError::UnknownSpeciesReference {
                species: species.clone(),
                tick: perturbation.tick,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species(name: &str, coefficient: u32, initial: f64) -> SpeciesConfig {
        SpeciesConfig {
            name: name.to_string(),
            coefficient,
            initial_concentration: initial,
        }
    }

    #[test]
    fn test_duplicate_species_rejected() {
        let config = ReactionConfig {
            reactants: vec![species("A", 1, 1.0)],
            products: vec![species("A", 1, 0.0)],
            ..ReactionConfig::default()
        };
        assert!(matches!(
            Reaction::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_initial_point_recorded() {
        let config = ReactionConfig {
            rate_model: RateModel::SingleConstant { k: 2.0 },
            reactants: vec![species("A", 1, 1.0)],
            products: vec![species("B", 1, 0.5)],
            ..ReactionConfig::default()
        };
        let reaction = Reaction::new(config).unwrap();
        assert_eq!(reaction.times(), &[0]);
        assert_eq!(reaction.constant_history(), &[2.0]);
        // Q = 0.5 / ((1.0 * 2.0) / 2.0)
        assert!((reaction.quotient_history()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_adding_species_recomputes_initial_quotient() {
        let mut reaction = Reaction::new(ReactionConfig::default()).unwrap();
        reaction.add_reactant(Species::new("A", 1, 2.0)).unwrap();
        reaction.add_product(Species::new("B", 1, 1.0)).unwrap();

        assert_eq!(reaction.quotient_history().len(), 1);
        assert!((reaction.quotient_history()[0] - 0.5).abs() < 1e-12);
        assert_eq!(reaction.config().reactants.len(), 1);
    }

    #[test]
    fn test_step_requires_both_sides() {
        let mut reaction = Reaction::new(ReactionConfig::default()).unwrap();
        reaction.add_reactant(Species::new("A", 1, 1.0)).unwrap();
        assert!(matches!(
            reaction.step(),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_oversized_coefficient_rejected() {
        let config = ReactionConfig {
            reactants: vec![species("A", MAX_COEFFICIENT + 1, 1.0)],
            products: vec![species("B", 1, 0.0)],
            ..ReactionConfig::default()
        };
        assert!(matches!(
            Reaction::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));

        let mut reaction = Reaction::new(ReactionConfig::default()).unwrap();
        assert!(reaction.add_reactant(Species::new("A", u32::MAX, 1.0)).is_err());
        assert_eq!(reaction.state().num_species(), 0);
    }

    #[test]
    fn test_config_defaults_from_json() {
        let json = r#"{
            "rate_model": {"model": "single_constant", "k": 1.2},
            "reactants": [{"name": "A", "coefficient": 1, "initial_concentration": 0.5}],
            "products": [{"name": "C", "coefficient": 1, "initial_concentration": 0.0}]
        }"#;
        let config = ReactionConfig::from_json(json).unwrap();
        assert_eq!(config.dt, DEFAULT_DT);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(config.strict_species_references);
    }
}
