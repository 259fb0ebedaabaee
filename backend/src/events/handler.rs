//! Perturbation scheduling and execution
//!
//! This module handles:
//! - Registering perturbations in order
//! - Finding the perturbations due at a tick
//! - Executing a perturbation against species and rate-model state

use crate::events::types::{Perturbation, PerturbationKind, ScheduledPerturbation};
use crate::kinetics::RateModel;
use crate::models::state::ReactionState;
use crate::orchestrator::SimulationError;

/// What executing a perturbation did
#[derive(Debug, Clone, PartialEq)]
pub enum PerturbationEffect {
    /// A species concentration was shifted; all other species were re-recorded
    ConcentrationAdjusted { species: String, old: f64, new: f64 },

    /// The named species was absent; every species was re-recorded unchanged
    UnknownSpecies { species: String },

    /// A rate constant changed; no species history was touched
    RateChanged { old_constant: f64, new_constant: f64 },
}

impl PerturbationEffect {
    /// Whether the engine must record an extra history point for this effect
    pub fn records_point(&self) -> bool {
        !matches!(self, PerturbationEffect::RateChanged { .. })
    }
}

/// Ordered set of registered perturbations
#[derive(Debug, Clone, Default)]
pub struct PerturbationSchedule {
    perturbations: Vec<ScheduledPerturbation>,
}

impl PerturbationSchedule {
    pub fn new() -> Self {
        Self {
            perturbations: Vec::new(),
        }
    }

    pub(crate) fn from_scheduled(perturbations: Vec<ScheduledPerturbation>) -> Self {
        Self { perturbations }
    }

    pub fn push(&mut self, perturbation: Perturbation) {
        self.perturbations.push(ScheduledPerturbation::new(perturbation));
    }

    pub fn perturbations(&self) -> &[ScheduledPerturbation] {
        &self.perturbations
    }

    pub fn len(&self) -> usize {
        self.perturbations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perturbations.is_empty()
    }

    /// Latest scheduled tick across all perturbations (0 if none)
    ///
    /// A convergence run must advance past this tick before it may stop.
    pub fn min_end_tick(&self) -> usize {
        self.perturbations
            .iter()
            .map(ScheduledPerturbation::tick)
            .max()
            .unwrap_or(0)
    }

    /// Indices of unapplied perturbations scheduled for `tick`, in registration order
    pub fn due_indices(&self, tick: usize) -> Vec<usize> {
        self.perturbations
            .iter()
            .enumerate()
            .filter(|(_, scheduled)| scheduled.is_due(tick))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn applied_count(&self) -> usize {
        self.perturbations.iter().filter(|p| p.is_applied()).count()
    }

    pub fn pending_count(&self) -> usize {
        self.len() - self.applied_count()
    }

    /// Dry-run the perturbations at `indices` without touching any state
    ///
    /// Rate changes are replayed in order on a copy of `model`, and in
    /// strict mode every concentration adjustment must name a known species.
    /// Returns the first error the batch would raise when applied.
    pub fn check_batch(
        &self,
        indices: &[usize],
        state: &ReactionState,
        model: &RateModel,
        strict: bool,
    ) -> Result<(), SimulationError> {
        let mut trial = *model;
        for &index in indices {
            let scheduled = self.perturbations.get(index).ok_or_else(|| {
                SimulationError::StateValidationError(format!("No perturbation at index {}", index))
            })?;
            let kind = &scheduled.perturbation().kind;
            if let PerturbationKind::AdjustConcentration { species, .. } = kind {
                if strict && !state.contains(species) {
                    return Err(SimulationError::UnknownSpeciesReference {
                        species: species.clone(),
                        tick: scheduled.tick(),
                    });
                }
            }
            kind.adjust_model(&mut trial)?;
        }
        Ok(())
    }

    /// Execute the perturbation at `index` and mark it applied
    ///
    /// On error the perturbation stays unapplied and no state is changed.
    pub fn apply_at(
        &mut self,
        index: usize,
        state: &mut ReactionState,
        model: &mut RateModel,
        strict: bool,
    ) -> Result<PerturbationEffect, SimulationError> {
        let scheduled = self.perturbations.get_mut(index).ok_or_else(|| {
            SimulationError::StateValidationError(format!("No perturbation at index {}", index))
        })?;
        let effect = scheduled
            .perturbation()
            .kind
            .execute(state, model, scheduled.tick(), strict)?;
        scheduled.mark_applied();
        Ok(effect)
    }
}

impl PerturbationKind {
    /// Execute this perturbation, modifying the given state
    ///
    /// # Arguments
    /// * `state` - Species to modify
    /// * `model` - Rate constants to modify
    /// * `tick` - Current tick number
    /// * `strict` - Reject concentration adjustments naming unknown species
    pub fn execute(
        &self,
        state: &mut ReactionState,
        model: &mut RateModel,
        tick: usize,
        strict: bool,
    ) -> Result<PerturbationEffect, SimulationError> {
        match self {
            PerturbationKind::AdjustConcentration { species, delta } => {
                execute_concentration_adjustment(state, tick, species, *delta, strict)
            }

            _ => execute_rate_change(model, |m| self.adjust_model(m)),
        }
    }

    /// Apply this perturbation's rate or constant change to `model`
    ///
    /// Concentration adjustments leave the model alone.
    fn adjust_model(&self, model: &mut RateModel) -> Result<(), SimulationError> {
        match self {
            PerturbationKind::AdjustConcentration { .. } => Ok(()),
            PerturbationKind::AdjustForwardRate { delta } => model.adjust_forward(*delta),
            PerturbationKind::AdjustReverseRate { delta } => model.adjust_reverse(*delta),
            PerturbationKind::AdjustEquilibriumConstant { transform } => {
                model.transform_constant(transform)
            }
        }
    }
}

// ============================================================================
// Execution Functions
// ============================================================================

fn execute_concentration_adjustment(
    state: &mut ReactionState,
    tick: usize,
    species: &str,
    delta: f64,
    strict: bool,
) -> Result<PerturbationEffect, SimulationError> {
    if !state.contains(species) {
        if strict {
            return Err(SimulationError::UnknownSpeciesReference {
                species: species.to_string(),
                tick,
            });
        }
        for s in state.all_species_mut() {
            s.record_unchanged();
        }
        return Ok(PerturbationEffect::UnknownSpecies {
            species: species.to_string(),
        });
    }

    let mut old = 0.0;
    let mut new = 0.0;
    for s in state.all_species_mut() {
        if s.name() == species {
            old = s.concentration();
            new = old + delta;
            s.record_and_set(new);
        } else {
            s.record_unchanged();
        }
    }

    Ok(PerturbationEffect::ConcentrationAdjusted {
        species: species.to_string(),
        old,
        new,
    })
}

fn execute_rate_change<F>(model: &mut RateModel, change: F) -> Result<PerturbationEffect, SimulationError>
where
    F: FnOnce(&mut RateModel) -> Result<(), SimulationError>,
{
    let old_constant = model.current_constant();
    change(model)?;
    Ok(PerturbationEffect::RateChanged {
        old_constant,
        new_constant: model.current_constant(),
    })
}
