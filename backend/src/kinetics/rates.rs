//! Mass-action rate model
//!
//! A single engine supports two parameterizations of the rate constants:
//!
//! - **Single constant**: forward rate scaled by `K`, reverse rate implicitly
//!   scaled by 1, so `kf/kr == K`.
//! - **Dual constant**: independent forward `kf` and reverse `kr`.
//!
//! ```text
//! forward  = kf * Π reactants [X]^ν
//! backward = kr * Π products  [Y]^ν
//! ```
//!
//! Every constant must be non-zero; this is checked at construction and
//! after every perturbation.

use crate::events::types::{ConstantTransform, PerturbationKind};
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};

/// Substitute for a zero quotient denominator
pub const QUOTIENT_EPSILON: f64 = 1e-6;

/// Rate-constant parameterization of the reaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RateModel {
    /// One equilibrium constant `K`; reverse constant fixed at 1
    SingleConstant { k: f64 },

    /// Independent forward and reverse constants
    DualConstant { kf: f64, kr: f64 },
}

impl RateModel {
    /// Short model name, matching the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            RateModel::SingleConstant { .. } => "single_constant",
            RateModel::DualConstant { .. } => "dual_constant",
        }
    }

    /// Reject zero or non-finite constants
    pub fn validate(&self) -> Result<(), SimulationError> {
        match *self {
            RateModel::SingleConstant { k } => check_constant("K", k),
            RateModel::DualConstant { kf, kr } => {
                check_constant("kf", kf)?;
                check_constant("kr", kr)
            }
        }
    }

    /// Constant multiplying the forward activity
    pub fn forward_constant(&self) -> f64 {
        match *self {
            RateModel::SingleConstant { k } => k,
            RateModel::DualConstant { kf, .. } => kf,
        }
    }

    /// Constant multiplying the backward activity
    pub fn reverse_constant(&self) -> f64 {
        match *self {
            RateModel::SingleConstant { .. } => 1.0,
            RateModel::DualConstant { kr, .. } => kr,
        }
    }

    /// Forward and backward rates from the two sides' activities
    pub fn rates(&self, reactant_activity: f64, product_activity: f64) -> (f64, f64) {
        (
            reactant_activity * self.forward_constant(),
            product_activity * self.reverse_constant(),
        )
    }

    /// Reaction quotient `Q` with the rate constants factored back out
    ///
    /// A zero denominator is replaced by [`QUOTIENT_EPSILON`].
    pub fn reaction_quotient(&self, forward: f64, backward: f64) -> f64 {
        let numer = match self {
            RateModel::SingleConstant { .. } => backward,
            RateModel::DualConstant { kr, .. } => backward / kr,
        };
        let mut denom = forward / self.forward_constant();
        if denom == 0.0 {
            denom = QUOTIENT_EPSILON;
        }
        numer / denom
    }

    /// Equilibrium constant reported at each tick: `K`, or `kf / kr`
    pub fn current_constant(&self) -> f64 {
        match *self {
            RateModel::SingleConstant { k } => k,
            RateModel::DualConstant { kf, kr } => kf / kr,
        }
    }

    /// Whether a perturbation of this kind can act on this model
    pub fn accepts(&self, kind: &PerturbationKind) -> bool {
        match (self, kind) {
            (_, PerturbationKind::AdjustConcentration { .. }) => true,
            (RateModel::DualConstant { .. }, PerturbationKind::AdjustForwardRate { .. })
            | (RateModel::DualConstant { .. }, PerturbationKind::AdjustReverseRate { .. }) => true,
            (
                RateModel::SingleConstant { .. },
                PerturbationKind::AdjustEquilibriumConstant { .. },
            ) => true,
            _ => false,
        }
    }

    /// Add `delta` to `kf` (dual-constant model only)
    ///
    /// The model is left untouched if the result would be zero.
    pub fn adjust_forward(&mut self, delta: f64) -> Result<(), SimulationError> {
        match self {
            RateModel::DualConstant { kf, .. } => {
                let updated = *kf + delta;
                check_constant("kf", updated)?;
                *kf = updated;
                Ok(())
            }
            RateModel::SingleConstant { .. } => Err(self.mismatch("adjust_forward_rate")),
        }
    }

    /// Add `delta` to `kr` (dual-constant model only)
    pub fn adjust_reverse(&mut self, delta: f64) -> Result<(), SimulationError> {
        match self {
            RateModel::DualConstant { kr, .. } => {
                let updated = *kr + delta;
                check_constant("kr", updated)?;
                *kr = updated;
                Ok(())
            }
            RateModel::SingleConstant { .. } => Err(self.mismatch("adjust_reverse_rate")),
        }
    }

    /// Replace `K` with `transform(K)` (single-constant model only)
    pub fn transform_constant(
        &mut self,
        transform: &ConstantTransform,
    ) -> Result<(), SimulationError> {
        match self {
            RateModel::SingleConstant { k } => {
                let updated = transform.apply(*k);
                check_constant("K", updated)?;
                *k = updated;
                Ok(())
            }
            RateModel::DualConstant { .. } => Err(self.mismatch("adjust_equilibrium_constant")),
        }
    }

    fn mismatch(&self, perturbation: &str) -> SimulationError {
        SimulationError::RateModelMismatch {
            perturbation: perturbation.to_string(),
            model: self.name().to_string(),
        }
    }
}

fn check_constant(parameter: &'static str, value: f64) -> Result<(), SimulationError> {
    if value == 0.0 || !value.is_finite() {
        return Err(SimulationError::InvalidRateConstant { parameter, value });
    }
    Ok(())
}
