//! Perturbation types for simulation configuration
//!
//! Perturbations modify simulation state at a specific tick.
//! Examples: adding product mid-run, raising the forward rate, doubling K.
//!
//! # Design Principles
//!
//! 1. **One-shot**: Each perturbation fires exactly once, at its scheduled tick
//! 2. **Self-contained**: Perturbations include all data needed for execution
//! 3. **Retained**: Applied perturbations are kept for marker reporting

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transformation applied to the equilibrium constant `K`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ConstantTransform {
    /// `K + delta`
    Add { delta: f64 },

    /// `K * factor`
    Scale { factor: f64 },

    /// Replace `K` outright
    Set { value: f64 },
}

impl ConstantTransform {
    pub fn apply(&self, k: f64) -> f64 {
        match *self {
            ConstantTransform::Add { delta } => k + delta,
            ConstantTransform::Scale { factor } => k * factor,
            ConstantTransform::Set { value } => value,
        }
    }
}

impl fmt::Display for ConstantTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantTransform::Add { delta } => write!(f, "K{:+}", delta),
            ConstantTransform::Scale { factor } => write!(f, "K*{}", factor),
            ConstantTransform::Set { value } => write!(f, "K={}", value),
        }
    }
}

/// What a perturbation does to the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PerturbationKind {
    /// Add `delta` to the named species' concentration
    ///
    /// # Example
    /// Inject 0.2 of product C at tick 30
    AdjustConcentration { species: String, delta: f64 },

    /// Add `delta` to the forward rate constant `kf` (dual-constant model)
    AdjustForwardRate { delta: f64 },

    /// Add `delta` to the reverse rate constant `kr` (dual-constant model)
    AdjustReverseRate { delta: f64 },

    /// Replace `K` with a transform of itself (single-constant model)
    ///
    /// # Example
    /// Temperature change doubling K: `Scale { factor: 2.0 }`
    AdjustEquilibriumConstant { transform: ConstantTransform },
}

impl PerturbationKind {
    /// Short kind name, matching the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            PerturbationKind::AdjustConcentration { .. } => "adjust_concentration",
            PerturbationKind::AdjustForwardRate { .. } => "adjust_forward_rate",
            PerturbationKind::AdjustReverseRate { .. } => "adjust_reverse_rate",
            PerturbationKind::AdjustEquilibriumConstant { .. } => "adjust_equilibrium_constant",
        }
    }

    fn payload(&self) -> String {
        match self {
            PerturbationKind::AdjustConcentration { species, delta } => {
                format!("({}, {})", species, delta)
            }
            PerturbationKind::AdjustForwardRate { delta }
            | PerturbationKind::AdjustReverseRate { delta } => format!("{:+}", delta),
            PerturbationKind::AdjustEquilibriumConstant { transform } => transform.to_string(),
        }
    }
}

/// A perturbation paired with the tick at which it fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub kind: PerturbationKind,
    pub tick: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Perturbation {
    pub fn new(kind: PerturbationKind, tick: usize) -> Self {
        Self {
            kind,
            tick,
            label: None,
        }
    }

    /// Concentration jump of `delta` for `species` at `tick`
    pub fn concentration(species: impl Into<String>, delta: f64, tick: usize) -> Self {
        Self::new(
            PerturbationKind::AdjustConcentration {
                species: species.into(),
                delta,
            },
            tick,
        )
    }

    /// Attach a display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Display label, or `"<kind>, t=<tick>, <payload>"` when none was given
    ///
    /// # Example
    /// ```
    /// use equilibrium_sim_core::Perturbation;
    ///
    /// let p = Perturbation::concentration("C", 0.2, 30);
    /// assert_eq!(p.label(), "adjust_concentration, t=30, (C, 0.2)");
    /// assert_eq!(p.with_label("add C").label(), "add C");
    /// ```
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => format!("{}, t={}, {}", self.kind.name(), self.tick, self.kind.payload()),
        }
    }
}

/// A registered perturbation and whether it has fired
///
/// `applied` goes false → true exactly once and is only flipped by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPerturbation {
    perturbation: Perturbation,
    applied: bool,
}

impl ScheduledPerturbation {
    pub fn new(perturbation: Perturbation) -> Self {
        Self {
            perturbation,
            applied: false,
        }
    }

    pub(crate) fn from_snapshot(perturbation: Perturbation, applied: bool) -> Self {
        Self {
            perturbation,
            applied,
        }
    }

    pub fn perturbation(&self) -> &Perturbation {
        &self.perturbation
    }

    pub fn tick(&self) -> usize {
        self.perturbation.tick
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Check if this perturbation should fire at the given tick
    pub fn is_due(&self, tick: usize) -> bool {
        !self.applied && self.perturbation.tick == tick
    }

    pub(crate) fn mark_applied(&mut self) {
        self.applied = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_due_only_at_scheduled_tick() {
        let scheduled = ScheduledPerturbation::new(Perturbation::concentration("B", 0.14, 20));

        assert!(!scheduled.is_due(19));
        assert!(scheduled.is_due(20));
        assert!(!scheduled.is_due(21));
    }

    #[test]
    fn test_applied_perturbation_is_never_due() {
        let mut scheduled = ScheduledPerturbation::new(Perturbation::concentration("B", 0.14, 20));
        scheduled.mark_applied();

        assert!(scheduled.is_applied());
        assert!(!scheduled.is_due(20));
    }

    #[test]
    fn test_constant_transforms() {
        assert_eq!(ConstantTransform::Add { delta: 0.5 }.apply(1.0), 1.5);
        assert_eq!(ConstantTransform::Scale { factor: 3.0 }.apply(1.2), 1.2 * 3.0);
        assert_eq!(ConstantTransform::Set { value: 7.0 }.apply(1.0), 7.0);
    }

    #[test]
    fn test_default_label_for_rate_change() {
        let p = Perturbation::new(PerturbationKind::AdjustForwardRate { delta: 0.5 }, 12);
        assert_eq!(p.label(), "adjust_forward_rate, t=12, +0.5");
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "kind": {"type": "adjust_equilibrium_constant", "transform": {"op": "scale", "factor": 2.0}},
            "tick": 40
        }"#;
        let p: Perturbation = serde_json::from_str(json).unwrap();
        assert_eq!(p.tick, 40);
        assert_eq!(p.label, None);
        assert_eq!(
            p.kind,
            PerturbationKind::AdjustEquilibriumConstant {
                transform: ConstantTransform::Scale { factor: 2.0 }
            }
        );
    }
}
