//! Perturbations: scheduled, one-shot mutations of simulation state

pub mod handler;
pub mod types;

pub use handler::{PerturbationEffect, PerturbationSchedule};
pub use types::{ConstantTransform, Perturbation, PerturbationKind, ScheduledPerturbation};
