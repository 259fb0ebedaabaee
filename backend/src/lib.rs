//! Equilibrium Simulator Core - Rust Engine
//!
//! Simulates a single reversible reaction approaching dynamic equilibrium
//! with forward Euler integration and scheduled perturbations.
//!
//! # Architecture
//!
//! - **core**: Tick clock and step size
//! - **models**: Domain types (Species, ReactionState, EventLog)
//! - **kinetics**: Mass-action rate model (single `K` or `kf`/`kr`)
//! - **events**: Scheduled one-shot perturbations
//! - **orchestrator**: Reaction engine, convergence loop, checkpoints
//! - **reporting**: Read-only trajectory for plotting collaborators
//!
//! # Critical Invariants
//!
//! 1. The time axis, quotient history, constant history, and every species
//!    history always have equal length
//! 2. Rate constants are never zero
//! 3. Each perturbation fires at most once, at its scheduled tick

// Module declarations
pub mod core;
pub mod events;
pub mod kinetics;
pub mod models;
pub mod orchestrator;
pub mod reporting;

// Re-exports for convenience
pub use crate::core::clock::SimulationClock;
pub use events::{
    ConstantTransform, Perturbation, PerturbationEffect, PerturbationKind, PerturbationSchedule,
    ScheduledPerturbation,
};
pub use kinetics::{RateModel, QUOTIENT_EPSILON};
pub use models::{
    event::{Event, EventLog},
    species::{Species, SpeciesConfig},
    state::{ReactionState, SpeciesRole},
};
pub use orchestrator::{
    Reaction, ReactionConfig, RunSummary, SimulationError, StateSnapshot, StepResult,
};
pub use reporting::{PerturbationMarker, SpeciesSeries, Trajectory};
