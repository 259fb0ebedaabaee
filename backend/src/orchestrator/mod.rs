//! Orchestrator - reaction engine and checkpointing
//!
//! See `engine.rs` for the tick loop and `checkpoint.rs` for save/restore.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{
    Reaction, ReactionConfig, RunSummary, SimulationError, StepResult, DEFAULT_DT,
    DEFAULT_MAX_ITERATIONS, MAX_COEFFICIENT,
};

// Re-export checkpoint types
pub use checkpoint::{
    compute_config_hash, validate_snapshot, PerturbationSnapshot, SpeciesSnapshot, StateSnapshot,
};
