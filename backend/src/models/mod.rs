//! Domain models for the equilibrium simulator

pub mod event;
pub mod species;
pub mod state;

// Re-exports
pub use event::{Event, EventLog};
pub use species::{Species, SpeciesConfig};
pub use state::{ReactionState, SpeciesRole};
