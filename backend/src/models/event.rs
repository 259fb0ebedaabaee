//! Event logging for simulation auditing.
//!
//! The engine records significant state changes (run start, perturbation
//! application, equilibrium) with the tick at which they happened. The log
//! is an audit trail; the numeric time series live in the engine histories.
//!
//! # Example
//!
//! ```rust
//! use equilibrium_sim_core::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::EquilibriumReached {
//!     tick: 120,
//!     residual: 0.0008,
//!     quotient: 1.19,
//! });
//! assert_eq!(log.events_at_tick(120).len(), 1);
//! ```

use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
///
/// Events are logged in the order they occur within a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A convergence run started
    RunStarted {
        tick: usize,
        threshold: f64,
        min_end_tick: usize,
    },

    /// A scheduled perturbation fired
    PerturbationApplied {
        tick: usize,
        label: String,
        kind: String,
    },

    /// A concentration adjustment named a species the reaction does not have
    /// (lenient mode only)
    UnknownSpeciesIgnored { tick: usize, species: String },

    /// The termination condition of a convergence run was met
    EquilibriumReached {
        tick: usize,
        residual: f64,
        quotient: f64,
    },
}

impl Event {
    /// Tick at which the event occurred
    pub fn tick(&self) -> usize {
        match self {
            Event::RunStarted { tick, .. }
            | Event::PerturbationApplied { tick, .. }
            | Event::UnknownSpeciesIgnored { tick, .. }
            | Event::EquilibriumReached { tick, .. } => *tick,
        }
    }

    /// Short type name, matching the serialized tag
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run_started",
            Event::PerturbationApplied { .. } => "perturbation_applied",
            Event::UnknownSpeciesIgnored { .. } => "unknown_species_ignored",
            Event::EquilibriumReached { .. } => "equilibrium_reached",
        }
    }
}

/// Append-only list of simulation events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific tick
    pub fn events_at_tick(&self, tick: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }
}
