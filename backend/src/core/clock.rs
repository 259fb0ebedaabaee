//! Time management for the simulation
//!
//! The simulation operates in discrete ticks. Each tick corresponds to one
//! forward-Euler integration step of fixed size `dt`.

use serde::{Deserialize, Serialize};

/// Tracks the current tick and the fixed integration step
///
/// # Example
/// ```
/// use equilibrium_sim_core::SimulationClock;
///
/// let mut clock = SimulationClock::new(0.05);
/// assert_eq!(clock.current_tick(), 0);
///
/// clock.advance_tick();
/// assert_eq!(clock.current_tick(), 1);
/// assert!((clock.elapsed_time() - 0.05).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Integration steps taken since the start of the run
    current_tick: usize,
    /// Step size applied on every tick
    dt: f64,
}

impl SimulationClock {
    /// Create a clock at tick 0
    ///
    /// The step size is validated by the engine, not here.
    pub fn new(dt: f64) -> Self {
        Self { current_tick: 0, dt }
    }

    /// Create a clock positioned at an arbitrary tick (checkpoint restore)
    pub(crate) fn at_tick(dt: f64, current_tick: usize) -> Self {
        Self { current_tick, dt }
    }

    /// Advance time by one tick
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Get the current tick
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Get the integration step size
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulated time elapsed, `tick * dt`
    pub fn elapsed_time(&self) -> f64 {
        self.current_tick as f64 * self.dt
    }

    /// Check whether the clock has moved past the given tick
    pub fn is_past(&self, tick: usize) -> bool {
        self.current_tick > tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = SimulationClock::new(0.03);
        assert_eq!(clock.current_tick(), 0);
        assert_eq!(clock.elapsed_time(), 0.0);
    }

    #[test]
    fn test_is_past_is_strict() {
        let mut clock = SimulationClock::new(0.03);
        assert!(!clock.is_past(0));
        clock.advance_tick();
        assert!(clock.is_past(0));
        assert!(!clock.is_past(1));
    }
}
