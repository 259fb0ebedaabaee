//! Tests for the Species model
//!
//! Covers the explicit record-and-set mutation path and history invariants.

use equilibrium_sim_core::{Species, SpeciesConfig};

#[test]
fn test_new_species_records_initial_concentration() {
    let s = Species::new("A", 1, 0.5);

    assert_eq!(s.name(), "A");
    assert_eq!(s.coefficient(), 1);
    assert_eq!(s.concentration(), 0.5);
    assert_eq!(s.history(), &[0.5]);
    assert_eq!(s.recorded_ticks(), 0);
}

#[test]
fn test_record_and_set_appends_before_updating() {
    let mut s = Species::new("B", 2, 0.75);

    s.record_and_set(0.7);
    s.record_and_set(0.65);

    assert_eq!(s.concentration(), 0.65);
    assert_eq!(s.history(), &[0.75, 0.7, 0.65]);
    assert_eq!(s.recorded_ticks(), 2);
}

#[test]
fn test_negative_values_are_not_rejected() {
    // Numerical stability is the engine's concern
    let mut s = Species::new("C", 1, 0.0);
    s.record_and_set(-0.01);
    assert_eq!(s.concentration(), -0.01);
}

#[test]
fn test_config_round_trip_keeps_initial_value() {
    let mut s = Species::new("NO2", 2, 0.3);
    s.record_and_set(0.1);

    let config = s.to_config();
    assert_eq!(
        config,
        SpeciesConfig {
            name: "NO2".to_string(),
            coefficient: 2,
            initial_concentration: 0.3,
        }
    );

    let fresh = Species::from(&config);
    assert_eq!(fresh.history(), &[0.3]);
}
