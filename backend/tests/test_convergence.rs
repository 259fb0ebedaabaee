//! Convergence loop tests
//!
//! The run stops only when |forward - backward| < threshold AND every
//! scheduled perturbation has had its tick. The iteration cap and
//! cooperative cancellation are the two failure exits.

use equilibrium_sim_core::{
    ConstantTransform, Perturbation, PerturbationKind, RateModel, Reaction, ReactionConfig,
    SimulationError, SpeciesConfig,
};
use std::sync::atomic::AtomicBool;

// ============================================================================
// Test Helpers
// ============================================================================

fn species(name: &str, coefficient: u32, initial: f64) -> SpeciesConfig {
    SpeciesConfig {
        name: name.to_string(),
        coefficient,
        initial_concentration: initial,
    }
}

fn simple_config(k: f64) -> ReactionConfig {
    ReactionConfig {
        rate_model: RateModel::SingleConstant { k },
        dt: 0.05,
        reactants: vec![species("A", 1, 1.0)],
        products: vec![species("B", 1, 0.0)],
        ..ReactionConfig::default()
    }
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn test_simple_reaction_converges_to_half() {
    let mut reaction = Reaction::new(simple_config(1.0)).unwrap();

    let summary = reaction.run_to_equilibrium(0.001).unwrap();

    let a = reaction.species("A").unwrap().concentration();
    let b = reaction.species("B").unwrap().concentration();
    assert!((a - 0.5).abs() < 0.001, "A = {}", a);
    assert!((b - 0.5).abs() < 0.001, "B = {}", b);
    assert!(summary.final_residual < 0.001);
    assert!(summary.steps > 0 && summary.steps < 1_000);
    assert_eq!(summary.end_tick, reaction.current_tick());
}

#[test]
fn test_quotient_approaches_k() {
    let mut reaction = Reaction::new(simple_config(2.0)).unwrap();

    let summary = reaction.run_to_equilibrium(1e-6).unwrap();

    assert!((summary.final_quotient - 2.0).abs() < 1e-3);
    let last_recorded = *reaction.quotient_history().last().unwrap();
    assert!((last_recorded - 2.0).abs() < 1e-3);
    assert_eq!(summary.final_constant, 2.0);
}

#[test]
fn test_run_takes_at_least_one_step() {
    // Already at equilibrium: A = B with K = 1
    let config = ReactionConfig {
        reactants: vec![species("A", 1, 0.5)],
        products: vec![species("B", 1, 0.5)],
        ..simple_config(1.0)
    };
    let mut reaction = Reaction::new(config).unwrap();

    let summary = reaction.run_to_equilibrium(0.001).unwrap();

    assert_eq!(summary.steps, 1);
    assert_eq!(reaction.current_tick(), 1);
}

#[test]
fn test_run_waits_for_scheduled_perturbations() {
    let config = ReactionConfig {
        reactants: vec![species("A", 1, 0.5)],
        products: vec![species("B", 1, 0.5)],
        perturbations: vec![Perturbation::concentration("B", 0.3, 50)],
        ..simple_config(1.0)
    };
    let mut reaction = Reaction::new(config).unwrap();

    let summary = reaction.run_to_equilibrium(0.001).unwrap();

    assert!(summary.end_tick > 50);
    assert_eq!(summary.perturbations_applied, 1);
    assert!(reaction.perturbations()[0].is_applied());
    // Mass is conserved, so the new equilibrium splits 1.3 evenly
    let a = reaction.species("A").unwrap().concentration();
    assert!((a - 0.65).abs() < 0.001);
}

#[test]
fn test_reference_experiment() {
    let config = ReactionConfig {
        rate_model: RateModel::SingleConstant { k: 1.2 },
        reactants: vec![species("A", 1, 0.5), species("B", 2, 0.75)],
        products: vec![species("C", 1, 0.0)],
        perturbations: vec![Perturbation::concentration("C", 0.2, 30).with_label("add C")],
        ..ReactionConfig::default()
    };
    let mut reaction = Reaction::new(config).unwrap();

    let summary = reaction.run_to_equilibrium(0.001).unwrap();

    assert!(summary.end_tick > 30);
    assert_eq!(reaction.times().iter().filter(|&&t| t == 30).count(), 2);
    let len = reaction.times().len();
    assert_eq!(len, reaction.current_tick() + 2);
    for name in ["A", "B", "C"] {
        assert_eq!(reaction.history(name).unwrap().len(), len);
    }
    assert_eq!(reaction.equation_string(), "1A + 2B <=> 1C");
}

#[test]
fn test_constant_change_shifts_equilibrium() {
    let config = ReactionConfig {
        perturbations: vec![Perturbation::new(
            PerturbationKind::AdjustEquilibriumConstant {
                transform: ConstantTransform::Set { value: 3.0 },
            },
            20,
        )],
        ..simple_config(1.0)
    };
    let mut reaction = Reaction::new(config).unwrap();

    reaction.run_to_equilibrium(1e-5).unwrap();

    // K*A = B and A + B = 1
    let a = reaction.species("A").unwrap().concentration();
    assert!((a - 0.25).abs() < 1e-4);
}

#[test]
fn test_dual_model_converges_to_kf_over_kr() {
    let config = ReactionConfig {
        rate_model: RateModel::DualConstant { kf: 2.0, kr: 0.5 },
        ..simple_config(1.0)
    };
    let mut reaction = Reaction::new(config).unwrap();

    let summary = reaction.run_to_equilibrium(1e-6).unwrap();

    assert!((summary.final_quotient - 4.0).abs() < 1e-3);
    assert!(reaction.constant_history().iter().all(|&k| k == 4.0));
}

// ============================================================================
// Failure Exits
// ============================================================================

#[test]
fn test_iteration_cap_raises_non_convergence() {
    let config = ReactionConfig {
        max_iterations: 5,
        ..simple_config(1.0)
    };
    let mut reaction = Reaction::new(config).unwrap();

    let err = reaction.run_to_equilibrium(1e-9).unwrap_err();

    match err {
        SimulationError::NonConvergence {
            iterations,
            residual,
        } => {
            assert_eq!(iterations, 5);
            assert!(residual > 1e-9);
        }
        other => panic!("Expected NonConvergence, got {:?}", other),
    }
    assert_eq!(reaction.current_tick(), 5);
}

#[test]
fn test_cancellation_checked_before_each_iteration() {
    let mut reaction = Reaction::new(simple_config(1.0)).unwrap();
    let cancel = AtomicBool::new(true);

    let err = reaction
        .run_to_equilibrium_with_cancel(0.001, &cancel)
        .unwrap_err();

    assert_eq!(err, SimulationError::Cancelled { tick: 0 });
    assert_eq!(reaction.times().len(), 1);
}

#[test]
fn test_uncancelled_flag_runs_normally() {
    let mut reaction = Reaction::new(simple_config(1.0)).unwrap();
    let cancel = AtomicBool::new(false);

    assert!(reaction
        .run_to_equilibrium_with_cancel(0.001, &cancel)
        .is_ok());
}

#[test]
fn test_invalid_threshold_rejected() {
    let mut reaction = Reaction::new(simple_config(1.0)).unwrap();
    for threshold in [0.0, -1.0, f64::NAN] {
        assert!(matches!(
            reaction.run_to_equilibrium(threshold),
            Err(SimulationError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_event_log_records_run() {
    let mut reaction = Reaction::new(simple_config(1.0)).unwrap();
    reaction.run_to_equilibrium(0.001).unwrap();

    let log = reaction.event_log();
    assert_eq!(log.events_of_type("run_started").len(), 1);
    let reached = log.events_of_type("equilibrium_reached");
    assert_eq!(reached.len(), 1);
    assert_eq!(reached[0].tick(), reaction.current_tick());
}
