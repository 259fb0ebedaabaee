//! Tests for the mass-action rate model
//!
//! Both parameterizations must expose the same rates/quotient/constant
//! contract while keeping their distinct numerical behavior.

use equilibrium_sim_core::{
    ConstantTransform, PerturbationKind, RateModel, SimulationError, QUOTIENT_EPSILON,
};

#[test]
fn test_single_constant_rates() {
    let model = RateModel::SingleConstant { k: 1.2 };
    let (forward, backward) = model.rates(0.25, 0.5);

    assert!((forward - 0.3).abs() < 1e-12);
    assert_eq!(backward, 0.5);
    assert_eq!(model.current_constant(), 1.2);
}

#[test]
fn test_dual_constant_rates_and_constant() {
    let model = RateModel::DualConstant { kf: 3.0, kr: 1.5 };
    let (forward, backward) = model.rates(0.5, 0.4);

    assert_eq!(forward, 1.5);
    assert!((backward - 0.6).abs() < 1e-12);
    assert_eq!(model.current_constant(), 2.0);
}

#[test]
fn test_dual_quotient_factors_out_both_constants() {
    let model = RateModel::DualConstant { kf: 4.0, kr: 2.0 };
    // Activities 0.5 (reactants) and 1.0 (products) -> Q = 1.0 / 0.5
    let (forward, backward) = model.rates(0.5, 1.0);
    assert!((model.reaction_quotient(forward, backward) - 2.0).abs() < 1e-12);
}

#[test]
fn test_quotient_equals_constant_at_equilibrium() {
    let model = RateModel::SingleConstant { k: 2.5 };
    // Forward == backward when products = K * reactants
    let (forward, backward) = model.rates(0.4, 1.0);
    assert!((forward - backward).abs() < 1e-12);
    assert!((model.reaction_quotient(forward, backward) - 2.5).abs() < 1e-12);
}

#[test]
fn test_zero_forward_uses_epsilon() {
    let model = RateModel::SingleConstant { k: 1.0 };
    let q = model.reaction_quotient(0.0, 0.5);
    assert!((q - 0.5 / QUOTIENT_EPSILON).abs() < 1e-6);
}

#[test]
fn test_zero_constants_rejected() {
    assert!(matches!(
        RateModel::SingleConstant { k: 0.0 }.validate(),
        Err(SimulationError::InvalidRateConstant { parameter: "K", .. })
    ));
    assert!(matches!(
        RateModel::DualConstant { kf: 0.0, kr: 1.0 }.validate(),
        Err(SimulationError::InvalidRateConstant { parameter: "kf", .. })
    ));
    assert!(matches!(
        RateModel::DualConstant { kf: 1.0, kr: 0.0 }.validate(),
        Err(SimulationError::InvalidRateConstant { parameter: "kr", .. })
    ));
}

#[test]
fn test_negative_constants_are_allowed() {
    // Only zero is forbidden; no sign check is performed
    assert!(RateModel::SingleConstant { k: -1.0 }.validate().is_ok());
}

#[test]
fn test_rate_adjustments_on_dual_model() {
    let mut model = RateModel::DualConstant { kf: 1.0, kr: 1.0 };
    model.adjust_forward(0.5).unwrap();
    model.adjust_reverse(-0.25).unwrap();

    assert_eq!(model, RateModel::DualConstant { kf: 1.5, kr: 0.75 });
    assert_eq!(model.current_constant(), 2.0);
}

#[test]
fn test_transform_rejected_on_dual_model() {
    let mut model = RateModel::DualConstant { kf: 1.0, kr: 1.0 };
    let err = model
        .transform_constant(&ConstantTransform::Scale { factor: 2.0 })
        .unwrap_err();
    assert!(matches!(err, SimulationError::RateModelMismatch { .. }));
}

#[test]
fn test_transform_on_single_model() {
    let mut model = RateModel::SingleConstant { k: 1.2 };
    model
        .transform_constant(&ConstantTransform::Scale { factor: 2.0 })
        .unwrap();
    assert!((model.current_constant() - 2.4).abs() < 1e-12);
}

#[test]
fn test_accepts_matches_model_shape() {
    let single = RateModel::SingleConstant { k: 1.0 };
    let dual = RateModel::DualConstant { kf: 1.0, kr: 1.0 };
    let forward = PerturbationKind::AdjustForwardRate { delta: 0.1 };
    let transform = PerturbationKind::AdjustEquilibriumConstant {
        transform: ConstantTransform::Add { delta: 0.1 },
    };
    let conc = PerturbationKind::AdjustConcentration {
        species: "A".to_string(),
        delta: 0.1,
    };

    assert!(!single.accepts(&forward));
    assert!(single.accepts(&transform));
    assert!(dual.accepts(&forward));
    assert!(!dual.accepts(&transform));
    assert!(single.accepts(&conc) && dual.accepts(&conc));
}
