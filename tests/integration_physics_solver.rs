//! Integration tests: physics module + solver module
//!
//! These tests verify that the separator model and the solvers
//! work correctly together.

use membrane_rs::config::{InitialProfile, SeparatorConfig};
use membrane_rs::error::MembraneError;
use membrane_rs::models::{MembraneSeparator, PressureSignal};
use membrane_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
use membrane_rs::solver::{
    DomainBoundaries, DormandPrinceSolver, EulerSolver, RK4Solver, Scenario, Solver, SolverConfiguration,
};

mod common;
use common::test_helpers::relative_error;
use common::{create_simple_scenario, reference_separator, ConstantGrowth, ExponentialDecay};

// =================================================================================================
// Basic Integration Tests
// =================================================================================================

#[test]
fn test_euler_with_exponential_decay() {
    let scenario = create_simple_scenario(Box::new(ExponentialDecay::new(5, 0.1)));

    let config = SolverConfiguration::time_evolution(10.0, 1000);
    let result = EulerSolver::new().solve(&scenario, &config).unwrap();

    assert_eq!(result.time_points.len(), 1001);
    assert!(result.time_points[0].abs() < 1e-10);
    assert!((result.time_points.last().unwrap() - 10.0).abs() < 1e-10);

    let final_conc = result.final_state.get(PhysicalQuantity::Concentration).unwrap().as_vector()[0];

    // Analytical: y(10) = exp(-1) ≈ 0.3679; Euler with dt=0.01 is within ~1%
    let error = relative_error(final_conc, (-1.0f64).exp());
    assert!(error < 0.02, "Error {} too large", error);
}

#[test]
fn test_constant_growth_is_exact_for_every_solver() {
    let solvers: Vec<(Box<dyn Solver>, SolverConfiguration)> = vec![
        (Box::new(EulerSolver::new()), SolverConfiguration::time_evolution(5.0, 7)),
        (Box::new(RK4Solver::new()), SolverConfiguration::time_evolution(5.0, 7)),
        (Box::new(DormandPrinceSolver::new()), SolverConfiguration::adaptive(5.0, 1e-6, 1e-9, 0.1, 1.0)),
    ];

    for (solver, config) in solvers {
        let scenario = create_simple_scenario(Box::new(ConstantGrowth::new(3, 2.0)));
        let result = solver.solve(&scenario, &config).unwrap();

        let y = result.final_state.get(PhysicalQuantity::Moles).unwrap().as_vector()[2];
        assert!((y - 10.0).abs() < 1e-10, "{}: y(5) = {}", solver.name(), y);
    }
}

// =================================================================================================
// Separator with each solver
// =================================================================================================

#[test]
fn test_separator_with_each_solver() {
    let model = reference_separator(PressureSignal::step(0.5, 1e5, 5e4));

    let runs: Vec<(Box<dyn Solver>, SolverConfiguration)> = vec![
        (Box::new(EulerSolver::new()), SolverConfiguration::time_evolution(2.0, 200)),
        (Box::new(RK4Solver::new()), SolverConfiguration::time_evolution(2.0, 200)),
        (Box::new(DormandPrinceSolver::new()), SolverConfiguration::adaptive(2.0, 1e-6, 1e-9, 1e-3, 0.01)),
    ];

    for (solver, config) in runs {
        let scenario = create_simple_scenario(Box::new(model.clone()));
        let result = solver.solve(&scenario, &config).unwrap();

        assert!((result.final_time() - 2.0).abs() < 1e-12, "{}", solver.name());
        assert_eq!(result.metadata["solver"], solver.name());

        // Faces follow the feed pressure after the step
        let profile = result.final_state.get(PhysicalQuantity::Concentration).unwrap().as_matrix();
        let faces = model.faces_at(2.0);
        assert_eq!(profile[(0, 0)], faces.feed.oxygen);
        assert_eq!(profile[(0, 1)], faces.feed.nitrogen);
        assert_eq!(profile[(9, 0)], faces.permeate.oxygen);

        // Interior lies between the faces
        for j in 1..9 {
            assert!(profile[(j, 0)] >= -1e-9 && profile[(j, 0)] <= faces.feed.oxygen + 1e-9);
        }

        let moles = result.final_state.get(PhysicalQuantity::Moles).unwrap().as_scalar();
        assert!(moles > 0.0);
    }
}

#[test]
fn test_recording_stride_with_separator() {
    let model = reference_separator(PressureSignal::constant(1e5));
    let scenario = create_simple_scenario(Box::new(model.clone()));
    let config = SolverConfiguration::time_evolution(1.0, 100).with_recording_stride(30);

    let result = RK4Solver::new().solve(&scenario, &config).unwrap();

    // t = 0, 0.3, 0.6, 0.9 and the final 1.0
    assert_eq!(result.len(), 5);
    let samples = model.observe_trajectory(&result).unwrap();
    assert_eq!(samples.len(), 5);
    assert!((samples[4].time - 1.0).abs() < 1e-12);
}

#[test]
fn test_resume_from_intermediate_state() {
    // 0 → 2 s in one go equals 0 → 1 s then 1 → 2 s
    let model = reference_separator(PressureSignal::step(0.5, 1e5, 5e4));
    let solver = RK4Solver::new();

    let full = solver
        .solve(&create_simple_scenario(Box::new(model.clone())), &SolverConfiguration::time_evolution(2.0, 200))
        .unwrap();

    let first = solver
        .solve(&create_simple_scenario(Box::new(model.clone())), &SolverConfiguration::time_evolution(1.0, 100))
        .unwrap();
    let resumed = Scenario::new(
        Box::new(model.clone()),
        DomainBoundaries::resume(first.final_state.clone(), 1.0),
    );
    let second = solver.solve(&resumed, &SolverConfiguration::time_evolution(1.0, 100)).unwrap();

    assert!((second.final_time() - 2.0).abs() < 1e-12);

    let a = full.final_state.get(PhysicalQuantity::Moles).unwrap().as_scalar();
    let b = second.final_state.get(PhysicalQuantity::Moles).unwrap().as_scalar();
    assert!(relative_error(b, a) < 1e-12);
}

#[test]
fn test_steady_initial_profile_stays_steady() {
    let mut config = SeparatorConfig::default();
    config.initial_profile = InitialProfile::Steady;
    let model = MembraneSeparator::from_config(&config, PressureSignal::constant(1e5)).unwrap();

    let initial = model.setup_initial_state();
    let result = EulerSolver::new()
        .solve(&create_simple_scenario(Box::new(model.clone())), &SolverConfiguration::time_evolution(1.0, 100))
        .unwrap();

    let before = initial.get(PhysicalQuantity::Concentration).unwrap().as_matrix();
    let after = result.final_state.get(PhysicalQuantity::Concentration).unwrap().as_matrix();
    for (x, y) in before.iter().zip(after.iter()) {
        assert!((x - y).abs() < 1e-12 * x.abs().max(1.0));
    }

    // Steady fluxes from the first sample on
    let samples = model.observe_trajectory(&result).unwrap();
    assert!(relative_error(samples[0].permeate_o2_flow, 1.7e-5) < 1e-9);
}

// =================================================================================================
// Failure paths
// =================================================================================================

#[test]
fn test_wrong_initial_state_is_rejected_before_integration() {
    let model = reference_separator(PressureSignal::constant(1e5));

    // Missing tank moles
    let no_moles = PhysicalState::new(
        PhysicalQuantity::Concentration,
        PhysicalData::uniform_matrix(10, 2, 0.0),
    );
    let scenario = Scenario::new(Box::new(model.clone()), DomainBoundaries::temporal(no_moles));
    let err = RK4Solver::new().solve(&scenario, &SolverConfiguration::time_evolution(1.0, 10)).unwrap_err();
    assert!(matches!(err, MembraneError::MissingQuantity { .. }));

    // Wrong grid size
    let wrong_shape = PhysicalState::new(
        PhysicalQuantity::Concentration,
        PhysicalData::uniform_matrix(7, 2, 0.0),
    )
    .with(PhysicalQuantity::Moles, PhysicalData::from_scalar(0.0));
    let scenario = Scenario::new(Box::new(model), DomainBoundaries::temporal(wrong_shape));
    let err = EulerSolver::new().solve(&scenario, &SolverConfiguration::time_evolution(1.0, 10)).unwrap_err();
    assert!(matches!(err, MembraneError::Configuration { .. }));
}

#[test]
fn test_unstable_euler_step_is_reported() {
    // dt = 0.05 s is four times the explicit stability limit
    let model = reference_separator(PressureSignal::constant(1e5));
    assert!(model.field().stable_time_step() < 0.05);

    let scenario = create_simple_scenario(Box::new(model));
    let err = EulerSolver::new()
        .solve(&scenario, &SolverConfiguration::time_evolution(50.0, 1000))
        .unwrap_err();
    assert!(matches!(err, MembraneError::NumericalInstability { .. }));
}

#[test]
fn test_missing_initial_condition() {
    let scenario = Scenario::new(
        Box::new(reference_separator(PressureSignal::constant(1e5))),
        DomainBoundaries::default(),
    );
    let err = RK4Solver::new().solve(&scenario, &SolverConfiguration::time_evolution(1.0, 10)).unwrap_err();
    assert!(matches!(err, MembraneError::MissingInitialCondition));
}

// =================================================================================================
// Parallel evaluation
// =================================================================================================

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_derivative_matches_sequential() {
    use membrane_rs::solver::{parallel_threshold, set_parallel_threshold};

    let mut config = SeparatorConfig::default();
    config.node_count = 40;
    let model = MembraneSeparator::from_config(&config, PressureSignal::step(0.2, 1e5, 5e4)).unwrap();
    let solver_config = SolverConfiguration::time_evolution(0.5, 2000);

    let previous = parallel_threshold();

    set_parallel_threshold(usize::MAX);
    let sequential = common::run_separator(&model, &RK4Solver::new(), &solver_config);

    set_parallel_threshold(1);
    let parallel = common::run_separator(&model, &RK4Solver::new(), &solver_config);

    set_parallel_threshold(previous);

    assert_eq!(sequential, parallel);
}
