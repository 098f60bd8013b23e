//! Helper functions for integration tests

#![allow(dead_code)]

use membrane_rs::config::SeparatorConfig;
use membrane_rs::models::{FeedStream, MembraneSeparator, PressureSignal, Sample};
use membrane_rs::physics::PhysicalModel;
use membrane_rs::solver::{DomainBoundaries, Scenario, Solver, SolverConfiguration};

/// Create a scenario starting from the model's own initial state
pub fn create_simple_scenario(model: Box<dyn PhysicalModel>) -> Scenario {
    let initial = model.setup_initial_state();
    let boundaries = DomainBoundaries::temporal(initial);
    Scenario::new(model, boundaries)
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// Separator with the reference parameters
pub fn reference_separator(signal: PressureSignal) -> MembraneSeparator {
    MembraneSeparator::from_config(&SeparatorConfig::default(), signal)
        .expect("reference configuration is valid")
}

/// Integrate `model` and observe every recorded state
pub fn run_separator(
    model: &MembraneSeparator,
    solver: &dyn Solver,
    config: &SolverConfiguration,
) -> Vec<Sample> {
    let scenario = create_simple_scenario(Box::new(model.clone()));
    let result = solver.solve(&scenario, config).expect("run succeeds");
    model.observe_trajectory(&result).expect("trajectory is observable")
}

/// Permeate clamp and per-species mass balance of one sample
pub fn assert_mass_balance(sample: &Sample, feed: &FeedStream) {
    let o2_in = feed.flow * feed.fractions.oxygen;
    let n2_in = feed.flow * feed.fractions.nitrogen;

    for (permeate, component) in [(sample.permeate_o2_flow, o2_in), (sample.permeate_n2_flow, n2_in)] {
        assert!(permeate >= 0.0, "t = {}: negative permeate {}", sample.time, permeate);
        assert!(
            permeate <= 0.99 * component * (1.0 + 1e-12),
            "t = {}: permeate {} above 0.99 · {}",
            sample.time,
            permeate,
            component
        );
    }

    let total_out = sample.retentate_flow + sample.permeate_o2_flow + sample.permeate_n2_flow;
    assert!(
        relative_error(total_out, feed.flow) < 1e-12,
        "t = {}: {} mol/s out for {} mol/s in",
        sample.time,
        total_out,
        feed.flow
    );

    if !sample.degenerate {
        let sum = sample.retentate_o2_fraction + sample.retentate_n2_fraction;
        assert!((sum - 1.0).abs() < 1e-12, "t = {}: fractions sum to {}", sample.time, sum);
    }
}
