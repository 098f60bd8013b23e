//! One-call runner: configuration in, observed trajectory out
//!
//! ```rust
//! use membrane_rs::config::{IntegratorConfig, SimulationConfig};
//! use membrane_rs::simulation::simulate;
//!
//! let config = SimulationConfig {
//!     end_time: 1.0,
//!     integrator: IntegratorConfig::Rk4 { steps: 100 },
//!     ..SimulationConfig::default()
//! };
//!
//! let report = simulate(&config).unwrap();
//! assert_eq!(report.samples.len(), 101);
//! assert_eq!(report.method, "rk4");
//! ```

use crate::config::{IntegratorConfig, SimulationConfig};
use crate::error::Result;
use crate::models::{MembraneSeparator, Sample};
use crate::solver::{
    DormandPrinceSolver, EulerSolver, RK4Solver, Scenario, SimulationResult, Solver, SolverConfiguration,
    StopSignal,
};
use log::debug;

/// Outcome of [`simulate`]
#[derive(Debug)]
pub struct SimulationReport {
    /// Integrator name from the configuration (`euler`, `rk4`, `dormand_prince`)
    pub method: &'static str,
    /// Raw trajectory and solver metadata
    pub result: SimulationResult,
    /// Observable outputs at every recorded time point
    pub samples: Vec<Sample>,
    /// Tank pressure the run tends to under the settled feed pressure, if any
    pub steady_tank_pressure: Option<f64>,
}

impl SimulationReport {
    /// Last observed sample
    pub fn last_sample(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// The run was stopped before reaching the end time
    pub fn stopped_early(&self) -> bool {
        self.result.stopped_early()
    }
}

/// Integrator selected by the configuration
pub fn solver_for(integrator: &IntegratorConfig) -> Box<dyn Solver> {
    match integrator {
        IntegratorConfig::Euler { .. } => Box::new(EulerSolver::new()),
        IntegratorConfig::Rk4 { .. } => Box::new(RK4Solver::new()),
        IntegratorConfig::DormandPrince { .. } => Box::new(DormandPrinceSolver::new()),
    }
}

/// Solver configuration for the time span and method of `config`
pub fn solver_configuration(config: &SimulationConfig) -> SolverConfiguration {
    let solver_config = match config.integrator {
        IntegratorConfig::Euler { steps } | IntegratorConfig::Rk4 { steps } => {
            SolverConfiguration::time_evolution(config.end_time, steps)
        }
        IntegratorConfig::DormandPrince { rtol, atol, initial_step, max_step } => {
            SolverConfiguration::adaptive(config.end_time, rtol, atol, initial_step, max_step)
        }
    };
    solver_config.with_recording_stride(config.record_every)
}

/// Validate `config`, build the separator, integrate and observe
///
/// # Errors
///
/// `Configuration` for invalid input, and whatever the solver reports
/// (`NumericalInstability`, `StepSizeUnderflow`).
pub fn simulate(config: &SimulationConfig) -> Result<SimulationReport> {
    run(config, None)
}

/// Same as [`simulate`], stoppable from another thread through `stop`
pub fn simulate_with_stop(config: &SimulationConfig, stop: StopSignal) -> Result<SimulationReport> {
    run(config, Some(stop))
}

fn run(config: &SimulationConfig, stop: Option<StopSignal>) -> Result<SimulationReport> {
    config.validate()?;

    let signal = config.feed.to_signal();
    let model = MembraneSeparator::from_config(&config.separator, signal)?;
    let steady_tank_pressure = model.signal().settled_value().map(|p| model.steady_tank_pressure(p));

    let mut solver_config = solver_configuration(config);
    if let Some(stop) = stop {
        solver_config = solver_config.with_stop_signal(stop);
    }

    let solver = solver_for(&config.integrator);
    debug!("simulate: {} for {} s", solver.name(), config.end_time);

    // The scenario owns its model; keep a copy for observation
    let scenario = Scenario::from_model(Box::new(model.clone()));
    let mut result = solver.solve(&scenario, &solver_config)?;
    result.add_metadata("method", config.integrator.name());
    result.add_metadata("nodes", &model.field().nodes().to_string());

    let samples = model.observe_trajectory(&result)?;

    Ok(SimulationReport {
        method: config.integrator.name(),
        result,
        samples,
        steady_tank_pressure,
    })
}

// =================================================================================================
// Tests
// =================================================================================================
