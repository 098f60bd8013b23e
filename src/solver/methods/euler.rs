//! Forward Euler numerical solver
//!
//! # Mathematical Background
//!
//! The Forward Euler method is the simplest explicit time-stepping scheme
//! for ordinary differential equations:
//!
//! ```text
//! dy/dt = f(y, t)
//! y_{n+1} = y_n + dt * f(y_n, t_n)
//! ```
//!
//! # Characteristics
//!
//! - **Order**: First-order accurate (error ~ O(dt))
//! - **Stability**: Conditionally stable
//! - **Complexity**: 1 function evaluation per step
//! - **Memory**: O(1) besides the recorded trajectory
//!
//! # Stability for the membrane
//!
//! For the method-of-lines diffusion operator the update of an interior
//! node reads `C' = (1 - 2r)·C + r·(C₊ + C₋)` with `r = D·dt/dx²`. With
//! `r ≤ 1/2` every coefficient is non-negative, so the scheme is stable and
//! keeps concentrations non-negative. Above that limit the highest grid
//! mode grows and the run aborts with a numerical instability error.
//!
//! # Example
//!
//! ```rust
//! use membrane_rs::config::SeparatorConfig;
//! use membrane_rs::models::{MembraneSeparator, PressureSignal};
//! use membrane_rs::solver::{EulerSolver, Scenario, Solver, SolverConfiguration};
//!
//! let model = MembraneSeparator::from_config(
//!     &SeparatorConfig::default(),
//!     PressureSignal::constant(1e5),
//! ).unwrap();
//!
//! let scenario = Scenario::from_model(Box::new(model));
//! let config = SolverConfiguration::time_evolution(2.0, 200);
//! let result = EulerSolver::new().solve(&scenario, &config).unwrap();
//!
//! assert!((result.final_time() - 2.0).abs() < 1e-12);
//! ```

use crate::error::{MembraneError, Result};
use crate::physics::PhysicalState;
use crate::solver::methods::{prepare_initial_state, TrajectoryRecorder};
use crate::solver::{validate_state, Scenario, SimulationResult, Solver, SolverConfiguration, SolverType};
use log::{debug, info};

// =================================================================================================
// Forward Euler Solver
// =================================================================================================

/// Forward Euler time-stepping solver
///
/// # Algorithm
///
/// 1. Start with the initial state y_0, constraints applied
/// 2. For each time step n = 0, 1, 2, ..., N-1:
///    - Stop if an external stop was requested
///    - Compute physics: k = f(y_n, t_n)
///    - Update state: y_{n+1} = y_n + dt * k
///    - Re-apply the model's constraints at t_{n+1}
///    - Validate, record
/// 3. Return the trajectory
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerSolver;

impl EulerSolver {
    /// Create a new Forward Euler solver
    ///
    /// # Example
    ///
    /// ```rust
    /// use membrane_rs::solver::{EulerSolver, Solver};
    ///
    /// let solver = EulerSolver::new();
    /// assert_eq!(solver.name(), "Forward Euler");
    /// ```
    pub fn new() -> Self {
        Self
    }
}

impl Solver for EulerSolver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult> {
        // ====== Step 1: Validation ======

        config.validate()?;

        // Forward Euler is dedicated to fixed-step time evolution
        let (total_time, time_steps) = match &config.solver_type {
            SolverType::TimeEvolution { total_time, time_steps } => (*total_time, *time_steps),
            other => {
                return Err(MembraneError::UnsupportedSolverType {
                    solver: self.name().to_string(),
                    requested: other.name().to_string(),
                });
            }
        };

        // ====== Step 2: Setup ======

        let dt = total_time / (time_steps as f64);
        let (mut state, t0) = prepare_initial_state(scenario)?;
        let mut recorder = TrajectoryRecorder::new(&state, t0, config.record_every, time_steps);

        debug!(
            "{}: {} on [{}, {}] s, {} steps of {} s",
            self.name(),
            scenario.get_model_name(),
            t0,
            t0 + total_time,
            time_steps,
            dt
        );

        // ====== Step 3: Time Integration ======

        let mut t_current = t0;
        let mut stopped = false;

        for step in 0..time_steps {
            if config.stop_requested() {
                info!("{}: stop requested at t = {} s after {} steps", self.name(), t_current, step);
                stopped = true;
                break;
            }

            // 1. f(y_n, t_n); the state carries t_n in its metadata
            let physics: PhysicalState = scenario.model.compute_physics(&state);

            // 2. y_{n+1} = y_n + dt * f(y_n, t_n)
            //    t_{n+1} is computed from the index, not accumulated
            let t_next = t0 + (step as f64 + 1.0) * dt;
            state = (state + physics * dt).at_time(t_next);

            // 3. Dirichlet nodes follow the boundary values at t_{n+1}
            scenario.model.enforce_constraints(&mut state, t_next);

            // ====== Validation ======
            validate_state(&state, step + 1, t_next)?;

            // ====== Storage ======
            recorder.record(&state, t_next);
            t_current = t_next;
        }

        // ====== Step 4: Build Result ======

        let steps_taken = recorder.accepted();
        let mut result = recorder.finish(state, t_current);

        result.add_metadata("solver", self.name());
        result.add_metadata("time steps", &time_steps.to_string());
        result.add_metadata("steps taken", &steps_taken.to_string());
        result.add_metadata("dt", &dt.to_string());
        result.add_metadata("total time", &total_time.to_string());
        result.add_metadata("function evaluations", &steps_taken.to_string());
        result.add_metadata("stopped early", &stopped.to_string());

        debug!("{}: finished at t = {} s ({} records)", self.name(), t_current, result.len());

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "Forward Euler"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
