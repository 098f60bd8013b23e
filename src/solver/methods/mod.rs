//! Numerical methods for solving differential equations
//!
//! This module contains concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Available Methods
//!
//! ## Fixed-step explicit methods
//!
//! - **[`EulerSolver`]**: Forward Euler method
//!   - Order: First-order O(dt)
//!   - Cost: 1 function evaluation per step
//!   - Use: quick runs; positivity preserving for the diffusion field when
//!     `dt ≤ dx² / (2·D)`
//!
//! - **[`RK4Solver`]**: Classical fourth-order Runge-Kutta
//!   - Order: Fourth-order O(dt⁴)
//!   - Cost: 4 function evaluations per step
//!   - Use: default for production runs
//!
//! ## Adaptive methods
//!
//! - **[`DormandPrinceSolver`]**: embedded Runge-Kutta 5(4)
//!   - Order: fifth-order solution, fourth-order error estimate
//!   - Cost: 6 function evaluations per step (first-same-as-last)
//!   - Use: long runs, pressure steps, the valve crossover kink
//!
//! # Example
//!
//! ```rust
//! use membrane_rs::solver::{DormandPrinceSolver, EulerSolver, RK4Solver, Solver};
//!
//! let solvers: Vec<Box<dyn Solver>> = vec![
//!     Box::new(EulerSolver::new()),
//!     Box::new(RK4Solver::new()),
//!     Box::new(DormandPrinceSolver::new()),
//! ];
//! assert_eq!(solvers[2].name(), "Dormand-Prince 5(4)");
//! ```

mod dormand_prince;
mod euler;
mod rk4;

// Re-exports for convenience
pub use dormand_prince::DormandPrinceSolver;
pub use euler::EulerSolver;
pub use rk4::RK4Solver;

use crate::error::Result;
use crate::physics::PhysicalState;
use crate::solver::{validate_state, Scenario, SimulationResult};

/// Validated initial state, with its constraints applied, and its time
pub(crate) fn prepare_initial_state(scenario: &Scenario) -> Result<(PhysicalState, f64)> {
    scenario.validate()?;

    let t0 = scenario.conditions.start_time();
    let mut state = scenario
        .conditions
        .initial_condition()
        .cloned()
        .ok_or(crate::error::MembraneError::MissingInitialCondition)?
        .at_time(t0);

    scenario.model.enforce_constraints(&mut state, t0);
    validate_state(&state, 0, t0)?;

    Ok((state, t0))
}

/// Collects every n-th accepted state of a run
///
/// The initial state is always kept, and [`finish`](Self::finish) makes
/// sure the last state is kept too.
/// Upper bound on the samples reserved before the first step
pub(crate) const MAX_PREALLOCATED_SAMPLES: usize = 1 << 16;

pub(crate) struct TrajectoryRecorder {
    every: usize,
    accepted: usize,
    last_kept: bool,
    time_points: Vec<f64>,
    states: Vec<PhysicalState>,
}

impl TrajectoryRecorder {
    pub(crate) fn new(initial: &PhysicalState, t0: f64, every: usize, expected_steps: usize) -> Self {
        let every = every.max(1);
        let capacity = (expected_steps / every).min(MAX_PREALLOCATED_SAMPLES) + 2;

        let mut time_points = Vec::with_capacity(capacity);
        let mut states = Vec::with_capacity(capacity);
        time_points.push(t0);
        states.push(initial.clone());

        Self {
            every,
            accepted: 0,
            last_kept: true,
            time_points,
            states,
        }
    }

    /// Register an accepted step
    pub(crate) fn record(&mut self, state: &PhysicalState, t: f64) {
        self.accepted += 1;
        self.last_kept = self.accepted % self.every == 0;
        if self.last_kept {
            self.time_points.push(t);
            self.states.push(state.clone());
        }
    }

    /// Number of accepted steps so far
    pub(crate) fn accepted(&self) -> usize {
        self.accepted
    }

    /// Build the result, appending the final state if the stride skipped it
    pub(crate) fn finish(mut self, final_state: PhysicalState, t_final: f64) -> SimulationResult {
        if !self.last_kept {
            self.time_points.push(t_final);
            self.states.push(final_state.clone());
        }
        SimulationResult::new(self.time_points, self.states, final_state)
    }
}
