//! Numerical solvers
//!
//! This module provides traits and implementations for time integrators.
//! A numerical solver applies a numerical method to the equations provided
//! by a physical model within a specific scenario.
//!
//! # The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Physical model (equations)
//!    - Initial condition (`DomainBoundaries`)
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Solver type (fixed step or adaptive) and its parameters
//!    - Stop signal, recording stride
//!
//! 3. **Solver** (`Solver` trait) - The numerical method
//!    - Applies the numerical scheme
//!    - Returns the trajectory
//!    - Independent of physics
//!
//! # Workflow
//!
//! ```text
//! MembraneSeparator ─┐
//!                    ├─► Scenario ─┐
//! DomainBoundaries ──┘             ├─► Solver::solve ─► SimulationResult
//! SolverConfiguration ─────────────┘
//! ```
//!
//! # Contract with the model
//!
//! Every solver:
//! - writes the stage time into the state metadata (`"time"`) before each
//!   call to `compute_physics`,
//! - calls `enforce_constraints` on the initial state and after each
//!   accepted step,
//! - rejects non-finite values and negative concentrations or moles with
//!   [`MembraneError::NumericalInstability`],
//! - checks the configuration's stop signal before each step.
//!
//! # Quick Start Example
//!
//! ```rust
//! use membrane_rs::config::SeparatorConfig;
//! use membrane_rs::models::{MembraneSeparator, PressureSignal};
//! use membrane_rs::solver::{RK4Solver, Scenario, Solver, SolverConfiguration};
//!
//! let model = MembraneSeparator::from_config(
//!     &SeparatorConfig::default(),
//!     PressureSignal::constant(1e5),
//! ).unwrap();
//!
//! let scenario = Scenario::from_model(Box::new(model));
//! let config = SolverConfiguration::time_evolution(1.0, 100);
//!
//! let result = RK4Solver::new().solve(&scenario, &config).unwrap();
//! assert_eq!(result.len(), 101);
//! ```

// =================================================================================================
// Module Declarations
// =================================================================================================
mod boundary;
mod methods;
mod scenario;
mod traits;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// Read by `PhysicalData::apply()` and by the per-species diffusion
// derivative. The value only selects a code path, both paths give the
// same numbers.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of elements above which work is split across threads
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

/// Runtime-configurable parallel-execution threshold.
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Return the current parallel-execution threshold.
///
/// Work on fewer elements than this runs sequentially; larger work runs
/// on Rayon, but only when the crate is compiled with the `parallel`
/// feature.
///
/// # Example
///
/// ```rust
/// use membrane_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold to a new value.
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// # Example
///
/// ```rust
/// use membrane_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
///
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Overrides the threshold for one test and restores it on drop
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    pub(crate) fn save(new_value: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{SimulationResult, Solver, SolverConfiguration, SolverType, StopSignal};

pub use boundary::DomainBoundaries;
pub use scenario::Scenario;

pub use methods::{DormandPrinceSolver, EulerSolver, RK4Solver};

// =================================================================================================
// Helper Functions
// =================================================================================================

use crate::error::{MembraneError, Result};
use crate::physics::{PhysicalQuantity, PhysicalState};

/// Negative values of amounts below `-NEGATIVE_TOLERANCE × max|value|` abort a run
pub const NEGATIVE_TOLERANCE: f64 = 1e-6;

/// Validate physical state for numerical issues
///
/// Checks that the state does not contain NaN or Inf values, and that
/// amounts (`Concentration`, `Moles`) are not negative beyond round-off.
///
/// # Arguments
///
/// * `state` - Physical state to validate
/// * `step` - Current time step (for error reporting)
/// * `time` - Time the state represents (for error reporting)
pub(crate) fn validate_state(state: &PhysicalState, step: usize, time: f64) -> Result<()> {
    for quantity in state.available_quantities() {
        let Some(data) = state.get(quantity) else {
            continue;
        };
        let values = data.values();

        // NaN arises from 0/0, Inf - Inf, or other undefined operations
        if values.iter().any(|x| x.is_nan()) {
            return Err(MembraneError::instability(
                step,
                time,
                quantity.to_string(),
                "NaN detected; try reducing the time step",
            ));
        }

        // Inf indicates overflow or division by zero
        if values.iter().any(|x| x.is_infinite()) {
            return Err(MembraneError::instability(
                step,
                time,
                quantity.to_string(),
                "Infinity detected; try reducing the time step",
            ));
        }

        if matches!(quantity, PhysicalQuantity::Concentration | PhysicalQuantity::Moles) {
            let floor = -NEGATIVE_TOLERANCE * data.max_abs();
            if let Some(min) = values.iter().copied().find(|&x| x < floor) {
                return Err(MembraneError::instability(
                    step,
                    time,
                    quantity.to_string(),
                    format!("negative amount {:e} detected", min),
                ));
            }
        }
    }

    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
