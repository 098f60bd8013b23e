//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! This module follows the same pattern as `PhysicalQuantity`:
//! - Central enum `SolverType` defines the kind of time integration
//! - `SolverConfiguration` carries it, plus run controls (stop signal,
//!   recording stride)
//! - `SimulationResult` holds the trajectory, with string metadata for
//!   diagnostics

use crate::error::{MembraneError, Result};
use crate::physics::PhysicalState;
use crate::solver::Scenario;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// Central Solver Type Enumeration
// ============================================================================

/// Type of numerical solution method
///
/// Each variant carries the data specific to that solution type.
///
/// # Examples
///
/// ```rust
/// use membrane_rs::solver::SolverType;
///
/// // Fixed-step time evolution
/// let fixed = SolverType::TimeEvolution {
///     total_time: 10.0,
///     time_steps: 1000,
/// };
///
/// // Error-controlled time evolution
/// let adaptive = SolverType::Adaptive {
///     total_time: 10.0,
///     rtol: 1e-6,
///     atol: 1e-9,
///     initial_step: 1e-3,
///     max_step: 0.5,
/// };
///
/// assert_eq!(fixed.name(), "TimeEvolution");
/// assert_eq!(adaptive.total_time(), 10.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SolverType {
    /// Fixed-step time evolution
    ///
    /// Used by: Euler, Runge-Kutta
    ///
    /// # Parameters
    /// - `total_time`: Total simulation time (seconds)
    /// - `time_steps`: Number of time steps
    TimeEvolution { total_time: f64, time_steps: usize },

    /// Time evolution with local error control
    ///
    /// Used by: Dormand-Prince
    ///
    /// # Parameters
    /// - `total_time`: Total simulation time (seconds)
    /// - `rtol`, `atol`: Relative and absolute tolerance per state component
    /// - `initial_step`: First trial step (seconds)
    /// - `max_step`: Largest allowed step (seconds)
    Adaptive {
        total_time: f64,
        rtol: f64,
        atol: f64,
        initial_step: f64,
        max_step: f64,
    },
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &str {
        match self {
            SolverType::TimeEvolution { .. } => "TimeEvolution",
            SolverType::Adaptive { .. } => "Adaptive",
        }
    }

    /// Simulated time span (seconds)
    pub fn total_time(&self) -> f64 {
        match self {
            SolverType::TimeEvolution { total_time, .. } | SolverType::Adaptive { total_time, .. } => {
                *total_time
            }
        }
    }

    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<()> {
        let total_time = self.total_time();
        if !(total_time.is_finite() && total_time > 0.0) {
            return Err(MembraneError::configuration(
                "total_time",
                format!("must be positive, got {}", total_time),
            ));
        }

        match self {
            SolverType::TimeEvolution { time_steps, .. } => {
                if *time_steps == 0 {
                    return Err(MembraneError::configuration(
                        "time_steps",
                        "must be greater than 0",
                    ));
                }
                Ok(())
            }
            SolverType::Adaptive { rtol, atol, initial_step, max_step, .. } => {
                for (field, value) in [
                    ("rtol", *rtol),
                    ("atol", *atol),
                    ("initial_step", *initial_step),
                    ("max_step", *max_step),
                ] {
                    if !(value.is_finite() && value > 0.0) {
                        return Err(MembraneError::configuration(
                            field,
                            format!("must be positive, got {}", value),
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

// =================================================================================================
// Stop signal
// =================================================================================================

/// Shared flag used to stop a run between steps
///
/// Cloning shares the flag. Solvers check it before every step and return
/// the trajectory computed so far.
///
/// ```rust
/// use membrane_rs::solver::StopSignal;
///
/// let signal = StopSignal::new();
/// let handle = signal.clone();
/// handle.stop();
/// assert!(signal.is_stopped());
/// ```
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run to stop
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration for numerical solver
///
/// # Examples
///
/// ```rust
/// use membrane_rs::solver::{SolverConfiguration, StopSignal};
///
/// let stop = StopSignal::new();
/// let config = SolverConfiguration::time_evolution(100.0, 10_000)
///     .with_recording_stride(100)
///     .with_stop_signal(stop.clone());
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.record_every, 100);
/// ```
#[derive(Clone, Debug)]
pub struct SolverConfiguration {
    /// Type of solver and its parameters
    pub solver_type: SolverType,

    /// External stop request, checked between steps
    pub stop_signal: Option<StopSignal>,

    /// Keep every n-th accepted step in the trajectory
    ///
    /// The initial and the last state are always kept.
    pub record_every: usize,
}

impl SolverConfiguration {
    /// Create a new configuration with a given solver type
    pub fn new(solver_type: SolverType) -> Self {
        Self {
            solver_type,
            stop_signal: None,
            record_every: 1,
        }
    }

    /// Create a fixed-step time evolution configuration
    pub fn time_evolution(total_time: f64, time_steps: usize) -> Self {
        Self::new(SolverType::TimeEvolution { total_time, time_steps })
    }

    /// Create an adaptive time evolution configuration
    pub fn adaptive(total_time: f64, rtol: f64, atol: f64, initial_step: f64, max_step: f64) -> Self {
        Self::new(SolverType::Adaptive {
            total_time,
            rtol,
            atol,
            initial_step,
            max_step,
        })
    }

    /// Builder: attach a stop signal
    pub fn with_stop_signal(mut self, signal: StopSignal) -> Self {
        self.stop_signal = Some(signal);
        self
    }

    /// Builder: record every n-th step
    pub fn with_recording_stride(mut self, record_every: usize) -> Self {
        self.record_every = record_every;
        self
    }

    /// Whether a stop was requested
    pub fn stop_requested(&self) -> bool {
        self.stop_signal.as_ref().is_some_and(StopSignal::is_stopped)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.solver_type.validate()?;
        if self.record_every == 0 {
            return Err(MembraneError::configuration("record_every", "must be at least 1"));
        }
        Ok(())
    }
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Output of a solver run
///
/// `time_points[i]` is the time of `state_trajectory[i]`. `final_state` is
/// the state at the last time point.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Recorded times [s], starting at the initial-condition time
    pub time_points: Vec<f64>,

    /// Recorded states
    pub state_trajectory: Vec<PhysicalState>,

    /// Last state reached
    pub final_state: PhysicalState,

    /// Diagnostics: solver name, step counts, dt, early stop
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    pub fn new(
        time_points: Vec<f64>,
        state_trajectory: Vec<PhysicalState>,
        final_state: PhysicalState,
    ) -> Self {
        Self {
            time_points,
            state_trajectory,
            final_state,
            metadata: HashMap::new(),
        }
    }

    /// Number of recorded time points
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    /// Time of the last recorded state
    pub fn final_time(&self) -> f64 {
        self.time_points.last().copied().unwrap_or(0.0)
    }

    /// Add a diagnostic entry
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Whether the run ended on an external stop request
    pub fn stopped_early(&self) -> bool {
        self.metadata.get("stopped early").is_some_and(|v| v == "true")
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// Numerical method that advances a scenario in time
///
/// Solvers are stateless: the same instance can run many scenarios.
pub trait Solver: Send + Sync {
    /// Integrate `scenario` as described by `config`
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult>;

    /// Display name
    fn name(&self) -> &str;
}
