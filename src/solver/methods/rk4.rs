//! Runge-Kutta 4 (RK4) numerical solver
//!
//! # Mathematical Background
//!
//! The classical fourth-order Runge-Kutta method uses a weighted average of
//! four slope estimates:
//!
//! ```text
//! k₁ = f(yₙ, tₙ)
//! k₂ = f(yₙ + dt/2 * k₁, tₙ + dt/2)
//! k₃ = f(yₙ + dt/2 * k₂, tₙ + dt/2)
//! k₄ = f(yₙ + dt * k₃, tₙ + dt)
//!
//! yₙ₊₁ = yₙ + dt/6 * (k₁ + 2k₂ + 2k₃ + k₄)
//! ```
//!
//! # Characteristics
//!
//! - **Order**: Fourth-order accurate (global error ~ O(dt⁴))
//! - **Stability**: real-axis stability limit |λ·dt| ≤ 2.78, vs 2 for Euler
//! - **Complexity**: 4 function evaluations per step
//!
//! # Stage times
//!
//! Every stage state is stamped with its own time (`tₙ`, `tₙ + dt/2`,
//! `tₙ + dt`) so that time-dependent boundary values, such as the feed
//! pressure of the membrane, are evaluated where the stage lives.
//!
//! # Comparison with Euler
//!
//! | Method | Order | Evals/Step | Typical dt | Error |
//! |--------|-------|------------|------------|-------|
//! | Euler  | 1     | 1          | Small      | O(dt) |
//! | RK4    | 4     | 4          | Moderate   | O(dt⁴)|

use crate::error::{MembraneError, Result};
use crate::solver::methods::{prepare_initial_state, TrajectoryRecorder};
use crate::solver::{validate_state, Scenario, SimulationResult, Solver, SolverConfiguration, SolverType};
use log::{debug, info};

// =================================================================================================
// RK4 Solver
// =================================================================================================

/// Classical fourth-order Runge-Kutta solver
///
/// # Algorithm
///
/// 1. Start with initial state y₀, constraints applied
/// 2. For each time step n = 0, 1, 2, ..., N-1:
///    - **Stage 1**: k₁ = f(yₙ, tₙ)
///    - **Stage 2**: k₂ = f(yₙ + dt/2·k₁, tₙ + dt/2)
///    - **Stage 3**: k₃ = f(yₙ + dt/2·k₂, tₙ + dt/2)
///    - **Stage 4**: k₄ = f(yₙ + dt·k₃, tₙ + dt)
///    - **Update**: yₙ₊₁ = yₙ + dt/6·(k₁ + 2k₂ + 2k₃ + k₄)
///    - Re-apply constraints at tₙ₊₁, validate, record
/// 3. Return the trajectory
///
/// **Practical implication**: Halving dt reduces error by a factor of 16.
///
/// # Example
///
/// ```rust
/// use membrane_rs::config::SeparatorConfig;
/// use membrane_rs::models::{MembraneSeparator, PressureSignal};
/// use membrane_rs::solver::{RK4Solver, Scenario, Solver, SolverConfiguration};
///
/// let model = MembraneSeparator::from_config(
///     &SeparatorConfig::default(),
///     PressureSignal::step(0.5, 1e5, 5e4),
/// ).unwrap();
///
/// let scenario = Scenario::from_model(Box::new(model));
/// let config = SolverConfiguration::time_evolution(1.0, 100);
///
/// let result = RK4Solver::new().solve(&scenario, &config).unwrap();
/// assert_eq!(result.metadata["function evaluations"], "400");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4Solver;

impl RK4Solver {
    /// Create a new RK4 solver
    ///
    /// # Example
    ///
    /// ```rust
    /// use membrane_rs::solver::{RK4Solver, Solver};
    ///
    /// let solver = RK4Solver::new();
    /// assert_eq!(solver.name(), "Runge Kutta (RK4)");
    /// ```
    pub fn new() -> Self {
        Self
    }
}

impl Solver for RK4Solver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult> {
        // ====== Step 1: Validation ======

        config.validate()?;

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

        let model = &scenario.model;
        let mut t_current = t0;
        let mut stopped = false;

        for step in 0..time_steps {
            if config.stop_requested() {
                info!("{}: stop requested at t = {} s after {} steps", self.name(), t_current, step);
                stopped = true;
                break;
            }

            let t = t0 + (step as f64) * dt;
            let t_half = t + dt / 2.0;
            let t_next = t0 + (step as f64 + 1.0) * dt;

            // ====== RK4 Stages ======

            // Stage 1: slope at the beginning of the interval
            let k1 = model.compute_physics(&state);

            // Stage 2: slope at the midpoint, Euler prediction with k₁
            let state_k2 = (state.clone() + k1.clone() * (dt / 2.0)).at_time(t_half);
            let k2 = model.compute_physics(&state_k2);

            // Stage 3: slope at the midpoint, Euler prediction with k₂
            let state_k3 = (state.clone() + k2.clone() * (dt / 2.0)).at_time(t_half);
            let k3 = model.compute_physics(&state_k3);

            // Stage 4: slope at the end, Euler prediction with k₃
            let state_k4 = (state.clone() + k3.clone() * dt).at_time(t_next);
            let k4 = model.compute_physics(&state_k4);

            // ====== RK4 Update ======

            // Simpson weights: 1/6 at the ends, 1/3 at the midpoint
            let weighted_slope = k1 + k2 * 2.0 + k3 * 2.0 + k4;
            state = (state + weighted_slope * (dt / 6.0)).at_time(t_next);

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
        result.add_metadata("function evaluations", &(4 * steps_taken).to_string());
        result.add_metadata("stopped early", &stopped.to_string());

        debug!("{}: finished at t = {} s ({} records)", self.name(), t_current, result.len());

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "Runge Kutta (RK4)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
    use crate::solver::StopSignal;

    const POSITION: PhysicalQuantity = PhysicalQuantity::Custom("Position");
    const VELOCITY: PhysicalQuantity = PhysicalQuantity::Custom("Velocity");

    // ====== Mock Models for Testing ======

    /// Mock model: exponential decay dy/dt = -k * y
    struct ExponentialDecay {
        points: usize,
        decay_rate: f64,
    }

    impl PhysicalModel for ExponentialDecay {
        fn points(&self) -> usize {
            self.points
        }

        fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
            let mut result = state.clone();
            if let Some(conc) = result.get_mut(PhysicalQuantity::Concentration) {
                conc.apply(|y| -self.decay_rate * y);
            }
            result
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(
                PhysicalQuantity::Concentration,
                PhysicalData::uniform_vector(self.points, 1.0),
            )
        }

        fn name(&self) -> &'static str {
            "Exponential Decay"
        }
    }

    /// Mock model: simple harmonic oscillator d²y/dt² = -ω²y
    /// Rewritten as a first-order system on two custom quantities.
    struct HarmonicOscillator {
        omega: f64,
    }

    impl PhysicalModel for HarmonicOscillator {
        fn points(&self) -> usize {
            1
        }

        fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
            let y1 = state.get(POSITION).unwrap().clone();
            let mut dy2 = y1;
            dy2.apply(|y| -self.omega * self.omega * y);

            PhysicalState::new(POSITION, state.get(VELOCITY).unwrap().clone()).with(VELOCITY, dy2)
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(POSITION, PhysicalData::from_scalar(1.0))
                .with(VELOCITY, PhysicalData::from_scalar(0.0))
        }

        fn name(&self) -> &str {
            "Harmonic Oscillator"
        }
    }

    /// Mock model: dy/dt = 3t², exact for RK4 (Simpson's rule)
    struct QuadraticInTime;

    impl PhysicalModel for QuadraticInTime {
        fn points(&self) -> usize {
            1
        }

        fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
            let t = state.time();
            PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(3.0 * t * t))
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(0.0))
        }

        fn name(&self) -> &str {
            "Quadratic In Time"
        }
    }

    fn decay(decay_rate: f64) -> Scenario {
        Scenario::from_model(Box::new(ExponentialDecay { points: 3, decay_rate }))
    }

    fn concentration(result: &SimulationResult) -> f64 {
        result.final_state.get(PhysicalQuantity::Concentration).unwrap().as_vector()[0]
    }

    // ====== Solver creation tests ======

    #[test]
    fn test_rk4_solver_creation() {
        assert_eq!(RK4Solver::new().name(), "Runge Kutta (RK4)");
        assert_eq!(RK4Solver::default().name(), "Runge Kutta (RK4)");
    }

    #[test]
    fn test_rk4_rejects_adaptive() {
        let config = SolverConfiguration::adaptive(1.0, 1e-6, 1e-9, 0.01, 0.1);
        let result = RK4Solver::new().solve(&decay(0.1), &config);
        assert!(matches!(result, Err(MembraneError::UnsupportedSolverType { .. })));
    }

    // ====== Accuracy tests ======

    #[test]
    fn test_rk4_exponential_decay() {
        let config = SolverConfiguration::time_evolution(10.0, 100);
        let result = RK4Solver::new().solve(&decay(0.1), &config).unwrap();

        let error = (concentration(&result) - (-1.0f64).exp()).abs();
        assert!(error < 1e-8, "Error {} is too large for RK4", error);
    }

    #[test]
    fn test_rk4_convergence() {
        // error(dt/2) ≈ error(dt) / 16
        let total_time = 5.0;
        let exact = (-total_time as f64).exp();

        let mut errors = Vec::new();
        for steps in [20, 40, 80, 160] {
            let config = SolverConfiguration::time_evolution(total_time, steps);
            let result = RK4Solver::new().solve(&decay(1.0), &config).unwrap();
            errors.push((concentration(&result) - exact).abs());
        }

        for i in 0..errors.len() - 1 {
            let ratio = errors[i] / errors[i + 1];
            assert!(ratio > 12.0 && ratio < 20.0, "Convergence ratio {} not fourth order at {}", ratio, i);
        }
    }

    #[test]
    fn test_rk4_harmonic_oscillator() {
        // y(2π) = cos(2π) = 1
        let scenario = Scenario::from_model(Box::new(HarmonicOscillator { omega: 1.0 }));
        let config = SolverConfiguration::time_evolution(2.0 * std::f64::consts::PI, 100);
        let result = RK4Solver::new().solve(&scenario, &config).unwrap();

        let position = result.final_state.get(POSITION).unwrap().as_scalar();
        assert!((position - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_rk4_stage_times() {
        // ∫₀² 3t² dt = 8, exact when the stages see their own times
        let scenario = Scenario::from_model(Box::new(QuadraticInTime));
        let config = SolverConfiguration::time_evolution(2.0, 4);
        let result = RK4Solver::new().solve(&scenario, &config).unwrap();

        let y = result.final_state.get(PhysicalQuantity::Moles).unwrap().as_scalar();
        assert!((y - 8.0).abs() < 1e-12);
    }

    // ====== Trajectory tests ======

    #[test]
    fn test_rk4_trajectory_and_metadata() {
        let config = SolverConfiguration::time_evolution(10.0, 50);
        let result = RK4Solver::new().solve(&decay(0.1), &config).unwrap();

        assert_eq!(result.len(), 51);
        assert_eq!(result.state_trajectory.len(), 51);
        assert!((result.final_time() - 10.0).abs() < 1e-12);

        assert_eq!(result.metadata.get("solver"), Some(&"Runge Kutta (RK4)".to_string()));
        assert_eq!(result.metadata.get("function evaluations"), Some(&"200".to_string()));
        assert_eq!(result.metadata.get("stopped early"), Some(&"false".to_string()));
    }

    #[test]
    fn test_rk4_stop_signal() {
        let stop = StopSignal::new();
        stop.stop();
        let config = SolverConfiguration::time_evolution(10.0, 50).with_stop_signal(stop);
        let result = RK4Solver::new().solve(&decay(0.1), &config).unwrap();

        assert!(result.stopped_early());
        assert_eq!(result.final_time(), 0.0);
        assert_eq!(concentration(&result), 1.0);
    }

    // ====== Validation tests ======

    #[test]
    fn test_rk4_detects_inf() {
        struct InfModel;

        impl PhysicalModel for InfModel {
            fn points(&self) -> usize {
                2
            }

            fn compute_physics(&self, _state: &PhysicalState) -> PhysicalState {
                PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(f64::INFINITY))
            }

            fn setup_initial_state(&self) -> PhysicalState {
                PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(1.0))
            }

            fn name(&self) -> &str {
                "Inf Model"
            }
        }

        let config = SolverConfiguration::time_evolution(1.0, 10);
        let err = RK4Solver::new().solve(&Scenario::from_model(Box::new(InfModel)), &config).unwrap_err();
        assert!(err.to_string().contains("Infinity") || err.to_string().contains("NaN"));
    }
}
