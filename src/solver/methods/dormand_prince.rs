//! Dormand-Prince 5(4) adaptive solver
//!
//! # Mathematical Background
//!
//! An embedded Runge-Kutta pair: seven stages give a fifth-order solution
//! and, with a second set of weights, a fourth-order one. Their difference
//! estimates the local error of the step:
//!
//! ```text
//! yₙ₊₁ = yₙ + h Σ bᵢ kᵢ        (order 5, propagated)
//! ŷₙ₊₁ = yₙ + h Σ b̂ᵢ kᵢ        (order 4, error estimate only)
//! errₙ₊₁ = h Σ (bᵢ - b̂ᵢ) kᵢ
//! ```
//!
//! The last stage is evaluated at the new solution, so it is also the
//! first stage of the next step (first same as last): an accepted step
//! costs six evaluations.
//!
//! # Step control
//!
//! ```text
//! sc  = atol + rtol · max(|yₙ|, |yₙ₊₁|)
//! err = sqrt(mean((errₙ₊₁ / sc)²))
//! h'  = h · clamp(0.9 · err^(-1/5), 0.2, 5)
//! ```
//!
//! The step is accepted when `err ≤ 1`. After a rejection the next step may
//! not grow. `h'` is also capped by the maximum step and by the time left.

use crate::error::{MembraneError, Result};
use crate::physics::PhysicalState;
use crate::solver::methods::{prepare_initial_state, TrajectoryRecorder};
use crate::solver::{validate_state, Scenario, SimulationResult, Solver, SolverConfiguration, SolverType};
use log::{debug, info, trace};

// =================================================================================================
// Butcher tableau
// =================================================================================================

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;

const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;

const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;

const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;

const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights, also the seventh stage's row (b₂ = 0)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// bᵢ - b̂ᵢ
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// =================================================================================================
// Step controller
// =================================================================================================

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Steps below `STEP_UNDERFLOW × max(1, |t|)` abort the run
const STEP_UNDERFLOW: f64 = 1e-12;

/// New step size from the scaled error norm of the current one
fn step_factor(error_norm: f64, after_rejection: bool) -> f64 {
    if !error_norm.is_finite() {
        return MIN_FACTOR;
    }
    let factor = if error_norm == 0.0 {
        MAX_FACTOR
    } else {
        (SAFETY * error_norm.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
    };
    if after_rejection { factor.min(1.0) } else { factor }
}

/// Root-mean-square of the error scaled by `atol + rtol · max(|y|, |y_new|)`
///
/// Quantities missing from one of the states are ignored.
fn error_norm(error: &PhysicalState, y: &PhysicalState, y_new: &PhysicalState, rtol: f64, atol: f64) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;

    for (quantity, err) in error.iter() {
        let (Some(old), Some(new)) = (y.get(*quantity), y_new.get(*quantity)) else {
            continue;
        };

        for ((e, a), b) in err.values().iter().zip(old.values()).zip(new.values()) {
            let scale = atol + rtol * a.abs().max(b.abs());
            sum += (e / scale).powi(2);
            count += 1;
        }
    }

    if count == 0 { 0.0 } else { (sum / count as f64).sqrt() }
}

/// `y + h Σ aᵢ kᵢ`, stamped with `time`
fn stage(y: &PhysicalState, h: f64, terms: &[(f64, &PhysicalState)], time: f64) -> PhysicalState {
    terms
        .iter()
        .fold(y.clone(), |acc, (a, k)| acc + (*k).clone() * (h * a))
        .at_time(time)
}

// =================================================================================================
// Dormand-Prince Solver
// =================================================================================================

/// Adaptive Dormand-Prince 5(4) solver
///
/// Accepts [`SolverType::Adaptive`] only. The step size follows the local
/// error estimate, so pressure steps and the valve opening are resolved
/// with small steps while the slow tank filling is crossed with large ones.
///
/// # Example
///
/// ```rust
/// use membrane_rs::config::SeparatorConfig;
/// use membrane_rs::models::{MembraneSeparator, PressureSignal};
/// use membrane_rs::solver::{DormandPrinceSolver, Scenario, Solver, SolverConfiguration};
///
/// let model = MembraneSeparator::from_config(
///     &SeparatorConfig::default(),
///     PressureSignal::constant(1e5),
/// ).unwrap();
///
/// let scenario = Scenario::from_model(Box::new(model));
/// let config = SolverConfiguration::adaptive(1.0, 1e-6, 1e-9, 1e-3, 0.01);
///
/// let result = DormandPrinceSolver::new().solve(&scenario, &config).unwrap();
/// assert!((result.final_time() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DormandPrinceSolver;

impl DormandPrinceSolver {
    /// Create a new Dormand-Prince solver
    pub fn new() -> Self {
        Self
    }
}

impl Solver for DormandPrinceSolver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult> {
        // ====== Step 1: Validation ======

        config.validate()?;

        let (total_time, rtol, atol, initial_step, max_step) = match &config.solver_type {
            SolverType::Adaptive { total_time, rtol, atol, initial_step, max_step } => {
                (*total_time, *rtol, *atol, *initial_step, *max_step)
            }
            other => {
                return Err(MembraneError::UnsupportedSolverType {
                    solver: self.name().to_string(),
                    requested: other.name().to_string(),
                });
            }
        };

        // ====== Step 2: Setup ======

        let (mut state, t0) = prepare_initial_state(scenario)?;
        let t_end = t0 + total_time;
        let expected_steps = (total_time / max_step).ceil() as usize;
        let mut recorder = TrajectoryRecorder::new(&state, t0, config.record_every, expected_steps);

        debug!(
            "{}: {} on [{}, {}] s, rtol {} atol {}, h0 {} s, h_max {} s",
            self.name(),
            scenario.get_model_name(),
            t0,
            t_end,
            rtol,
            atol,
            initial_step,
            max_step
        );

        // ====== Step 3: Time Integration ======

        let model = &scenario.model;
        let mut t = t0;
        let mut h = initial_step.min(max_step);
        let mut k1 = model.compute_physics(&state);
        let mut evaluations = 1usize;
        let mut rejected = 0usize;
        let mut after_rejection = false;
        let mut stopped = false;

        // Remaining spans shorter than this are round-off of the last step
        let end_tolerance = STEP_UNDERFLOW * t_end.abs().max(1.0);

        while t_end - t > end_tolerance {
            if config.stop_requested() {
                info!(
                    "{}: stop requested at t = {} s after {} steps",
                    self.name(),
                    t,
                    recorder.accepted()
                );
                stopped = true;
                break;
            }

            if h < STEP_UNDERFLOW * t.abs().max(1.0) {
                return Err(MembraneError::StepSizeUnderflow { time: t, step_size: h });
            }

            // Land exactly on the end time
            let last = t + h >= t_end - end_tolerance;
            if last {
                h = t_end - t;
            }
            let t_next = if last { t_end } else { t + h };

            // ====== Stages ======

            let k2 = model.compute_physics(&stage(&state, h, &[(A21, &k1)], t + C2 * h));
            let k3 = model.compute_physics(&stage(&state, h, &[(A31, &k1), (A32, &k2)], t + C3 * h));
            let k4 = model.compute_physics(&stage(
                &state,
                h,
                &[(A41, &k1), (A42, &k2), (A43, &k3)],
                t + C4 * h,
            ));
            let k5 = model.compute_physics(&stage(
                &state,
                h,
                &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)],
                t + C5 * h,
            ));
            let k6 = model.compute_physics(&stage(
                &state,
                h,
                &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
                t_next,
            ));

            let mut y_new = stage(
                &state,
                h,
                &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
                t_next,
            );
            model.enforce_constraints(&mut y_new, t_next);

            let k7 = model.compute_physics(&y_new);
            evaluations += 6;

            // ====== Error estimate ======

            let error = k1.clone() * (h * E1)
                + k3.clone() * (h * E3)
                + k4 * (h * E4)
                + k5 * (h * E5)
                + k6 * (h * E6)
                + k7.clone() * (h * E7);
            let norm = error_norm(&error, &state, &y_new, rtol, atol);
            let factor = step_factor(norm, after_rejection);

            if norm <= 1.0 {
                trace!("{}: accepted h = {:e} at t = {} (error {:e})", self.name(), h, t, norm);

                validate_state(&y_new, recorder.accepted() + 1, t_next)?;

                state = y_new;
                k1 = k7;
                t = t_next;
                recorder.record(&state, t);

                after_rejection = false;
            } else {
                trace!("{}: rejected h = {:e} at t = {} (error {:e})", self.name(), h, t, norm);

                rejected += 1;
                after_rejection = true;
            }

            h = (h * factor).min(max_step);
        }

        // ====== Step 4: Build Result ======

        let accepted = recorder.accepted();
        let mut result = recorder.finish(state, t);

        result.add_metadata("solver", self.name());
        result.add_metadata("accepted steps", &accepted.to_string());
        result.add_metadata("rejected steps", &rejected.to_string());
        result.add_metadata("function evaluations", &evaluations.to_string());
        result.add_metadata("rtol", &rtol.to_string());
        result.add_metadata("atol", &atol.to_string());
        result.add_metadata("total time", &total_time.to_string());
        result.add_metadata("stopped early", &stopped.to_string());

        debug!(
            "{}: finished at t = {} s, {} accepted / {} rejected steps",
            self.name(),
            t,
            accepted,
            rejected
        );

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "Dormand-Prince 5(4)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
