//! Mock physical models for testing
//!
//! These models have known analytical solutions, making them
//! ideal for validating numerical solver accuracy.

#![allow(dead_code)]

use membrane_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// Exponential decay model: dy/dt = -k*y
///
/// Analytical solution: y(t) = y₀ * exp(-k*t)
pub struct ExponentialDecay {
    pub points: usize,
    pub decay_rate: f64, // k in dy/dt = -k*y
}

impl ExponentialDecay {
    pub fn new(points: usize, decay_rate: f64) -> Self {
        Self { points, decay_rate }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64, y0: f64) -> f64 {
        y0 * (-self.decay_rate * t).exp()
    }
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

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Constant Growth: dy/dt = c
// =================================================================================================

/// Constant growth model: dy/dt = c
///
/// Analytical solution: y(t) = y₀ + c*t. Every solver is exact here.
pub struct ConstantGrowth {
    pub points: usize,
    pub growth_rate: f64,
}

impl ConstantGrowth {
    pub fn new(points: usize, growth_rate: f64) -> Self {
        Self { points, growth_rate }
    }

    pub fn analytical_solution(&self, t: f64, y0: f64) -> f64 {
        y0 + self.growth_rate * t
    }
}

impl PhysicalModel for ConstantGrowth {
    fn points(&self) -> usize {
        self.points
    }

    fn compute_physics(&self, _state: &PhysicalState) -> PhysicalState {
        PhysicalState::new(
            PhysicalQuantity::Moles,
            PhysicalData::uniform_vector(self.points, self.growth_rate),
        )
    }

    fn setup_initial_state(&self) -> PhysicalState {
        PhysicalState::new(
            PhysicalQuantity::Moles,
            PhysicalData::uniform_vector(self.points, 0.0),
        )
    }

    fn name(&self) -> &str {
        "Constant Growth"
    }
}

// =================================================================================================
// Forced Oscillation: dy/dt = cos(ω t)
// =================================================================================================

/// Explicitly time-dependent model: dy/dt = cos(ω t)
///
/// Analytical solution: y(t) = sin(ω t) / ω. Only correct when the solver
/// stamps every stage with its own time.
pub struct ForcedOscillation {
    pub omega: f64,
}

impl ForcedOscillation {
    pub const QUANTITY: PhysicalQuantity = PhysicalQuantity::Custom("Displacement");

    pub fn new(omega: f64) -> Self {
        Self { omega }
    }

    pub fn analytical_solution(&self, t: f64) -> f64 {
        (self.omega * t).sin() / self.omega
    }
}

impl PhysicalModel for ForcedOscillation {
    fn points(&self) -> usize {
        1
    }

    fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
        PhysicalState::new(
            Self::QUANTITY,
            PhysicalData::from_scalar((self.omega * state.time()).cos()),
        )
    }

    fn setup_initial_state(&self) -> PhysicalState {
        PhysicalState::new(Self::QUANTITY, PhysicalData::from_scalar(0.0))
    }

    fn name(&self) -> &str {
        "Forced Oscillation"
    }
}

// =================================================================================================
// Tests for Mock Models
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_decay_analytical() {
        let model = ExponentialDecay::new(5, 0.5);

        assert!((model.analytical_solution(0.0, 1.0) - 1.0).abs() < 1e-10);

        // y(1) = exp(-0.5) ≈ 0.6065
        let y1 = model.analytical_solution(1.0, 1.0);
        assert!((y1 - 0.6065306597).abs() < 1e-6);
    }

    #[test]
    fn test_constant_growth_analytical() {
        let model = ConstantGrowth::new(5, 2.0);
        assert!((model.analytical_solution(5.0, 0.0) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_forced_oscillation_reads_time() {
        let model = ForcedOscillation::new(2.0);
        let state = model.setup_initial_state().at_time(std::f64::consts::PI / 2.0);
        let rate = model.compute_physics(&state);

        // cos(π) = -1
        let value = rate.get(ForcedOscillation::QUANTITY).unwrap().as_scalar();
        assert!((value + 1.0).abs() < 1e-12);
    }
}
