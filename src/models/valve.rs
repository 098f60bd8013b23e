//! Pressure-relief valve
//!
//! Linear flow law with a dead band below atmospheric pressure:
//!
//! ```text
//! Q = Cv · max(P - P_atm, 0)
//! ```
//!
//! The outflow is continuous in P, but its derivative jumps from 0 to Cv at
//! the crossover. Fixed-step integrators step over the kink; the adaptive
//! integrator shrinks its step there.

use crate::error::{MembraneError, Result};

/// Dead-banded relief valve venting to atmosphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliefValve {
    coefficient: f64,
    atmospheric_pressure: f64,
}

impl ReliefValve {
    /// # Arguments
    ///
    /// * `coefficient` - Flow coefficient Cv [mol/(s·Pa)] (non-negative)
    /// * `atmospheric_pressure` - Downstream pressure P_atm [Pa] (non-negative)
    pub fn new(coefficient: f64, atmospheric_pressure: f64) -> Result<Self> {
        if !(coefficient.is_finite() && coefficient >= 0.0) {
            return Err(MembraneError::configuration(
                "valve_coefficient",
                format!("must be non-negative, got {} mol/(s·Pa)", coefficient),
            ));
        }
        if !(atmospheric_pressure.is_finite() && atmospheric_pressure >= 0.0) {
            return Err(MembraneError::configuration(
                "atmospheric_pressure",
                format!("must be non-negative, got {} Pa", atmospheric_pressure),
            ));
        }

        Ok(Self {
            coefficient,
            atmospheric_pressure,
        })
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn atmospheric_pressure(&self) -> f64 {
        self.atmospheric_pressure
    }

    /// Molar outflow at tank pressure `pressure` [mol/s]
    ///
    /// ```rust
    /// use membrane_rs::models::ReliefValve;
    ///
    /// let valve = ReliefValve::new(1e-8, 101_325.0).unwrap();
    /// assert_eq!(valve.outflow(90_000.0), 0.0);
    /// assert!((valve.outflow(111_325.0) - 1e-4).abs() < 1e-15);
    /// ```
    #[inline]
    pub fn outflow(&self, pressure: f64) -> f64 {
        self.coefficient * (pressure - self.atmospheric_pressure).max(0.0)
    }

    /// Whether the valve is venting at `pressure`
    pub fn is_open(&self, pressure: f64) -> bool {
        pressure > self.atmospheric_pressure
    }

    /// Tank pressure at which the outflow equals `inflow` [Pa]
    ///
    /// Infinite when the valve cannot pass any flow; atmospheric when the
    /// inflow is not positive.
    pub fn balance_pressure(&self, inflow: f64) -> f64 {
        if inflow <= 0.0 {
            self.atmospheric_pressure
        } else if self.coefficient > 0.0 {
            self.atmospheric_pressure + inflow / self.coefficient
        } else {
            f64::INFINITY
        }
    }
}
