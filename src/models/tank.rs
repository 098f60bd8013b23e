//! Accumulator tank
//!
//! The retained nitrogen is collected in a rigid, isothermal vessel:
//!
//! ```text
//! dn/dt = Q_in - Q_valve
//! P     = n · R · T / V
//! ```
//!
//! Only the moles are integrated; the pressure is always derived.

use crate::error::{MembraneError, Result};

/// Universal gas constant [J/(mol·K)]
pub const GAS_CONSTANT: f64 = 8.314462618;

/// Rigid isothermal gas accumulator
///
/// ```rust
/// use membrane_rs::models::Accumulator;
///
/// let tank = Accumulator::new(1e-4, 298.15).unwrap();
/// let n = tank.moles_at(101_325.0);
/// assert!((tank.pressure(n) - 101_325.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accumulator {
    volume: f64,
    temperature: f64,
}

impl Accumulator {
    /// # Arguments
    ///
    /// * `volume` - Tank volume V [m³] (positive)
    /// * `temperature` - Gas temperature T [K] (positive)
    pub fn new(volume: f64, temperature: f64) -> Result<Self> {
        if !(volume.is_finite() && volume > 0.0) {
            return Err(MembraneError::configuration(
                "tank_volume",
                format!("must be positive, got {} m³", volume),
            ));
        }
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(MembraneError::configuration(
                "tank_temperature",
                format!("must be positive, got {} K", temperature),
            ));
        }

        Ok(Self { volume, temperature })
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Ideal-gas pressure for `moles` [Pa]
    #[inline]
    pub fn pressure(&self, moles: f64) -> f64 {
        moles * GAS_CONSTANT * self.temperature / self.volume
    }

    /// Moles needed to reach `pressure` [mol]
    pub fn moles_at(&self, pressure: f64) -> f64 {
        pressure * self.volume / (GAS_CONSTANT * self.temperature)
    }

    /// Net molar inflow `dn/dt` [mol/s]
    #[inline]
    pub fn net_inflow(&self, inflow: f64, outflow: f64) -> f64 {
        inflow - outflow
    }
}
