//! Henry's-law boundary model
//!
//! # Mathematical Background
//!
//! At each face of the membrane the dissolved concentration is in
//! equilibrium with the gas above it:
//!
//! ```text
//! C_face = S · p_partial
//! p_partial = P_total · y
//! ```
//!
//! Where:
//! - **S** : solubility of the species in the polymer [mol/(m³·Pa)]
//! - **P_total** : total pressure on that side [Pa]
//! - **y** : mole fraction of the species on that side [-]
//!
//! The feed side total pressure varies with time; the permeate side
//! pressure and all mole fractions are fixed for a run. The evaluation is
//! a pure function with no error path: negative pressures pass straight
//! through (configuration validation rejects them upstream).

use crate::models::species::SpeciesPair;

/// Partial pressures on both faces [Pa]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryState {
    /// Feed-side partial pressure per species [Pa]
    pub feed: SpeciesPair<f64>,
    /// Permeate-side partial pressure per species [Pa]
    pub permeate: SpeciesPair<f64>,
}

/// Equilibrium concentrations pinned at the two faces [mol/m³]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryConcentrations {
    /// Node 0 (feed face)
    pub feed: SpeciesPair<f64>,
    /// Node N-1 (permeate face)
    pub permeate: SpeciesPair<f64>,
}

/// Henry's-law equilibrium at the membrane faces
///
/// # Example
///
/// ```rust
/// use membrane_rs::models::{HenryBoundary, SpeciesPair};
///
/// let boundary = HenryBoundary::new(
///     SpeciesPair::new(2e-4, 8e-5),    // S [mol/(m³·Pa)]
///     SpeciesPair::new(0.21, 0.79),    // feed mole fractions
///     1e4,                             // permeate pressure [Pa]
///     SpeciesPair::new(0.4, 0.6),      // permeate mole fractions
/// );
///
/// let faces = boundary.concentrations(1e5);
/// assert!((faces.feed.oxygen - 2e-4 * 21_000.0).abs() < 1e-9);
/// assert!((faces.permeate.nitrogen - 8e-5 * 6_000.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HenryBoundary {
    solubility: SpeciesPair<f64>,
    feed_fractions: SpeciesPair<f64>,
    permeate_pressure: f64,
    permeate_fractions: SpeciesPair<f64>,
}

impl HenryBoundary {
    /// Create the boundary model
    ///
    /// # Arguments
    ///
    /// * `solubility` - Henry constants S [mol/(m³·Pa)]
    /// * `feed_fractions` - Feed mole fractions [-]
    /// * `permeate_pressure` - Permeate total pressure [Pa]
    /// * `permeate_fractions` - Permeate mole fractions [-]
    pub fn new(
        solubility: SpeciesPair<f64>,
        feed_fractions: SpeciesPair<f64>,
        permeate_pressure: f64,
        permeate_fractions: SpeciesPair<f64>,
    ) -> Self {
        Self {
            solubility,
            feed_fractions,
            permeate_pressure,
            permeate_fractions,
        }
    }

    /// Solubility constants [mol/(m³·Pa)]
    pub fn solubility(&self) -> &SpeciesPair<f64> {
        &self.solubility
    }

    /// Feed mole fractions [-]
    pub fn feed_fractions(&self) -> &SpeciesPair<f64> {
        &self.feed_fractions
    }

    /// Partial pressures on both faces for a feed total pressure [Pa]
    pub fn partial_pressures(&self, feed_pressure: f64) -> BoundaryState {
        BoundaryState {
            feed: self.feed_fractions.map(|_, y| feed_pressure * y),
            permeate: self.permeate_fractions.map(|_, y| self.permeate_pressure * y),
        }
    }

    /// Equilibrium concentrations on both faces [mol/m³]
    pub fn concentrations(&self, feed_pressure: f64) -> BoundaryConcentrations {
        let pressures = self.partial_pressures(feed_pressure);

        BoundaryConcentrations {
            feed: pressures.feed.map(|s, p| self.solubility.get(s) * p),
            permeate: pressures.permeate.map(|s, p| self.solubility.get(s) * p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn boundary() -> HenryBoundary {
        HenryBoundary::new(
            SpeciesPair::new(2e-4, 8e-5),
            SpeciesPair::new(0.21, 0.79),
            1e4,
            SpeciesPair::new(0.4, 0.6),
        )
    }

    #[test]
    fn test_partial_pressures() {
        let state = boundary().partial_pressures(1e5);
        assert_relative_eq!(state.feed.oxygen, 21_000.0);
        assert_relative_eq!(state.feed.nitrogen, 79_000.0);
        assert_relative_eq!(state.permeate.oxygen, 4_000.0);
        assert_relative_eq!(state.permeate.nitrogen, 6_000.0);
    }

    #[test]
    fn test_concentrations_scale_linearly_with_feed_pressure() {
        let model = boundary();
        let low = model.concentrations(1e5);
        let high = model.concentrations(2e5);

        assert_relative_eq!(high.feed.oxygen, 2.0 * low.feed.oxygen);
        assert_relative_eq!(high.feed.nitrogen, 2.0 * low.feed.nitrogen);
        // Permeate side does not depend on the feed
        assert_eq!(high.permeate, low.permeate);
    }

    #[test]
    fn test_negative_pressure_is_not_guarded() {
        let faces = boundary().concentrations(-1e5);
        assert!(faces.feed.oxygen < 0.0);
    }
}
