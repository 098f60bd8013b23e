//! Flux and flow derivation
//!
//! Converts the permeate-face flux into molar flows, clamps them to the
//! physically valid range, and closes the mass balance on the feed side.
//!
//! # Equations
//!
//! ```text
//! raw_i       = J_i · A
//! permeate_i  = min(max(raw_i, 0), 0.99 · F · x_i)
//! retentate_i = F · x_i - permeate_i
//! y_i         = retentate_i / Σ retentate
//! ```
//!
//! Where:
//! - **J_i** : permeate-face flux [mol/(m²·s)]
//! - **A** : membrane area [m²]
//! - **F** : feed molar flow [mol/s]
//! - **x_i** : feed mole fraction [-]
//!
//! The clamp guarantees `0 ≤ permeate_i ≤ 0.99·F·x_i`, so every retentate
//! component keeps at least one percent of its supply. When both species
//! sit at their ceiling (or the feed is empty) the composition is close to
//! a 0/0 ratio; [`FlowSplit::retentate_composition`] reports that as
//! [`MembraneError::DegenerateRetentate`] instead of returning NaN.

use crate::error::{MembraneError, Result};
use crate::models::species::{Species, SpeciesPair};
use crate::physics::{ClosedRange, Saturation};
use serde::{Deserialize, Serialize};

/// Fraction of each species' feed supply that may permeate
pub const PERMEATE_CEILING: f64 = 0.99;

/// Aggregate retentate flow below this fraction of the feed flow is degenerate
pub const DEGENERATE_FLOW_FRACTION: f64 = 1e-9;

/// Per-species flux at the permeate face [mol/(m²·s)]
///
/// Positive values point toward the permeate side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxSample {
    pub flux: SpeciesPair<f64>,
}

impl FluxSample {
    /// Raw permeate molar flow `J · A` [mol/s], before clamping
    pub fn raw_flow(&self, area: f64) -> SpeciesPair<f64> {
        self.flux.map(|_, j| j * area)
    }
}

/// Feed stream entering the retentate channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedStream {
    /// Total molar flow F [mol/s]
    pub flow: f64,
    /// Mole fractions x [-]
    pub fractions: SpeciesPair<f64>,
}

impl FeedStream {
    pub fn new(flow: f64, fractions: SpeciesPair<f64>) -> Self {
        Self { flow, fractions }
    }

    /// Supply of one species `F · x` [mol/s]
    pub fn component_flow(&self, species: Species) -> f64 {
        self.flow * self.fractions.get(species)
    }

    /// Valid interval for the permeate flow of one species
    pub fn permeate_range(&self, species: Species) -> ClosedRange {
        ClosedRange::non_negative(PERMEATE_CEILING * self.component_flow(species))
    }
}

/// Flow split between permeate and retentate at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSplit {
    /// Unclamped permeate flow [mol/s]
    pub raw_permeate: SpeciesPair<f64>,
    /// Permeate flow after clamping [mol/s]
    pub permeate: SpeciesPair<f64>,
    /// Retentate component flow [mol/s]
    pub retentate: SpeciesPair<f64>,
    /// Which clamp limit, if any, was active
    pub saturation: SpeciesPair<Saturation>,
}

impl FlowSplit {
    /// Derive the split from a flux sample
    ///
    /// # Example
    ///
    /// ```rust
    /// use membrane_rs::models::{FeedStream, FlowSplit, FluxSample, SpeciesPair};
    ///
    /// let feed = FeedStream::new(2e-4, SpeciesPair::new(0.21, 0.79));
    /// let sample = FluxSample { flux: SpeciesPair::new(1e-5, -1e-6) };
    /// let split = FlowSplit::derive(&sample, 1.0, &feed);
    ///
    /// assert_eq!(split.permeate.oxygen, 1e-5);
    /// assert_eq!(split.permeate.nitrogen, 0.0); // no back-permeation
    /// assert!((split.retentate.nitrogen - 2e-4 * 0.79).abs() < 1e-18);
    /// ```
    pub fn derive(sample: &FluxSample, area: f64, feed: &FeedStream) -> Self {
        let raw_permeate = sample.raw_flow(area);

        let saturation = raw_permeate.map(|s, &raw| feed.permeate_range(s).saturation(raw));
        let permeate = raw_permeate.map(|s, &raw| feed.permeate_range(s).clamp(raw));
        let retentate = permeate.map(|s, &p| feed.component_flow(s) - p);

        Self {
            raw_permeate,
            permeate,
            retentate,
            saturation,
        }
    }

    /// Total retentate flow [mol/s]
    pub fn aggregate_retentate(&self) -> f64 {
        self.retentate.total()
    }

    /// Total permeate flow [mol/s]
    pub fn aggregate_permeate(&self) -> f64 {
        self.permeate.total()
    }

    /// Whether the composition is too close to the 0/0 limit to be trusted
    ///
    /// True when both species are clamped at their ceiling, or the aggregate
    /// retentate flow is not above [`DEGENERATE_FLOW_FRACTION`] of the feed.
    pub fn is_degenerate(&self, feed: &FeedStream) -> bool {
        let both_ceiling = Species::ALL
            .iter()
            .all(|&s| *self.saturation.get(s) == Saturation::Upper);

        let aggregate = self.aggregate_retentate();
        let floor = DEGENERATE_FLOW_FRACTION * feed.flow.abs();

        both_ceiling || !aggregate.is_finite() || aggregate <= floor
    }

    /// Retentate mole fractions
    ///
    /// # Errors
    ///
    /// `DegenerateRetentate` when [`is_degenerate`](Self::is_degenerate) holds.
    pub fn retentate_composition(&self, feed: &FeedStream) -> Result<SpeciesPair<f64>> {
        if self.is_degenerate(feed) {
            return Err(MembraneError::DegenerateRetentate {
                aggregate_flow: self.aggregate_retentate(),
            });
        }

        let aggregate = self.aggregate_retentate();
        Ok(self.retentate.map(|_, flow| flow / aggregate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn feed() -> FeedStream {
        FeedStream::new(2e-4, SpeciesPair::new(0.21, 0.79))
    }

    fn split(o2: f64, n2: f64) -> FlowSplit {
        FlowSplit::derive(&FluxSample { flux: SpeciesPair::new(o2, n2) }, 1.0, &feed())
    }

    #[test]
    fn test_interior_flow_passes_through() {
        let split = split(1.7e-5, 1.46e-5);
        assert_eq!(split.permeate, split.raw_permeate);
        assert_eq!(split.saturation, SpeciesPair::new(Saturation::Interior, Saturation::Interior));
    }

    #[test]
    fn test_negative_flow_clamped_to_zero() {
        let split = split(-3e-6, -1e-6);
        assert_eq!(split.permeate, SpeciesPair::new(0.0, 0.0));
        assert_eq!(split.saturation.oxygen, Saturation::Lower);
        assert_relative_eq!(split.aggregate_retentate(), 2e-4);
    }

    #[test]
    fn test_flow_clamped_to_ceiling() {
        let split = split(1.0, 1e-5);
        assert_relative_eq!(split.permeate.oxygen, 0.99 * 2e-4 * 0.21);
        assert_relative_eq!(split.retentate.oxygen, 0.01 * 2e-4 * 0.21, max_relative = 1e-9);
        assert_eq!(split.saturation.oxygen, Saturation::Upper);
    }

    #[test]
    fn test_mass_balance_holds_in_every_regime() {
        let feed = feed();
        for (o2, n2) in [(1e-5, 1e-5), (-1.0, 2.0), (5.0, -5.0), (0.0, 0.0)] {
            let split = split(o2, n2);
            for species in Species::ALL {
                let balance = split.retentate.get(species) + split.permeate.get(species);
                assert_relative_eq!(balance, feed.component_flow(species), max_relative = 1e-12);
                assert!(feed.permeate_range(species).contains(*split.permeate.get(species)));
            }
        }
    }

    #[test]
    fn test_composition_sums_to_one() {
        let composition = split(1.7e-5, 1.46e-5).retentate_composition(&feed()).unwrap();
        assert_relative_eq!(composition.total(), 1.0, epsilon = 1e-12);
        assert!(composition.nitrogen > 0.79);
    }

    #[test]
    fn test_both_at_ceiling_is_degenerate() {
        let split = split(1.0, 1.0);
        assert!(split.is_degenerate(&feed()));

        let err = split.retentate_composition(&feed()).unwrap_err();
        match err {
            MembraneError::DegenerateRetentate { aggregate_flow } => {
                assert_relative_eq!(aggregate_flow, 0.01 * 2e-4, max_relative = 1e-9);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_single_ceiling_is_not_degenerate() {
        assert!(!split(1.0, 1e-5).is_degenerate(&feed()));
    }

    #[test]
    fn test_empty_feed_is_degenerate() {
        let empty = FeedStream::new(0.0, SpeciesPair::new(0.21, 0.79));
        let split = FlowSplit::derive(&FluxSample { flux: SpeciesPair::new(0.0, 0.0) }, 1.0, &empty);
        assert!(split.retentate_composition(&empty).is_err());
    }
}
