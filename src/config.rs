//! Run configuration
//!
//! All values are SI. Every field documents its unit; nothing is inferred
//! from naming. Configurations are plain serde structures read from JSON,
//! with [`Default`] supplying the reference parameter set.
//!
//! Validation is fail-fast: [`SimulationConfig::validate`] rejects every
//! out-of-range value before a model is built, with the offending field
//! named in the [`MembraneError::Configuration`] it returns.
//!
//! # Example
//!
//! ```rust
//! use membrane_rs::config::{IntegratorConfig, SimulationConfig};
//!
//! let config = SimulationConfig::from_json_str(r#"{
//!     "end_time": 60.0,
//!     "integrator": { "method": "euler", "steps": 6000 },
//!     "separator": { "node_count": 12 }
//! }"#).unwrap();
//!
//! assert_eq!(config.separator.node_count, 12);
//! assert_eq!(config.separator.feed_flow, 2e-4); // default kept
//! assert!(matches!(config.integrator, IntegratorConfig::Euler { steps: 6000 }));
//! ```

use crate::error::{MembraneError, Result};
use crate::models::diffusion::MIN_NODES;
use crate::models::{PressureSignal, Species, SpeciesPair};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mole fractions must sum to one within this tolerance
pub const FRACTION_SUM_TOLERANCE: f64 = 1e-6;

// =================================================================================================
// Separator
// =================================================================================================

/// Initial concentration profile inside the membrane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialProfile {
    /// Interior nodes start at zero, faces at equilibrium
    #[default]
    Empty,
    /// Linear profile between the faces at t = 0
    Steady,
}

/// Physical parameters of the separator, tank and valve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorConfig {
    /// Feed molar flow F [mol/s]
    pub feed_flow: f64,
    /// Feed mole fractions [-]
    pub feed_fractions: SpeciesPair<f64>,
    /// Permeate-side total pressure [Pa]
    pub permeate_pressure: f64,
    /// Permeate-side mole fractions [-]
    pub permeate_fractions: SpeciesPair<f64>,
    /// Membrane area A [m²]
    pub membrane_area: f64,
    /// Membrane thickness L [m]
    pub membrane_thickness: f64,
    /// Diffusivity D per species [m²/s]
    pub diffusivity: SpeciesPair<f64>,
    /// Henry solubility S per species [mol/(m³·Pa)]
    pub solubility: SpeciesPair<f64>,
    /// Grid nodes across the thickness, at least 3 [-]
    pub node_count: usize,
    /// Tank volume V [m³]
    pub tank_volume: f64,
    /// Tank temperature T [K]
    pub tank_temperature: f64,
    /// Relief valve coefficient Cv [mol/(s·Pa)]
    pub valve_coefficient: f64,
    /// Valve discharge pressure [Pa]
    pub atmospheric_pressure: f64,
    /// Tank pressure at t = 0 [Pa]
    pub initial_tank_pressure: f64,
    /// Membrane profile at t = 0
    pub initial_profile: InitialProfile,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            feed_flow: 2e-4,
            feed_fractions: SpeciesPair::new(0.21, 0.79),
            permeate_pressure: 1e4,
            permeate_fractions: SpeciesPair::new(0.4, 0.6),
            membrane_area: 1.0,
            membrane_thickness: 1e-5,
            diffusivity: SpeciesPair::new(5e-11, 2.5e-11),
            solubility: SpeciesPair::new(2e-4, 8e-5),
            node_count: 10,
            tank_volume: 1e-4,
            tank_temperature: 298.15,
            valve_coefficient: 1e-8,
            atmospheric_pressure: 101_325.0,
            initial_tank_pressure: 0.0,
            initial_profile: InitialProfile::Empty,
        }
    }
}

impl SeparatorConfig {
    /// Check every field against its physical range
    pub fn validate(&self) -> Result<()> {
        if self.node_count < MIN_NODES {
            return Err(MembraneError::configuration(
                "node_count",
                format!("need at least {} grid nodes, got {}", MIN_NODES, self.node_count),
            ));
        }

        positive("membrane_thickness", self.membrane_thickness)?;
        positive("membrane_area", self.membrane_area)?;
        positive("tank_volume", self.tank_volume)?;
        positive("tank_temperature", self.tank_temperature)?;

        non_negative("feed_flow", self.feed_flow)?;
        non_negative("permeate_pressure", self.permeate_pressure)?;
        non_negative("valve_coefficient", self.valve_coefficient)?;
        non_negative("atmospheric_pressure", self.atmospheric_pressure)?;
        non_negative("initial_tank_pressure", self.initial_tank_pressure)?;

        for species in Species::ALL {
            non_negative(&format!("diffusivity.{}", species), *self.diffusivity.get(species))?;
            non_negative(&format!("solubility.{}", species), *self.solubility.get(species))?;
        }

        fractions("feed_fractions", &self.feed_fractions)?;
        fractions("permeate_fractions", &self.permeate_fractions)?;

        Ok(())
    }
}

// =================================================================================================
// Feed signal
// =================================================================================================

/// Serializable feed pressure history
///
/// Converted into a [`PressureSignal`] with [`FeedSignalConfig::to_signal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedSignalConfig {
    /// Constant pressure [Pa]
    Constant { pressure: f64 },
    /// `base` [Pa] until `start` [s], then `base + height` [Pa]
    Step { start: f64, base: f64, height: f64 },
    /// Linear change of `height` [Pa] over `duration` [s] from `start` [s]
    Ramp {
        start: f64,
        duration: f64,
        base: f64,
        height: f64,
    },
}

impl Default for FeedSignalConfig {
    fn default() -> Self {
        Self::Step {
            start: 5.0,
            base: 1e5,
            height: 5e4,
        }
    }
}

impl FeedSignalConfig {
    /// Build the runtime signal
    pub fn to_signal(&self) -> PressureSignal {
        match *self {
            Self::Constant { pressure } => PressureSignal::constant(pressure),
            Self::Step { start, base, height } => PressureSignal::step(start, base, height),
            Self::Ramp { start, duration, base, height } => {
                PressureSignal::ramp(start, duration, base, height)
            }
        }
    }

    /// Pressures must stay non-negative over the whole history
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Constant { pressure } => non_negative("feed.pressure", pressure),
            Self::Step { start, base, height } => {
                finite("feed.start", start)?;
                non_negative("feed.base", base)?;
                non_negative("feed.base + feed.height", base + height)
            }
            Self::Ramp { start, duration, base, height } => {
                finite("feed.start", start)?;
                non_negative("feed.duration", duration)?;
                non_negative("feed.base", base)?;
                non_negative("feed.base + feed.height", base + height)
            }
        }
    }
}

// =================================================================================================
// Integrator
// =================================================================================================

/// Time integration method and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum IntegratorConfig {
    /// Forward Euler with a fixed number of steps
    Euler { steps: usize },
    /// Classical Runge-Kutta with a fixed number of steps
    Rk4 { steps: usize },
    /// Dormand-Prince 5(4) with step-size control
    DormandPrince {
        /// Relative tolerance [-]
        rtol: f64,
        /// Absolute tolerance [state units]
        atol: f64,
        /// First trial step [s]
        initial_step: f64,
        /// Largest allowed step [s]
        max_step: f64,
    },
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self::Rk4 { steps: 10_000 }
    }
}

impl IntegratorConfig {
    /// Short method name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Euler { .. } => "euler",
            Self::Rk4 { .. } => "rk4",
            Self::DormandPrince { .. } => "dormand_prince",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Euler { steps } | Self::Rk4 { steps } => {
                if steps == 0 {
                    return Err(MembraneError::configuration(
                        "integrator.steps",
                        "must be greater than 0",
                    ));
                }
                Ok(())
            }
            Self::DormandPrince { rtol, atol, initial_step, max_step } => {
                positive("integrator.rtol", rtol)?;
                positive("integrator.atol", atol)?;
                positive("integrator.initial_step", initial_step)?;
                positive("integrator.max_step", max_step)?;
                if initial_step > max_step {
                    return Err(MembraneError::configuration(
                        "integrator.initial_step",
                        format!("{} s exceeds max_step {} s", initial_step, max_step),
                    ));
                }
                Ok(())
            }
        }
    }
}

// =================================================================================================
// Simulation
// =================================================================================================

/// Everything needed for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub separator: SeparatorConfig,
    pub feed: FeedSignalConfig,
    /// Simulated time [s]
    pub end_time: f64,
    pub integrator: IntegratorConfig,
    /// Keep every n-th accepted step in the trajectory (at least 1)
    pub record_every: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            separator: SeparatorConfig::default(),
            feed: FeedSignalConfig::default(),
            end_time: 100.0,
            integrator: IntegratorConfig::default(),
            record_every: 1,
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.separator.validate()?;
        self.feed.validate()?;
        self.integrator.validate()?;
        positive("end_time", self.end_time)?;

        if self.record_every == 0 {
            return Err(MembraneError::configuration("record_every", "must be at least 1"));
        }

        Ok(())
    }
}

// =================================================================================================
// Range checks
// =================================================================================================

fn finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MembraneError::configuration(field, format!("must be finite, got {}", value)))
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MembraneError::configuration(field, format!("must be positive, got {}", value)))
    }
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MembraneError::configuration(field, format!("must be non-negative, got {}", value)))
    }
}

fn fractions(field: &str, pair: &SpeciesPair<f64>) -> Result<()> {
    for species in Species::ALL {
        let y = *pair.get(species);
        if !(y.is_finite() && (0.0..=1.0).contains(&y)) {
            return Err(MembraneError::configuration(
                format!("{}.{}", field, species),
                format!("mole fraction must lie in [0, 1], got {}", y),
            ));
        }
    }

    let sum = pair.total();
    if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
        return Err(MembraneError::configuration(
            field,
            format!("mole fractions must sum to 1, got {}", sum),
        ));
    }

    Ok(())
}
