//! Membrane separator with accumulator tank and relief valve
//!
//! # System
//!
//! ```text
//!   feed P(t) ──► Henry faces ──► diffusion field ──► permeate flux
//!                                                         │
//!                                   flow split (clamped) ◄┘
//!                                         │ retentate N2
//!                                         ▼
//!                         tank moles ──► pressure ──► relief valve
//!                              ▲                          │
//!                              └──────── outflow ◄────────┘
//! ```
//!
//! # State layout
//!
//! | Quantity | Data | Meaning |
//! |---|---|---|
//! | `Concentration` | `N × 2` matrix | profile per species, rows 0 and N-1 pinned |
//! | `Moles` | scalar | N2 stored in the tank |
//!
//! Both quantities are integrated together. Everything else (face values,
//! fluxes, flows, tank pressure, valve outflow) is an algebraic function of
//! the state and the time, recomputed on every call to `compute_physics`.
//!
//! # Time
//!
//! The feed pressure is read from the signal at the time the solver writes
//! into the state metadata before each derivative evaluation.

use crate::config::{InitialProfile, SeparatorConfig};
use crate::error::{MembraneError, Result};
use crate::models::diffusion::{ConcentrationProfile, DiffusionField};
use crate::models::feed::PressureSignal;
use crate::models::flow::{FeedStream, FlowSplit};
use crate::models::henry::{BoundaryConcentrations, HenryBoundary};
use crate::models::species::{Species, SpeciesPair};
use crate::models::tank::Accumulator;
use crate::models::valve::ReliefValve;
use crate::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
use crate::solver::SimulationResult;
use log::warn;
use serde::Serialize;

/// Observable outputs at one time point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Simulation time [s]
    pub time: f64,
    /// Feed total pressure [Pa]
    pub feed_pressure: f64,
    /// Retentate O2 mole fraction [-]
    pub retentate_o2_fraction: f64,
    /// Retentate N2 mole fraction [-]
    pub retentate_n2_fraction: f64,
    /// Total retentate molar flow [mol/s]
    pub retentate_flow: f64,
    /// Clamped O2 permeate flow [mol/s]
    pub permeate_o2_flow: f64,
    /// Clamped N2 permeate flow [mol/s]
    pub permeate_n2_flow: f64,
    /// Tank pressure [Pa]
    pub tank_pressure: f64,
    /// Tank contents [mol]
    pub tank_moles: f64,
    /// Relief valve outflow [mol/s]
    pub valve_outflow: f64,
    /// The composition is carried over because the flow split was degenerate
    pub degenerate: bool,
}

impl Sample {
    /// Retentate mole fractions as a pair
    pub fn retentate_composition(&self) -> SpeciesPair<f64> {
        SpeciesPair::new(self.retentate_o2_fraction, self.retentate_n2_fraction)
    }
}

/// O2/N2 membrane separator feeding a vented accumulator
///
/// # Example
///
/// ```rust
/// use membrane_rs::config::SeparatorConfig;
/// use membrane_rs::models::{MembraneSeparator, PressureSignal};
/// use membrane_rs::physics::PhysicalModel;
///
/// let model = MembraneSeparator::from_config(
///     &SeparatorConfig::default(),
///     PressureSignal::constant(1e5),
/// ).unwrap();
///
/// assert_eq!(model.points(), 10);
/// let sample = model.observe(&model.setup_initial_state(), 0.0).unwrap();
/// assert_eq!(sample.tank_moles, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct MembraneSeparator {
    field: DiffusionField,
    boundary: HenryBoundary,
    feed: FeedStream,
    area: f64,
    tank: Accumulator,
    valve: ReliefValve,
    signal: PressureSignal,
    initial_profile: InitialProfile,
    initial_moles: f64,
}

impl MembraneSeparator {
    /// Build the separator from a validated configuration
    ///
    /// # Errors
    ///
    /// `Configuration` when any field is out of range; see
    /// [`SeparatorConfig::validate`].
    pub fn from_config(config: &SeparatorConfig, signal: PressureSignal) -> Result<Self> {
        config.validate()?;

        let field = DiffusionField::new(config.node_count, config.membrane_thickness, config.diffusivity)?;
        let tank = Accumulator::new(config.tank_volume, config.tank_temperature)?;
        let valve = ReliefValve::new(config.valve_coefficient, config.atmospheric_pressure)?;

        let boundary = HenryBoundary::new(
            config.solubility,
            config.feed_fractions,
            config.permeate_pressure,
            config.permeate_fractions,
        );

        Ok(Self {
            field,
            boundary,
            feed: FeedStream::new(config.feed_flow, config.feed_fractions),
            area: config.membrane_area,
            initial_moles: tank.moles_at(config.initial_tank_pressure),
            tank,
            valve,
            signal,
            initial_profile: config.initial_profile,
        })
    }

    // ==================== Accessors ====================

    pub fn field(&self) -> &DiffusionField {
        &self.field
    }

    pub fn boundary(&self) -> &HenryBoundary {
        &self.boundary
    }

    pub fn feed(&self) -> &FeedStream {
        &self.feed
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn tank(&self) -> &Accumulator {
        &self.tank
    }

    pub fn valve(&self) -> &ReliefValve {
        &self.valve
    }

    pub fn signal(&self) -> &PressureSignal {
        &self.signal
    }

    // ==================== Algebraic Relations ====================

    /// Face concentrations at time `t`
    pub fn faces_at(&self, t: f64) -> BoundaryConcentrations {
        self.boundary.concentrations(self.signal.evaluate(t))
    }

    /// Flow split for a profile and face values
    pub fn flow_split(&self, profile: &ConcentrationProfile, faces: &BoundaryConcentrations) -> FlowSplit {
        let flux = self.field.permeate_flux(profile, faces);
        FlowSplit::derive(&flux, self.area, &self.feed)
    }

    /// Flow split once the membrane has settled at `feed_pressure`
    pub fn steady_flow_split(&self, feed_pressure: f64) -> FlowSplit {
        let faces = self.boundary.concentrations(feed_pressure);
        let profile = self.field.steady_profile(&faces);
        self.flow_split(&profile, &faces)
    }

    /// Tank pressure at which the valve passes the steady retentate N2 flow [Pa]
    ///
    /// ```text
    /// P_tank = P_atm + (F·x_N2 - permeate_N2) / Cv
    /// ```
    pub fn steady_tank_pressure(&self, feed_pressure: f64) -> f64 {
        let split = self.steady_flow_split(feed_pressure);
        self.valve.balance_pressure(split.retentate.nitrogen)
    }

    // ==================== Observation ====================

    /// Observable outputs for `state` at time `t`
    ///
    /// A degenerate flow split reports the feed composition.
    ///
    /// # Errors
    ///
    /// `MissingQuantity` when the state lacks the concentration matrix or
    /// the tank moles.
    pub fn observe(&self, state: &PhysicalState, t: f64) -> Result<Sample> {
        self.observe_with_fallback(state, t, self.feed.fractions)
    }

    /// Observe every recorded state of a run
    ///
    /// Degenerate samples carry the composition of the last valid sample
    /// (the feed composition if none came before).
    pub fn observe_trajectory(&self, result: &SimulationResult) -> Result<Vec<Sample>> {
        let mut fallback = self.feed.fractions;
        let mut samples = Vec::with_capacity(result.len());

        for (state, &t) in result.state_trajectory.iter().zip(&result.time_points) {
            let sample = self.observe_with_fallback(state, t, fallback)?;
            if !sample.degenerate {
                fallback = sample.retentate_composition();
            }
            samples.push(sample);
        }

        Ok(samples)
    }

    fn observe_with_fallback(
        &self,
        state: &PhysicalState,
        t: f64,
        fallback: SpeciesPair<f64>,
    ) -> Result<Sample> {
        let profile = self.profile(state)?;
        let moles = self.moles(state)?;

        let feed_pressure = self.signal.evaluate(t);
        let faces = self.boundary.concentrations(feed_pressure);
        let split = self.flow_split(profile, &faces);

        let (composition, degenerate) = match split.retentate_composition(&self.feed) {
            Ok(composition) => (composition, false),
            Err(err) => {
                warn!("t = {} s: {}; reporting previous composition", t, err);
                (fallback, true)
            }
        };

        let tank_pressure = self.tank.pressure(moles);

        Ok(Sample {
            time: t,
            feed_pressure,
            retentate_o2_fraction: composition.oxygen,
            retentate_n2_fraction: composition.nitrogen,
            retentate_flow: split.aggregate_retentate(),
            permeate_o2_flow: split.permeate.oxygen,
            permeate_n2_flow: split.permeate.nitrogen,
            tank_pressure,
            tank_moles: moles,
            valve_outflow: self.valve.outflow(tank_pressure),
            degenerate,
        })
    }

    fn profile<'a>(&self, state: &'a PhysicalState) -> Result<&'a ConcentrationProfile> {
        state
            .get(PhysicalQuantity::Concentration)
            .and_then(PhysicalData::try_as_matrix)
            .ok_or_else(|| self.missing(PhysicalQuantity::Concentration))
    }

    fn moles(&self, state: &PhysicalState) -> Result<f64> {
        state
            .get(PhysicalQuantity::Moles)
            .and_then(PhysicalData::try_as_scalar)
            .ok_or_else(|| self.missing(PhysicalQuantity::Moles))
    }

    fn missing(&self, quantity: PhysicalQuantity) -> MembraneError {
        MembraneError::MissingQuantity {
            quantity: quantity.to_string(),
            model: self.name().to_string(),
        }
    }
}

impl PhysicalModel for MembraneSeparator {
    fn points(&self) -> usize {
        self.field.nodes()
    }

    /// Derivatives of the profiles and the tank moles
    ///
    /// # Panics
    ///
    /// Panics when the state does not pass [`check_state`](PhysicalModel::check_state).
    fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
        let t = state.time();
        let faces = self.faces_at(t);

        let profile = state
            .get(PhysicalQuantity::Concentration)
            .and_then(PhysicalData::try_as_matrix)
            .expect("MembraneSeparator::compute_physics: state must contain a Concentration matrix");
        let moles = state
            .get(PhysicalQuantity::Moles)
            .and_then(PhysicalData::try_as_scalar)
            .expect("MembraneSeparator::compute_physics: state must contain scalar Moles");

        // ====== Membrane ======
        let dc_dt = self.field.derivative(profile, &faces);

        // ====== Tank and valve ======
        let split = self.flow_split(profile, &faces);
        let outflow = self.valve.outflow(self.tank.pressure(moles));
        let dn_dt = self.tank.net_inflow(split.retentate.nitrogen, outflow);

        PhysicalState::new(PhysicalQuantity::Concentration, PhysicalData::from_matrix(dc_dt))
            .with(PhysicalQuantity::Moles, PhysicalData::from_scalar(dn_dt))
    }

    fn setup_initial_state(&self) -> PhysicalState {
        let faces = self.faces_at(0.0);

        let profile = match self.initial_profile {
            InitialProfile::Empty => {
                let mut profile = self.field.zero_profile();
                self.field.apply_dirichlet(&mut profile, &faces);
                profile
            }
            InitialProfile::Steady => self.field.steady_profile(&faces),
        };

        PhysicalState::new(PhysicalQuantity::Concentration, PhysicalData::from_matrix(profile))
            .with(PhysicalQuantity::Moles, PhysicalData::from_scalar(self.initial_moles))
            .at_time(0.0)
    }

    fn enforce_constraints(&self, state: &mut PhysicalState, time: f64) {
        let faces = self.faces_at(time);
        if let Some(profile) = state
            .get_mut(PhysicalQuantity::Concentration)
            .and_then(PhysicalData::try_as_matrix_mut)
        {
            self.field.apply_dirichlet(profile, &faces);
        }
    }

    fn check_state(&self, state: &PhysicalState) -> Result<()> {
        let profile = self.profile(state)?;
        if !self.field.matches(profile) {
            return Err(MembraneError::configuration(
                "initial_state",
                format!(
                    "concentration matrix is {}x{}, expected {}x{}",
                    profile.nrows(),
                    profile.ncols(),
                    self.field.nodes(),
                    Species::ALL.len()
                ),
            ));
        }
        self.moles(state)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "Membrane Separator"
    }

    fn description(&self) -> Option<&str> {
        Some("O2/N2 membrane diffusion with accumulator tank and relief valve")
    }
}

// =================================================================================================
// Tests
// =================================================================================================
