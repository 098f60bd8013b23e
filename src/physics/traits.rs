//! Physical models traits and types
//!
//! This module defines the core API for physical models:
//! - `PhysicalModel`: trait for all physical models
//! - `PhysicalState`: flexible state container
//! - `PhysicalQuantity`: type-safe quantity identifiers

use crate::error::Result;
use crate::physics::PhysicalData;
use std::collections::HashMap;
use std::fmt;

/// Metadata key under which solvers store the current (stage) time
pub const TIME_KEY: &str = "time";

// =================================================================================================
// Physical quantities (Type-safe Identifiers)
// =================================================================================================

/// Known physical quantities (type-safe enum)
///
/// If you need a quantity not listed here, use `Custom` rather than a
/// free-form string so that lookups stay type-checked.
///
/// # Example
/// ```
/// use membrane_rs::physics::{PhysicalQuantity, PhysicalState, PhysicalData};
///
/// let pressure = PhysicalQuantity::Custom("Pressure");
/// let mut state = PhysicalState::empty();
/// state.set(pressure, PhysicalData::from_scalar(1e5));
/// assert!(state.get(pressure).is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhysicalQuantity {
    /// Dissolved gas concentration in the membrane (mol/m³)
    Concentration,

    /// Amount of gas held in a lumped volume (mol)
    Moles,

    /// Custom quantity (for use extension)
    Custom(&'static str),
}

impl fmt::Display for PhysicalQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalQuantity::Concentration => write!(f, "Concentration"),
            PhysicalQuantity::Moles => write!(f, "Moles"),
            PhysicalQuantity::Custom(name) => write!(f, "{}", name),
        }
    }
}

// =================================================================================================
// Physical State (Flexible State Container)
// =================================================================================================

/// Physical state of the system
///
/// This structure contains all physical quantities at a given time.
/// The membrane separator stores its concentration profiles and its tank
/// moles side by side, so that one integrator advances both in lockstep.
///
/// # Example
/// ```
/// use membrane_rs::physics::{PhysicalData, PhysicalQuantity, PhysicalState};
///
/// let mut state = PhysicalState::new(
///     PhysicalQuantity::Concentration,
///     PhysicalData::uniform_matrix(10, 2, 0.0),
/// );
/// state.set(PhysicalQuantity::Moles, PhysicalData::from_scalar(0.0));
/// assert_eq!(state.available_quantities().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalState {
    /// Physical quantities stored in a dictionary
    quantities: HashMap<PhysicalQuantity, PhysicalData>,

    /// Scalar metadata (time, diagnostics)
    metadata: HashMap<String, f64>,
}

impl PhysicalState {
    /// Create a new state with primary quantity
    pub fn new(quantity: PhysicalQuantity, value: PhysicalData) -> Self {
        let mut quantities = HashMap::new();
        quantities.insert(quantity, value);

        Self {
            quantities,
            metadata: HashMap::new(),
        }
    }

    /// Create an empty state
    pub fn empty() -> Self {
        Self {
            quantities: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Builder: add a quantity
    pub fn with(mut self, quantity: PhysicalQuantity, value: PhysicalData) -> Self {
        self.set(quantity, value);
        self
    }

    /// Get a quantity by type
    pub fn get(&self, quantity: PhysicalQuantity) -> Option<&PhysicalData> {
        self.quantities.get(&quantity)
    }

    /// Get mutable reference to a quantity
    pub fn get_mut(&mut self, quantity: PhysicalQuantity) -> Option<&mut PhysicalData> {
        self.quantities.get_mut(&quantity)
    }

    /// Set a quantity
    pub fn set(&mut self, quantity: PhysicalQuantity, value: PhysicalData) {
        self.quantities.insert(quantity, value);
    }

    /// List of available physical state quantities, in a stable order
    pub fn available_quantities(&self) -> Vec<PhysicalQuantity> {
        let mut keys: Vec<_> = self.quantities.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Iterate over quantities and their data
    pub fn iter(&self) -> impl Iterator<Item = (&PhysicalQuantity, &PhysicalData)> {
        self.quantities.iter()
    }

    /// Get a metadata
    pub fn get_metadata(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).copied()
    }

    /// Set a metadata
    pub fn set_metadata(&mut self, key: String, value: f64) {
        self.metadata.insert(key, value);
    }

    /// Time stored by the solver, 0 when absent
    pub fn time(&self) -> f64 {
        self.get_metadata(TIME_KEY).unwrap_or(0.0)
    }

    /// Store the current time
    pub fn set_time(&mut self, time: f64) {
        self.set_metadata(TIME_KEY.to_string(), time);
    }

    /// Same state, stamped with `time`
    pub fn at_time(mut self, time: f64) -> Self {
        self.set_time(time);
        self
    }
}

// Operator overloading for numerical operations

impl std::ops::Add for PhysicalState {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        for (quantity, value) in rhs.quantities {
            if let Some(existing_value) = self.quantities.remove(&quantity) {
                self.quantities.insert(quantity, existing_value + value);
            } else {
                self.quantities.insert(quantity, value);
            }
        }
        self
    }
}

impl std::ops::Mul<f64> for PhysicalState {

    type Output = Self;
    fn mul(mut self, scalar: f64) -> Self::Output {
        for data in self.quantities.values_mut() {
            let taken = std::mem::replace(data, PhysicalData::Scalar(0.0));
            *data = taken * scalar;
        }
        self
    }
}

// ==================================================================================================
// Physical Model Trait
// =================================================================================================

/// Trait for physical models
///
/// # Responsibility
/// Computes the right-hand side of the model equations at a given state.
/// Does NOT integrate them (that's the Solver's job).
///
/// The model provides the "physics" (equations), the Solver provides
/// the "numerics" (method to advance them).
pub trait PhysicalModel: Send + Sync {

    /// Number of spatial points
    ///
    /// Used by the solver to allocate vectors
    fn points(&self) -> usize;

    /// Computes the time derivative at a given state
    ///
    /// # Arguments
    /// * `state` - Current physical state, with the stage time stored in
    ///   metadata under [`TIME_KEY`]
    ///
    /// # Returns
    /// A state with the same quantities, holding dy/dt for each of them.
    ///
    /// # Note
    /// Evaluation is a pure read of `state`: algebraic quantities
    /// (boundary values, fluxes, valve outflow) are recomputed here from
    /// the state and the time, never stored back.
    fn compute_physics(&self, state: &PhysicalState) -> PhysicalState;

    /// Creates the initial state for this physical model
    fn setup_initial_state(&self) -> PhysicalState;

    /// Re-impose the algebraic parts of the state after a step
    ///
    /// Called by every solver on the initial state and after each accepted
    /// step, with the time the state now represents. Models with Dirichlet
    /// nodes overwrite them here. Default: nothing to do.
    fn enforce_constraints(&self, _state: &mut PhysicalState, _time: f64) {}

    /// Check that `state` has the quantities and shapes this model reads
    ///
    /// Solvers call this once on the initial condition, so that
    /// `compute_physics` can rely on the layout afterwards.
    fn check_state(&self, _state: &PhysicalState) -> Result<()> {
        Ok(())
    }

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&str> {
        None
    }
}

// =================================================================================================
// Tests
// =================================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_physical_state() {
        let physics = PhysicalState::empty();

        assert_eq!(physics.quantities.len(), 0);
        assert_eq!(physics.metadata.len(), 0);
        assert_eq!(physics.time(), 0.0);
    }

    #[test]
    fn test_new_physical_state() {
        let quantity = PhysicalQuantity::Custom("Tesla");
        let physics = PhysicalState::new(quantity, PhysicalData::from_vec(vec![1.0, 2.0]));

        assert_eq!(physics.quantities.len(), 1);
        assert!(physics.available_quantities().contains(&quantity));
        assert_eq!(physics.get(quantity).unwrap().len(), 2);
    }

    #[test]
    fn test_time_metadata() {
        let state = PhysicalState::empty().at_time(12.5);
        assert_eq!(state.time(), 12.5);
        assert_eq!(state.get_metadata(TIME_KEY), Some(12.5));
    }

    #[test]
    fn test_addition_mixed_quantities() {
        let state_one = PhysicalState::new(
            PhysicalQuantity::Concentration,
            PhysicalData::uniform_matrix(3, 2, 1.0),
        )
        .with(PhysicalQuantity::Moles, PhysicalData::from_scalar(2.0));

        let state_two = PhysicalState::new(
            PhysicalQuantity::Concentration,
            PhysicalData::uniform_matrix(3, 2, 0.5),
        )
        .with(PhysicalQuantity::Moles, PhysicalData::from_scalar(-0.5));

        let sum = state_one + state_two;

        assert_eq!(sum.get(PhysicalQuantity::Concentration).unwrap().as_matrix()[(2, 1)], 1.5);
        assert_eq!(sum.get(PhysicalQuantity::Moles).unwrap().as_scalar(), 1.5);
    }

    #[test]
    fn test_addition_keeps_left_metadata() {
        let left = PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(1.0))
            .at_time(3.0);
        let right = PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(1.0))
            .at_time(99.0);

        assert_eq!((left + right).time(), 3.0);
    }

    #[test]
    fn test_multiplication() {
        let state = PhysicalState::new(
            PhysicalQuantity::Concentration,
            PhysicalData::from_vec(vec![1.0, 2.0]),
        ) * 10.0;

        let values = state.get(PhysicalQuantity::Concentration).unwrap().as_vector();
        assert_eq!(values[0], 10.0);
        assert_eq!(values[1], 20.0);
    }

    #[test]
    fn test_available_quantities_sorted() {
        let state = PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(0.0))
            .with(PhysicalQuantity::Concentration, PhysicalData::from_scalar(0.0));

        assert_eq!(
            state.available_quantities(),
            vec![PhysicalQuantity::Concentration, PhysicalQuantity::Moles]
        );
    }

    #[test]
    fn test_quantity_display() {
        assert_eq!(PhysicalQuantity::Moles.to_string(), "Moles");
        assert_eq!(PhysicalQuantity::Custom("Tracer").to_string(), "Tracer");
    }
}
