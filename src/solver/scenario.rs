//! Simulation scenario definition
//!
//! A scenario combines a physical model with its initial condition.

use crate::error::Result;
use crate::physics::traits::PhysicalModel;
use crate::solver::boundary::DomainBoundaries;

/// Simulation scenario
///
/// Defines a specific case to simulate:
/// - Physical model (equations)
/// - Initial condition (domain boundaries)
///
/// The same scenario can be solved with different numerical methods.
/// This is the "WHAT to solve" (not "HOW to solve").
pub struct Scenario {
    /// Physical model (equations)
    pub model: Box<dyn PhysicalModel>,

    /// Initial condition
    pub conditions: DomainBoundaries,
}

impl Scenario {
    /// Create a scenario
    pub fn new(model: Box<dyn PhysicalModel>, conditions: DomainBoundaries) -> Self {
        Self { model, conditions }
    }

    /// Scenario starting from the model's own initial state at t = 0
    pub fn from_model(model: Box<dyn PhysicalModel>) -> Self {
        let conditions = DomainBoundaries::temporal(model.setup_initial_state());
        Self::new(model, conditions)
    }

    /// Check the boundaries, then that the model accepts the initial state
    pub fn validate(&self) -> Result<()> {
        self.conditions.validate()?;

        if let Some(initial) = self.conditions.initial_condition() {
            self.model.check_state(initial)?;
        }

        Ok(())
    }

    /// Get model name
    pub fn get_model_name(&self) -> &str {
        self.model.name()
    }

    /// Time dependant equations
    pub fn is_time_dependent(&self) -> bool {
        self.conditions.is_time_dependent()
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.get_model_name())
            .field("points", &self.model.points())
            .field("start time", &self.conditions.start_time())
            .field("is time dependent", &self.is_time_dependent())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
