//! Temporal domain of a run
//!
//! The separator's spatial boundaries (the two membrane faces) belong to
//! the model: they are Dirichlet values re-evaluated from the feed pressure
//! at every stage. What the solver needs from the domain is the temporal
//! boundary: the initial state and the time it represents.

use crate::error::{MembraneError, Result};
use crate::physics::PhysicalState;

/// Initial condition of a time-dependent run
///
/// # Examples
///
/// ```rust
/// use membrane_rs::physics::{PhysicalData, PhysicalQuantity, PhysicalState};
/// use membrane_rs::solver::DomainBoundaries;
///
/// let initial = PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(0.0));
///
/// let fresh = DomainBoundaries::temporal(initial.clone());
/// assert_eq!(fresh.start_time(), 0.0);
///
/// // Continue a previous run from t = 30 s
/// let resumed = DomainBoundaries::resume(initial, 30.0);
/// assert_eq!(resumed.start_time(), 30.0);
/// assert!(resumed.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DomainBoundaries {
    /// State at `start_time`
    initial: Option<PhysicalState>,

    /// Time of the initial state (seconds)
    start_time: f64,
}

impl DomainBoundaries {
    // ====================================== Factory methods ======================================

    /// Initial state at t = 0
    pub fn temporal(initial: PhysicalState) -> Self {
        Self::resume(initial, 0.0)
    }

    /// Initial state at an arbitrary time, for continuing a previous run
    pub fn resume(initial: PhysicalState, start_time: f64) -> Self {
        Self {
            initial: Some(initial.at_time(start_time)),
            start_time,
        }
    }

    // ========================================= Accessors =========================================

    /// Initial state, stamped with the start time
    pub fn initial_condition(&self) -> Option<&PhysicalState> {
        self.initial.as_ref()
    }

    /// Time of the initial state (seconds)
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Whether an initial condition is present
    pub fn is_time_dependent(&self) -> bool {
        self.initial.is_some()
    }

    /// Validate the object contents
    pub fn validate(&self) -> Result<()> {
        if self.initial.is_none() {
            return Err(MembraneError::MissingInitialCondition);
        }

        if !self.start_time.is_finite() {
            return Err(MembraneError::configuration(
                "start_time",
                format!("must be finite, got {}", self.start_time),
            ));
        }

        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicalData, PhysicalQuantity};

    fn state() -> PhysicalState {
        PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(1.0))
    }

    #[test]
    fn test_temporal_stamps_time_zero() {
        let boundaries = DomainBoundaries::temporal(state().at_time(99.0));
        assert_eq!(boundaries.initial_condition().unwrap().time(), 0.0);
        assert!(boundaries.is_time_dependent());
    }

    #[test]
    fn test_resume_stamps_start_time() {
        let boundaries = DomainBoundaries::resume(state(), 12.0);
        assert_eq!(boundaries.initial_condition().unwrap().time(), 12.0);
    }

    #[test]
    fn test_default_has_no_initial_condition() {
        let boundaries = DomainBoundaries::default();
        assert!(!boundaries.is_time_dependent());
        assert!(matches!(boundaries.validate(), Err(MembraneError::MissingInitialCondition)));
    }

    #[test]
    fn test_non_finite_start_rejected() {
        let boundaries = DomainBoundaries::resume(state(), f64::NAN);
        assert!(boundaries.validate().is_err());
    }
}
