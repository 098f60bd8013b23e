//! Error types for the membrane separator simulator.
//!
//! A single error enum, [`MembraneError`], covers configuration problems
//! detected before integration starts, degenerate flow states met while
//! observing a run, and numerical failures that abort a run.

use thiserror::Error;

/// Result type alias using [`MembraneError`].
pub type Result<T> = std::result::Result<T, MembraneError>;

/// Unified error type for all simulator operations.
#[derive(Error, Debug)]
pub enum MembraneError {
    // ============ Setup Errors ============
    /// A configuration value is missing, out of range or inconsistent.
    ///
    /// Raised before any integration step is taken.
    #[error("Invalid configuration for '{field}': {message}")]
    Configuration { field: String, message: String },

    /// The solver configuration does not match what the solver can do
    #[error("{solver} does not support {requested} configuration")]
    UnsupportedSolverType { solver: String, requested: String },

    /// The scenario carries no initial condition
    #[error("No initial condition found in domain boundaries")]
    MissingInitialCondition,

    /// A physical quantity expected by a model is absent from the state
    #[error("Quantity '{quantity}' is missing from the state given to {model}")]
    MissingQuantity { quantity: String, model: String },

    // ============ Runtime Errors ============
    /// Aggregate retentate flow is too small for a meaningful composition.
    ///
    /// Recoverable: callers may keep the previous valid composition.
    #[error("Degenerate retentate: aggregate flow {aggregate_flow:e} mol/s leaves composition undefined")]
    DegenerateRetentate { aggregate_flow: f64 },

    /// The integrated state left its sanity bounds
    #[error("Numerical instability in {quantity} at step {step} (t = {time} s): {reason}")]
    NumericalInstability {
        step: usize,
        time: f64,
        quantity: String,
        reason: String,
    },

    /// The adaptive integrator could not meet its tolerance
    #[error("Step size underflow at t = {time} s (dt = {step_size:e} s)")]
    StepSizeUnderflow { time: f64, step_size: f64 },

    // ============ I/O Errors ============
    /// Reading a configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be parsed
    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MembraneError {
    /// Create a configuration error
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a numerical instability error
    pub fn instability(
        step: usize,
        time: f64,
        quantity: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::NumericalInstability {
            step,
            time,
            quantity: quantity.into(),
            reason: reason.into(),
        }
    }

    /// Whether a caller can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DegenerateRetentate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = MembraneError::configuration("node_count", "need at least 3 nodes, got 2");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'node_count': need at least 3 nodes, got 2"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_degenerate_is_recoverable() {
        let err = MembraneError::DegenerateRetentate { aggregate_flow: 1e-20 };
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("Degenerate retentate"));
    }

    #[test]
    fn test_instability_message() {
        let err = MembraneError::instability(42, 0.5, "Concentration", "NaN detected");
        let text = err.to_string();
        assert!(text.contains("step 42"));
        assert!(text.contains("Concentration"));
    }
}
