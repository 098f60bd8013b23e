//! Common utilities for integration tests

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{ConstantGrowth, ExponentialDecay, ForcedOscillation};
pub use test_helpers::{
    assert_mass_balance,
    create_simple_scenario,
    reference_separator,
    relative_error,
    run_separator,
};
