//! Physical models for the membrane separator
//!
//! [`MembraneSeparator`] implements the [`PhysicalModel`](crate::physics::PhysicalModel)
//! trait. The solver calls `compute_physics` at each stage; the model
//! composes the leaf components below into one derivative, the solver does
//! the time integration.
//!
//! # Components (leaves first)
//!
//! - [`HenryBoundary`]: feed/permeate pressures to face concentrations
//! - [`DiffusionField`]: method-of-lines diffusion across the membrane
//! - [`FlowSplit`]: permeate flux to clamped flows and retentate composition
//! - [`Accumulator`]: tank moles to pressure
//! - [`ReliefValve`]: tank pressure to outflow
//! - [`PressureSignal`]: feed pressure over time
//!
//! # Feed pressure
//!
//! The solver writes the current time into the `PhysicalState` metadata
//! before each call to `compute_physics`; the separator evaluates its
//! [`PressureSignal`] at that time.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod diffusion;
pub mod feed;
pub mod flow;
pub mod henry;
pub mod separator;
pub mod species;
pub mod tank;
pub mod valve;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use diffusion::{ConcentrationProfile, DiffusionField};
pub use feed::PressureSignal;
pub use flow::{FeedStream, FlowSplit, FluxSample};
pub use henry::{BoundaryConcentrations, BoundaryState, HenryBoundary};
pub use separator::{MembraneSeparator, Sample};
pub use species::{Species, SpeciesPair};
pub use tank::{Accumulator, GAS_CONSTANT};
pub use valve::ReliefValve;
