//! Physical models
//!
//! This module provides the traits and containers shared by every model.
//! A physical model encapsulates the equations of a system; it does not
//! integrate them.
//!
//! # Core Concepts
//!
//! - **Physical Model**: Computes the time derivative at a given state
//! - **Physical State**: Container for all physical quantities (concentration profiles, moles)
//! - **Physical Quantity**: Type-safe identifier for physical variables
//! - **Closed Range**: Saturation limits for derived quantities
//!
//! # Architecture
//!
//! Physical models are **separate from numerical solvers**:
//! - The model provides the **equations** (physics)
//! - The solver provides the **method** to advance them (numerics)
//!
//! # Implementing a New Physical Model
//!
//! ```rust
//! use membrane_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
//!
//! /// dn/dt = constant inflow
//! struct Filling {
//!     inflow: f64,
//! }
//!
//! impl PhysicalModel for Filling {
//!     fn points(&self) -> usize { 1 }
//!
//!     fn compute_physics(&self, _state: &PhysicalState) -> PhysicalState {
//!         PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(self.inflow))
//!     }
//!
//!     fn setup_initial_state(&self) -> PhysicalState {
//!         PhysicalState::new(PhysicalQuantity::Moles, PhysicalData::from_scalar(0.0))
//!     }
//!
//!     fn name(&self) -> &str { "Filling" }
//! }
//!
//! let model = Filling { inflow: 1e-3 };
//! let rate = model.compute_physics(&model.setup_initial_state());
//! assert_eq!(rate.get(PhysicalQuantity::Moles).unwrap().as_scalar(), 1e-3);
//! ```

// module declaration
pub mod bounds;
pub mod data;
pub mod traits;

// re-export commonly used types for convenience
pub use bounds::{ClosedRange, Saturation};
pub use data::PhysicalData;
pub use traits::{PhysicalModel, PhysicalQuantity, PhysicalState, TIME_KEY};
