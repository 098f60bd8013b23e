//! membrane-rs: O2/N2 Membrane Separator Simulation
//!
//! Time-dependent simulation of a dense membrane separating air into an
//! O2-enriched permeate and an N2-enriched retentate, the retentate filling
//! an accumulator tank vented by a linear relief valve.
//!
//! # Architecture
//!
//! membrane-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Physical models define equations (what to solve)
//!    - Numerical solvers provide methods (how to solve)
//!
//! 2. **One joint state**
//!    - Membrane profiles (method of lines) and tank moles live in one
//!      [`PhysicalState`](physics::PhysicalState)
//!    - Any [`Solver`](solver::Solver) advances them in lockstep
//!
//! # Quick Start
//!
//! ```rust
//! use membrane_rs::config::SeparatorConfig;
//! use membrane_rs::models::{MembraneSeparator, PressureSignal};
//! use membrane_rs::solver::{RK4Solver, Scenario, Solver, SolverConfiguration};
//!
//! # fn main() -> membrane_rs::error::Result<()> {
//! // 1. Configure the physical model and the scenario
//! let model = MembraneSeparator::from_config(
//!     &SeparatorConfig::default(),
//!     PressureSignal::step(0.5, 1e5, 5e4),
//! )?;
//! let scenario = Scenario::from_model(Box::new(model.clone()));
//!
//! // 2. Configure the solver
//! let config = SolverConfiguration::time_evolution(
//!     1.0,   // 1 s of simulated time
//!     100,   // 100 time steps
//! );
//!
//! // 3. Run the simulation
//! let result = RK4Solver::new().solve(&scenario, &config)?;
//!
//! // 4. Observe the outputs
//! let samples = model.observe_trajectory(&result)?;
//! assert_eq!(samples.len(), 101);
//! assert!(samples[100].retentate_n2_fraction > 0.79);
//! # Ok(())
//! # }
//! ```
//!
//! For configuration-driven runs see [`simulation::simulate`].
//!
//! # Modules
//!
//! - [`physics`]: state containers and the model trait
//! - [`models`]: the separator equations and their parts
//! - [`solver`]: numerical solvers (methods)
//! - [`config`]: serde configuration with validation
//! - [`simulation`]: configuration-driven runner
//! - [`output`]: CSV and JSON lines export
//! - [`error`]: the crate error type

// Core modules
pub mod physics;

pub mod models;
pub mod solver;

pub mod config;
pub mod error;
pub mod output;
pub mod simulation;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use membrane_rs::prelude::*;
    //! ```
    pub use crate::config::{IntegratorConfig, SeparatorConfig, SimulationConfig};
    pub use crate::error::{MembraneError, Result};
    pub use crate::models::{MembraneSeparator, PressureSignal, Sample, Species, SpeciesPair};
    pub use crate::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
    pub use crate::simulation::{simulate, SimulationReport};
    pub use crate::solver::{
        DormandPrinceSolver, EulerSolver, RK4Solver, Scenario, SimulationResult, Solver,
        SolverConfiguration, SolverType, StopSignal,
    };
}
