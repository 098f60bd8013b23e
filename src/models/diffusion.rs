//! One-dimensional diffusion field across the membrane
//!
//! # Mathematical Background
//!
//! Inside the polymer each species obeys Fick's second law:
//!
//! ```text
//! ∂C/∂t = D · ∂²C/∂x²,   0 < x < L
//! C(0, t) = C_feed(t),   C(L, t) = C_permeate
//! ```
//!
//! ## Spatial Discretization (method of lines)
//!
//! The thickness L is split into N nodes, `dx = L / (N - 1)`, node 0 on
//! the feed face and node N-1 on the permeate face. Interior nodes follow
//! the second-order central difference:
//!
//! ```text
//! dC[j]/dt = D · (C[j+1] - 2·C[j] + C[j-1]) / dx²,   j = 1..N-2
//! ```
//!
//! Nodes 0 and N-1 are Dirichlet nodes: they are never integrated
//! (derivative 0) and are overwritten with the Henry's-law equilibrium
//! values every time the feed pressure is re-evaluated.
//!
//! ## Storage
//!
//! Profiles live in an `N × 2` matrix, one column per [`Species`]. The
//! species do not interact inside the field; each column is an independent
//! problem, so columns may be evaluated in parallel.
//!
//! ## Stability
//!
//! The largest eigenvalue of the discrete operator is close to `4·D/dx²`.
//! Forward Euler needs `dt ≤ dx² / (2·D)`; RK4 tolerates about 1.4 times
//! that. See [`DiffusionField::stable_time_step`].

use crate::error::{MembraneError, Result};
use crate::models::flow::FluxSample;
use crate::models::henry::BoundaryConcentrations;
use crate::models::species::{Species, SpeciesPair};
use nalgebra::{DMatrix, DVector};

/// Concentration profiles: rows are grid nodes, columns are species [mol/m³]
pub type ConcentrationProfile = DMatrix<f64>;

/// Minimum number of grid nodes (two Dirichlet nodes and one interior node)
pub const MIN_NODES: usize = 3;

/// Discretized diffusion field for both species
///
/// # Example
///
/// ```rust
/// use membrane_rs::models::{DiffusionField, SpeciesPair};
///
/// let field = DiffusionField::new(10, 1e-5, SpeciesPair::new(5e-11, 2.5e-11)).unwrap();
/// assert_eq!(field.nodes(), 10);
/// assert!((field.dx() - 1e-5 / 9.0).abs() < 1e-18);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionField {
    /// Number of grid nodes N
    nodes: usize,

    /// Membrane thickness L [m]
    thickness: f64,

    /// Grid spacing dx = L / (N - 1) [m]
    dx: f64,

    /// Diffusivity per species [m²/s]
    diffusivity: SpeciesPair<f64>,
}

impl DiffusionField {
    /// Creates a new diffusion field
    ///
    /// # Arguments
    ///
    /// * `nodes` - Number of grid nodes N (at least 3)
    /// * `thickness` - Membrane thickness L [m] (positive)
    /// * `diffusivity` - Diffusion coefficient per species [m²/s] (non-negative)
    ///
    /// # Errors
    ///
    /// `Configuration` when any of the constraints above is violated.
    pub fn new(nodes: usize, thickness: f64, diffusivity: SpeciesPair<f64>) -> Result<Self> {
        if nodes < MIN_NODES {
            return Err(MembraneError::configuration(
                "node_count",
                format!("need at least {} grid nodes, got {}", MIN_NODES, nodes),
            ));
        }

        if !(thickness.is_finite() && thickness > 0.0) {
            return Err(MembraneError::configuration(
                "membrane_thickness",
                format!("must be positive, got {} m", thickness),
            ));
        }

        for species in Species::ALL {
            let d = *diffusivity.get(species);
            if !(d.is_finite() && d >= 0.0) {
                return Err(MembraneError::configuration(
                    format!("diffusivity.{}", species),
                    format!("must be non-negative, got {} m²/s", d),
                ));
            }
        }

        Ok(Self {
            nodes,
            thickness,
            dx: thickness / (nodes - 1) as f64,
            diffusivity,
        })
    }

    // ==================== Accessors ====================

    /// Number of grid nodes
    #[inline]
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Grid spacing [m]
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Membrane thickness [m]
    #[inline]
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Diffusivities [m²/s]
    #[inline]
    pub fn diffusivity(&self) -> &SpeciesPair<f64> {
        &self.diffusivity
    }

    /// Position of node `j` measured from the feed face [m]
    pub fn position(&self, node: usize) -> f64 {
        node as f64 * self.dx
    }

    /// Largest Forward Euler step that keeps the scheme stable [s]
    ///
    /// `dx² / (2·D_max)`; infinite when no species diffuses.
    pub fn stable_time_step(&self) -> f64 {
        let d_max = self.diffusivity.oxygen.max(self.diffusivity.nitrogen);
        if d_max > 0.0 {
            self.dx * self.dx / (2.0 * d_max)
        } else {
            f64::INFINITY
        }
    }

    // ==================== Profile Operations ====================

    /// Zero profile with the field's shape
    pub fn zero_profile(&self) -> ConcentrationProfile {
        DMatrix::zeros(self.nodes, Species::ALL.len())
    }

    /// Whether `profile` has N rows and one column per species
    pub fn matches(&self, profile: &ConcentrationProfile) -> bool {
        profile.nrows() == self.nodes && profile.ncols() == Species::ALL.len()
    }

    /// Overwrite both Dirichlet nodes with the face equilibrium values
    pub fn apply_dirichlet(&self, profile: &mut ConcentrationProfile, faces: &BoundaryConcentrations) {
        let last = self.nodes - 1;
        for species in Species::ALL {
            let k = species.index();
            profile[(0, k)] = *faces.feed.get(species);
            profile[(last, k)] = *faces.permeate.get(species);
        }
    }

    /// Steady-state solution: linear interpolation between the two faces
    pub fn steady_profile(&self, faces: &BoundaryConcentrations) -> ConcentrationProfile {
        let last = (self.nodes - 1) as f64;
        let mut profile = self.zero_profile();

        for species in Species::ALL {
            let c_feed = *faces.feed.get(species);
            let c_perm = *faces.permeate.get(species);
            for j in 0..self.nodes {
                let s = j as f64 / last;
                profile[(j, species.index())] = c_feed + (c_perm - c_feed) * s;
            }
        }

        profile
    }

    /// Time derivative of the whole profile
    ///
    /// Interior nodes use the central difference; the neighbours of the
    /// first and last interior nodes are taken from `faces`, not from the
    /// profile, so that a stale boundary row in an intermediate stage never
    /// leaks into the stencil. Boundary rows of the result are zero.
    ///
    /// # Panics
    ///
    /// Panics when `profile` does not have the field's shape.
    pub fn derivative(
        &self,
        profile: &ConcentrationProfile,
        faces: &BoundaryConcentrations,
    ) -> ConcentrationProfile {
        assert!(
            self.matches(profile),
            "Concentration profile size {}x{} vs field discretization {}x{}",
            profile.nrows(),
            profile.ncols(),
            self.nodes,
            Species::ALL.len()
        );

        let columns = self.species_columns(profile, faces);

        let mut dc_dt = self.zero_profile();
        for (species, column) in Species::ALL.iter().zip(columns) {
            dc_dt.set_column(species.index(), &column);
        }
        dc_dt
    }

    /// Evaluate each species column, in parallel above the threshold
    fn species_columns(
        &self,
        profile: &ConcentrationProfile,
        faces: &BoundaryConcentrations,
    ) -> Vec<DVector<f64>> {
        if self.nodes * Species::ALL.len() > crate::solver::parallel_threshold() {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;

                return Species::ALL
                    .par_iter()
                    .map(|&species| self.species_derivative(species, profile, faces))
                    .collect();
            }
        }

        Species::ALL
            .iter()
            .map(|&species| self.species_derivative(species, profile, faces))
            .collect()
    }

    /// Central-difference derivative for one species
    fn species_derivative(
        &self,
        species: Species,
        profile: &ConcentrationProfile,
        faces: &BoundaryConcentrations,
    ) -> DVector<f64> {
        let k = species.index();
        let last = self.nodes - 1;
        let coefficient = self.diffusivity.get(species) / (self.dx * self.dx);

        let value = |j: usize| -> f64 {
            if j == 0 {
                *faces.feed.get(species)
            } else if j == last {
                *faces.permeate.get(species)
            } else {
                profile[(j, k)]
            }
        };

        let mut column = DVector::zeros(self.nodes);
        for j in 1..last {
            column[j] = coefficient * (value(j + 1) - 2.0 * value(j) + value(j - 1));
        }
        column
    }

    /// Permeate-face flux from the last two nodes
    ///
    /// ```text
    /// J = -D · (C[N-1] - C[N-2]) / dx
    /// ```
    ///
    /// Positive values mean transport toward the permeate side. `C[N-1]`
    /// is taken from `faces`.
    pub fn permeate_flux(
        &self,
        profile: &ConcentrationProfile,
        faces: &BoundaryConcentrations,
    ) -> FluxSample {
        let last = self.nodes - 1;
        let flux = SpeciesPair::from_fn(|species| {
            let c_face = *faces.permeate.get(species);
            let c_inner = profile[(last - 1, species.index())];
            -self.diffusivity.get(species) * (c_face - c_inner) / self.dx
        });

        FluxSample { flux }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
