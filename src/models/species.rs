//! Diffusing species
//!
//! The separator tracks exactly two components. [`SpeciesPair`] holds one
//! value per component so that call sites read `pair.oxygen` instead of
//! relying on positional indices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gas component handled by the membrane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    /// O2, the fast permeating component
    Oxygen,
    /// N2, the component retained and stored in the tank
    Nitrogen,
}

impl Species {
    /// Both species, in column order
    pub const ALL: [Species; 2] = [Species::Oxygen, Species::Nitrogen];

    /// Column of this species in a concentration matrix
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Species::Oxygen => 0,
            Species::Nitrogen => 1,
        }
    }

    /// Chemical formula
    pub fn formula(self) -> &'static str {
        match self {
            Species::Oxygen => "O2",
            Species::Nitrogen => "N2",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.formula())
    }
}

/// One value per species
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeciesPair<T> {
    pub oxygen: T,
    pub nitrogen: T,
}

impl<T> SpeciesPair<T> {
    /// Create a pair
    pub fn new(oxygen: T, nitrogen: T) -> Self {
        Self { oxygen, nitrogen }
    }

    /// Borrow the value for `species`
    pub fn get(&self, species: Species) -> &T {
        match species {
            Species::Oxygen => &self.oxygen,
            Species::Nitrogen => &self.nitrogen,
        }
    }

    /// Mutably borrow the value for `species`
    pub fn get_mut(&mut self, species: Species) -> &mut T {
        match species {
            Species::Oxygen => &mut self.oxygen,
            Species::Nitrogen => &mut self.nitrogen,
        }
    }

    /// Build a pair by evaluating `f` for each species
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Species) -> T,
    {
        Self {
            oxygen: f(Species::Oxygen),
            nitrogen: f(Species::Nitrogen),
        }
    }

    /// Transform each value, keeping the species it belongs to
    pub fn map<U, F>(&self, mut f: F) -> SpeciesPair<U>
    where
        F: FnMut(Species, &T) -> U,
    {
        SpeciesPair {
            oxygen: f(Species::Oxygen, &self.oxygen),
            nitrogen: f(Species::Nitrogen, &self.nitrogen),
        }
    }
}

impl SpeciesPair<f64> {
    /// Sum over both species
    pub fn total(&self) -> f64 {
        self.oxygen + self.nitrogen
    }
}
