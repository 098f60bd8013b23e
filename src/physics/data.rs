//! Storage for one physical quantity
//!
//! A quantity is a lumped value (tank moles), a single profile, or one
//! profile per species laid out as `A[node, species]`. Solvers only need
//! to add two quantities of the same shape and scale one by a step size.

use nalgebra::{DMatrix, DVector};
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Values of one physical quantity
///
/// Matrices are column-major, so each species column is contiguous.
///
/// # Examples
///
/// ```rust
/// use membrane_rs::physics::PhysicalData;
///
/// // 10 grid nodes, 2 species
/// let profile = PhysicalData::uniform_matrix(10, 2, 0.0);
/// assert_eq!(profile.shape(), vec![10, 2]);
///
/// let moles = PhysicalData::from_scalar(0.0);
/// assert_eq!(moles.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalData {
    /// Lumped value
    Scalar(f64),

    /// Profile of a single species
    Vector(DVector<f64>),

    /// Rows are grid nodes, columns are species
    Matrix(DMatrix<f64>),
}

impl PhysicalData {
    pub fn from_scalar(value: f64) -> Self {
        Self::Scalar(value)
    }

    pub fn from_vec(values: Vec<f64>) -> Self {
        Self::Vector(DVector::from_vec(values))
    }

    pub fn from_matrix(matrix: DMatrix<f64>) -> Self {
        Self::Matrix(matrix)
    }

    pub fn uniform_vector(size: usize, value: f64) -> Self {
        Self::Vector(DVector::from_element(size, value))
    }

    pub fn uniform_matrix(nodes: usize, species: usize, value: f64) -> Self {
        Self::Matrix(DMatrix::from_element(nodes, species, value))
    }

    // ==================== Shape ====================

    /// `[]`, `[n]` or `[nodes, species]`
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Scalar(_) => vec![],
            Self::Vector(v) => vec![v.len()],
            Self::Matrix(m) => vec![m.nrows(), m.ncols()],
        }
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every value as a flat slice
    pub fn values(&self) -> &[f64] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::Vector(v) => v.as_slice(),
            Self::Matrix(m) => m.as_slice(),
        }
    }

    fn values_mut(&mut self) -> &mut [f64] {
        match self {
            Self::Scalar(value) => std::slice::from_mut(value),
            Self::Vector(v) => v.as_mut_slice(),
            Self::Matrix(m) => m.as_mut_slice(),
        }
    }

    /// Largest magnitude, 0 when empty
    pub fn max_abs(&self) -> f64 {
        self.values().iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
    }

    // ==================== Access ====================

    pub fn try_as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    pub fn try_as_matrix(&self) -> Option<&DMatrix<f64>> {
        match self {
            Self::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn try_as_matrix_mut(&mut self) -> Option<&mut DMatrix<f64>> {
        match self {
            Self::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// # Panics
    ///
    /// Panics unless the data is a scalar.
    pub fn as_scalar(&self) -> f64 {
        self.try_as_scalar()
            .unwrap_or_else(|| panic!("expected a scalar, found {}", self))
    }

    /// # Panics
    ///
    /// Panics unless the data is a vector.
    pub fn as_vector(&self) -> &DVector<f64> {
        match self {
            Self::Vector(v) => v,
            other => panic!("expected a vector, found {}", other),
        }
    }

    /// # Panics
    ///
    /// Panics unless the data is a matrix.
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        match self {
            Self::Matrix(m) => m,
            other => panic!("expected a matrix, found {}", other),
        }
    }

    /// Replace every value `x` with `f(x)`
    ///
    /// Runs on rayon when the `parallel` feature is on and the data holds
    /// more values than [`parallel_threshold`](crate::solver::parallel_threshold).
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        let values = self.values_mut();

        #[cfg(feature = "parallel")]
        if values.len() > crate::solver::parallel_threshold() {
            values.par_iter_mut().for_each(|x| *x = f(*x));
            return;
        }

        values.iter_mut().for_each(|x| *x = f(*x));
    }
}

// ==================== Arithmetic ====================

impl std::ops::Add for PhysicalData {
    type Output = PhysicalData;

    /// Element-wise sum
    ///
    /// # Panics
    ///
    /// Panics when the two sides differ in kind or shape.
    fn add(self, rhs: Self) -> Self::Output {
        use PhysicalData::*;
        match (self, rhs) {
            (Scalar(a), Scalar(b)) => Scalar(a + b),
            (Vector(a), Vector(b)) => {
                assert_eq!(a.len(), b.len(), "vector lengths differ");
                Vector(a + b)
            }
            (Matrix(a), Matrix(b)) => {
                assert_eq!(a.shape(), b.shape(), "matrix shapes differ");
                Matrix(a + b)
            }
            (a, b) => panic!("cannot add {} and {}", a, b),
        }
    }
}

impl std::ops::Mul<f64> for PhysicalData {
    type Output = PhysicalData;

    fn mul(mut self, factor: f64) -> Self::Output {
        self.values_mut().iter_mut().for_each(|x| *x *= factor);
        self
    }
}

impl std::ops::Mul<PhysicalData> for f64 {
    type Output = PhysicalData;

    fn mul(self, rhs: PhysicalData) -> Self::Output {
        rhs * self
    }
}

impl fmt::Display for PhysicalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalData::Scalar(value) => write!(f, "scalar {}", value),
            PhysicalData::Vector(v) => write!(f, "vector[{}]", v.len()),
            PhysicalData::Matrix(m) => write!(f, "matrix[{}x{}]", m.nrows(), m.ncols()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_is_one_value() {
        let data = PhysicalData::from_scalar(42.0);
        assert_eq!(data.values(), &[42.0]);
        assert!(data.shape().is_empty());
        assert_eq!(data.try_as_scalar(), Some(42.0));
        assert!(data.try_as_matrix().is_none());
    }

    #[test]
    fn test_matrix_columns_are_contiguous() {
        let mut m = DMatrix::zeros(3, 2);
        m[(0, 1)] = 7.0;
        let data = PhysicalData::from_matrix(m);
        assert_eq!(data.shape(), vec![3, 2]);
        // Second species starts after the three nodes of the first
        assert_eq!(data.values()[3], 7.0);
    }

    #[test]
    fn test_sum_and_scale() {
        let profile = PhysicalData::uniform_matrix(4, 2, 1.0) + PhysicalData::uniform_matrix(4, 2, 0.5) * 2.0;
        assert_eq!(profile.as_matrix()[(3, 1)], 2.0);

        let moles = 0.5 * (PhysicalData::from_scalar(1.0) + PhysicalData::from_scalar(3.0));
        assert_eq!(moles.as_scalar(), 2.0);
    }

    #[test]
    #[should_panic(expected = "matrix shapes differ")]
    fn test_sum_of_different_grids_panics() {
        let _ = PhysicalData::uniform_matrix(4, 2, 1.0) + PhysicalData::uniform_matrix(3, 2, 1.0);
    }

    #[test]
    #[should_panic(expected = "cannot add")]
    fn test_sum_of_different_kinds_panics() {
        let _ = PhysicalData::from_scalar(1.0) + PhysicalData::uniform_vector(3, 1.0);
    }

    #[test]
    #[should_panic(expected = "expected a scalar")]
    fn test_as_scalar_on_matrix_panics() {
        PhysicalData::uniform_matrix(2, 2, 0.0).as_scalar();
    }

    #[test]
    fn test_max_abs() {
        assert_eq!(PhysicalData::from_vec(vec![1.0, -3.5, 2.0]).max_abs(), 3.5);
        assert_eq!(PhysicalData::from_vec(vec![]).max_abs(), 0.0);
    }

    #[test]
    fn test_apply_touches_every_value() {
        let mut data = PhysicalData::uniform_matrix(3, 2, 2.0);
        data.apply(|x| x * x);
        assert!(data.values().iter().all(|&x| x == 4.0));
    }
}
