//! Vector space markers and typed vectors
//!
//! Radar detections, filter states, and innovations all live in small
//! fixed-size vector spaces. The types here keep them apart at compile time
//! so a measurement can never be added to a state by accident.

use ::core::marker::PhantomData;
use ::core::ops::{Add, Mul, Sub};
use nalgebra::{RealField, SMatrix, SVector, Scalar};

// ============================================================================
// Vector Space Markers
// ============================================================================

/// Marker for state space vectors ([x, y, vx, vy]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSpace;

/// Marker for measurement space vectors (radar position reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementSpace;

/// Marker for innovation vectors (measurement - predicted measurement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnovationSpace;

// ============================================================================
// Typed Vector
// ============================================================================

/// A vector parameterized by scalar type, dimension, and mathematical space.
///
/// # Type Parameters
///
/// - `T`: Scalar type (`f64` throughout the engine)
/// - `N`: Dimension
/// - `Space`: Marker type naming the space the vector belongs to
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T: Scalar, const N: usize, Space> {
    inner: SVector<T, N>,
    _marker: PhantomData<Space>,
}

impl<T: Scalar, const N: usize, Space> Vector<T, N, Space> {
    /// Creates a vector from raw components.
    #[inline]
    pub fn from_array(data: [T; N]) -> Self {
        Self {
            inner: SVector::from(data),
            _marker: PhantomData,
        }
    }

    /// Wraps an nalgebra vector.
    #[inline]
    pub fn from_svector(inner: SVector<T, N>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the underlying nalgebra vector.
    #[inline]
    pub fn as_svector(&self) -> &SVector<T, N> {
        &self.inner
    }

    /// Returns the components as a plain array.
    #[inline]
    pub fn to_array(&self) -> [T; N] {
        ::core::array::from_fn(|i| self.inner[i].clone())
    }

    /// Component at `index`.
    ///
    /// # Panics
    /// Panics if index is out of bounds.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn index(&self, index: usize) -> &T {
        &self.inner[index]
    }
}

impl<T: Scalar + Copy, const N: usize, Space: Clone> Copy for Vector<T, N, Space> {}

impl<T: RealField + Copy, const N: usize, Space> Vector<T, N, Space> {
    /// Zero vector.
    #[inline]
    pub fn zeros() -> Self {
        Self {
            inner: SVector::zeros(),
            _marker: PhantomData,
        }
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> T {
        self.inner.norm()
    }

    /// Euclidean distance to another vector in the same space.
    #[inline]
    pub fn distance(&self, other: &Self) -> T {
        (self.inner - other.inner).norm()
    }

    /// Returns true if every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool
    where
        T: num_traits::Float,
    {
        self.inner.iter().all(|v| num_traits::Float::is_finite(*v))
    }
}

// ============================================================================
// Type Aliases
// ============================================================================

/// A state vector in state space.
pub type StateVector<T, const N: usize> = Vector<T, N, StateSpace>;

/// A measurement vector in measurement space.
pub type Measurement<T, const M: usize> = Vector<T, M, MeasurementSpace>;

/// An innovation vector (measurement residual).
pub type Innovation<T, const M: usize> = Vector<T, M, InnovationSpace>;

// ============================================================================
// Same-Space Arithmetic
// ============================================================================

impl<T: RealField + Copy, const N: usize, Space> Add for Vector<T, N, Space> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::from_svector(self.inner + rhs.inner)
    }
}

impl<T: RealField + Copy, const N: usize, Space> Sub for Vector<T, N, Space> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_svector(self.inner - rhs.inner)
    }
}

impl<T: RealField + Copy, const N: usize, Space> Mul<T> for Vector<T, N, Space> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: T) -> Self::Output {
        Self::from_svector(self.inner * rhs)
    }
}

// ============================================================================
// Measurement - Measurement = Innovation
// ============================================================================

/// Computes the innovation (residual) between two measurements.
///
/// Subtracting two measurements yields an innovation, not another
/// measurement, so this is a separate operation from `Sub`.
pub trait ComputeInnovation<T: RealField, const M: usize> {
    /// Residual of this measurement against a predicted measurement.
    fn innovation(self, predicted: Measurement<T, M>) -> Innovation<T, M>;
}

impl<T: RealField + Copy, const M: usize> ComputeInnovation<T, M> for Measurement<T, M> {
    #[inline]
    fn innovation(self, predicted: Measurement<T, M>) -> Innovation<T, M> {
        Innovation::from_svector(self.inner - predicted.inner)
    }
}

// ============================================================================
// Covariance Matrix
// ============================================================================

/// A covariance matrix bound to a specific vector space.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq)]
pub struct Covariance<T: Scalar, const N: usize, Space> {
    inner: SMatrix<T, N, N>,
    _marker: PhantomData<Space>,
}

impl<T: Scalar, const N: usize, Space> Covariance<T, N, Space> {
    /// Wraps a raw matrix. The caller is responsible for symmetry and
    /// positive semi-definiteness.
    #[inline]
    pub fn from_matrix(inner: SMatrix<T, N, N>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the underlying matrix.
    #[inline]
    pub fn as_matrix(&self) -> &SMatrix<T, N, N> {
        &self.inner
    }
}

impl<T: Scalar + Copy, const N: usize, Space: Clone> Copy for Covariance<T, N, Space> where
    SMatrix<T, N, N>: Copy
{
}

impl<T: RealField + Copy, const N: usize, Space> Covariance<T, N, Space> {
    /// Zero covariance.
    #[inline]
    pub fn zeros() -> Self {
        Self::from_matrix(SMatrix::zeros())
    }

    /// Identity covariance.
    #[inline]
    pub fn identity() -> Self {
        Self::from_matrix(SMatrix::identity())
    }

    /// Scales the whole matrix.
    #[inline]
    pub fn scale(&self, s: T) -> Self {
        Self::from_matrix(self.inner.scale(s))
    }

    /// Element-wise sum of two covariances.
    #[inline]
    pub fn add(&self, other: &Self) -> Self {
        Self::from_matrix(self.inner + other.inner)
    }

    /// Sum of variances.
    #[inline]
    pub fn trace(&self) -> T {
        self.inner.trace()
    }

    /// Variance of component `i`.
    #[inline]
    pub fn variance(&self, i: usize) -> T {
        self.inner[(i, i)]
    }

    /// Returns `(P + Pᵀ) / 2`, removing asymmetry introduced by rounding.
    #[inline]
    pub fn symmetrize(&self) -> Self {
        let half = T::one() / (T::one() + T::one());
        Self::from_matrix((self.inner + self.inner.transpose()).scale(half))
    }

    /// Returns true if `|P[i][j] - P[j][i]| <= tol` for all entries.
    pub fn is_symmetric(&self, tol: T) -> bool {
        for i in 0..N {
            for j in (i + 1)..N {
                if (self.inner[(i, j)] - self.inner[(j, i)]).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Inverse, or `None` if the matrix is singular.
    #[inline]
    pub fn try_inverse(&self) -> Option<Self> {
        self.inner.try_inverse().map(Self::from_matrix)
    }
}

/// Covariance matrix in state space.
pub type StateCovariance<T, const N: usize> = Covariance<T, N, StateSpace>;

/// Covariance matrix in measurement space (R, and S = HPHᵀ + R).
pub type MeasurementCovariance<T, const M: usize> = Covariance<T, M, MeasurementSpace>;

// ============================================================================
// Plain Points
// ============================================================================

/// A 2D position as exchanged with trajectory sources and frame results.
pub type Point2 = [f64; 2];

impl Measurement<f64, 2> {
    /// Creates a measurement from a plain 2D point.
    #[inline]
    pub fn from_point(p: Point2) -> Self {
        Self::from_array(p)
    }

    /// Returns the measurement as a plain 2D point.
    #[inline]
    pub fn to_point(&self) -> Point2 {
        self.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_vector_operations() {
        let v1: StateVector<f64, 4> = StateVector::from_array([1.0, 2.0, 3.0, 4.0]);
        let v2: StateVector<f64, 4> = StateVector::from_array([0.5, 1.0, 1.5, 2.0]);

        let sum = v1 + v2;
        assert!((sum.index(0) - 1.5).abs() < 1e-10);
        assert!((sum.index(3) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_measurement_to_innovation() {
        let actual: Measurement<f64, 2> = Measurement::from_array([10.0, 20.0]);
        let predicted: Measurement<f64, 2> = Measurement::from_array([9.5, 19.0]);

        let innovation = actual.innovation(predicted);
        assert!((innovation.index(0) - 0.5).abs() < 1e-10);
        assert!((innovation.index(1) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_measurement_distance_and_points() {
        let a = Measurement::from_point([0.0, 0.0]);
        let b = Measurement::from_point([3.0, 4.0]);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert_eq!(b.to_point(), [3.0, 4.0]);
        assert!(b.is_finite());
        assert!(!Measurement::from_point([f64::NAN, 0.0]).is_finite());
    }

    #[test]
    fn test_symmetrize() {
        let cov: StateCovariance<f64, 2> =
            StateCovariance::from_matrix(nalgebra::matrix![2.0, 1.0; 0.0, 2.0]);
        assert!(!cov.is_symmetric(1e-12));

        let sym = cov.symmetrize();
        assert!(sym.is_symmetric(0.0));
        assert!((sym.as_matrix()[(0, 1)] - 0.5).abs() < 1e-12);
        assert!((sym.trace() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_covariance_has_no_inverse() {
        let singular: MeasurementCovariance<f64, 2> =
            MeasurementCovariance::from_matrix(nalgebra::matrix![1.0, 1.0; 1.0, 1.0]);
        assert!(singular.try_inverse().is_none());
    }
}
