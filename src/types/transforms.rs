//! Typed transformation matrices
//!
//! Matrices that map vectors between spaces, with the source and target
//! spaces encoded in the type.

use ::core::marker::PhantomData;
use nalgebra::{RealField, SMatrix, Scalar};

use super::spaces::{
    Innovation, InnovationSpace, Measurement, MeasurementCovariance, MeasurementSpace,
    StateCovariance, StateSpace, StateVector,
};

// ============================================================================
// Transform Matrix
// ============================================================================

/// A matrix mapping vectors from space `From` (COLS) to space `To` (ROWS).
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq)]
pub struct Transform<T: Scalar, const ROWS: usize, const COLS: usize, To, From> {
    inner: SMatrix<T, ROWS, COLS>,
    _marker: PhantomData<(To, From)>,
}

impl<T: Scalar, const ROWS: usize, const COLS: usize, To, From> Transform<T, ROWS, COLS, To, From> {
    /// Wraps a raw matrix.
    #[inline]
    pub fn from_matrix(inner: SMatrix<T, ROWS, COLS>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the underlying matrix.
    #[inline]
    pub fn as_matrix(&self) -> &SMatrix<T, ROWS, COLS> {
        &self.inner
    }
}

impl<T: Scalar + Copy, const ROWS: usize, const COLS: usize, To: Clone, From: Clone> Copy
    for Transform<T, ROWS, COLS, To, From>
where
    SMatrix<T, ROWS, COLS>: Copy,
{
}

/// State transition matrix F: state -> state
pub type TransitionMatrix<T, const N: usize> = Transform<T, N, N, StateSpace, StateSpace>;

/// Observation matrix H: state -> measurement
pub type ObservationMatrix<T, const M: usize, const N: usize> =
    Transform<T, M, N, MeasurementSpace, StateSpace>;

/// Kalman gain K: innovation -> state
pub type KalmanGain<T, const N: usize, const M: usize> =
    Transform<T, N, M, StateSpace, InnovationSpace>;

impl<T: RealField + Copy, const N: usize> TransitionMatrix<T, N> {
    /// x' = F * x
    #[inline]
    pub fn apply_state(&self, state: &StateVector<T, N>) -> StateVector<T, N> {
        StateVector::from_svector(self.inner * state.as_svector())
    }

    /// F * P * Fᵀ
    #[inline]
    pub fn propagate_covariance(&self, cov: &StateCovariance<T, N>) -> StateCovariance<T, N> {
        StateCovariance::from_matrix(self.inner * cov.as_matrix() * self.inner.transpose())
    }
}

impl<T: RealField + Copy, const M: usize, const N: usize> ObservationMatrix<T, M, N> {
    /// z = H * x
    #[inline]
    pub fn observe(&self, state: &StateVector<T, N>) -> Measurement<T, M> {
        Measurement::from_svector(self.inner * state.as_svector())
    }

    /// H * P * Hᵀ
    #[inline]
    pub fn project_covariance(&self, cov: &StateCovariance<T, N>) -> MeasurementCovariance<T, M> {
        MeasurementCovariance::from_matrix(self.inner * cov.as_matrix() * self.inner.transpose())
    }
}

impl<T: RealField + Copy, const N: usize, const M: usize> KalmanGain<T, N, M> {
    /// K * y
    #[inline]
    pub fn correct(&self, innovation: &Innovation<T, M>) -> StateVector<T, N> {
        StateVector::from_svector(self.inner * innovation.as_svector())
    }
}

// ============================================================================
// Kalman Update Helpers
// ============================================================================

/// Innovation covariance S = H * P * Hᵀ + R
pub fn compute_innovation_covariance<T: RealField + Copy, const N: usize, const M: usize>(
    state_cov: &StateCovariance<T, N>,
    obs_matrix: &ObservationMatrix<T, M, N>,
    meas_noise: &MeasurementCovariance<T, M>,
) -> MeasurementCovariance<T, M> {
    obs_matrix.project_covariance(state_cov).add(meas_noise)
}

/// Kalman gain K = P * Hᵀ * S⁻¹
///
/// Returns `None` if S is singular.
pub fn compute_kalman_gain<T: RealField + Copy, const N: usize, const M: usize>(
    state_cov: &StateCovariance<T, N>,
    obs_matrix: &ObservationMatrix<T, M, N>,
    innovation_cov: &MeasurementCovariance<T, M>,
) -> Option<KalmanGain<T, N, M>> {
    let s_inv = innovation_cov.as_matrix().try_inverse()?;
    let k = state_cov.as_matrix() * obs_matrix.as_matrix().transpose() * s_inv;
    Some(KalmanGain::from_matrix(k))
}

/// Standard-form covariance update followed by symmetrization.
///
/// P_updated = sym((I - K*H) * P)
pub fn symmetric_covariance_update<T: RealField + Copy, const N: usize, const M: usize>(
    state_cov: &StateCovariance<T, N>,
    kalman_gain: &KalmanGain<T, N, M>,
    obs_matrix: &ObservationMatrix<T, M, N>,
) -> StateCovariance<T, N> {
    let i: SMatrix<T, N, N> = SMatrix::identity();
    let i_kh = i - kalman_gain.as_matrix() * obs_matrix.as_matrix();

    StateCovariance::from_matrix(i_kh * state_cov.as_matrix()).symmetrize()
}
