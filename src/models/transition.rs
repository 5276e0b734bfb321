//! Transition (motion) models for target dynamics

use nalgebra::RealField;
use num_traits::Float;

use crate::error::{Result, TrackerError};
use crate::types::spaces::StateCovariance;
use crate::types::transforms::TransitionMatrix;

/// Trait for linear transition (motion) models.
///
/// Describes target dynamics in the form:
/// x_{k+1} = F * x_k + w
///
/// where F is the state transition matrix and w is zero-mean Gaussian
/// process noise with covariance Q.
pub trait TransitionModel<T: RealField, const N: usize> {
    /// Returns the state transition matrix for time step dt.
    fn transition_matrix(&self, dt: T) -> TransitionMatrix<T, N>;

    /// Returns the process noise covariance for time step dt.
    fn process_noise(&self, dt: T) -> StateCovariance<T, N>;
}

/// Constant velocity model in 2D.
///
/// State: [x, y, vx, vy]
///
/// Process noise is the discretized white-noise-acceleration matrix scaled
/// linearly by `q`:
///
/// ```text
/// Q = q * | dt⁴/4   0      dt³/2  0     |
///         | 0       dt⁴/4  0      dt³/2 |
///         | dt³/2   0      dt²    0     |
///         | 0       dt³/2  0      dt²   |
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantVelocity2D<T: RealField> {
    /// Process noise coefficient
    pub q: T,
}

impl<T: RealField + Float + Copy> ConstantVelocity2D<T> {
    /// Creates a constant velocity model.
    ///
    /// Fails if `q` is negative or not finite.
    pub fn new(q: T) -> Result<Self> {
        if !Float::is_finite(q) || q < T::zero() {
            return Err(TrackerError::config(
                "process noise coefficient must be finite and non-negative",
            ));
        }
        Ok(Self { q })
    }
}

impl<T: RealField + Float + Copy> TransitionModel<T, 4> for ConstantVelocity2D<T> {
    fn transition_matrix(&self, dt: T) -> TransitionMatrix<T, 4> {
        let one = T::one();
        let zero = T::zero();

        TransitionMatrix::from_matrix(nalgebra::matrix![
            one, zero, dt, zero;
            zero, one, zero, dt;
            zero, zero, one, zero;
            zero, zero, zero, one
        ])
    }

    fn process_noise(&self, dt: T) -> StateCovariance<T, 4> {
        let dt2 = dt * dt;
        let dt3 = dt2 * dt;
        let dt4 = dt3 * dt;

        let two = T::one() + T::one();
        let four = two * two;

        let q11 = dt4 / four * self.q;
        let q13 = dt3 / two * self.q;
        let q33 = dt2 * self.q;

        let zero = T::zero();

        StateCovariance::from_matrix(nalgebra::matrix![
            q11, zero, q13, zero;
            zero, q11, zero, q13;
            q13, zero, q33, zero;
            zero, q13, zero, q33
        ])
    }
}
