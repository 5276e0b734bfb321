//! Observation (sensor) models used by the tracking filter
//!
//! These describe what the filter *believes* about the sensor. The radar
//! simulator ([`crate::models::RadarSensor`]) uses a range-dependent noise
//! that the filter does not model; see [`PositionSensor2D`].

use nalgebra::RealField;
use num_traits::Float;

use crate::error::{Result, TrackerError};
use crate::types::spaces::MeasurementCovariance;
use crate::types::transforms::ObservationMatrix;

/// Trait for linear observation models.
///
/// Describes the measurement process:
/// z = H * x + v
///
/// where H is the observation matrix and v is zero-mean Gaussian
/// measurement noise with covariance R.
pub trait ObservationModel<T: RealField, const N: usize, const M: usize> {
    /// Returns the observation matrix.
    fn observation_matrix(&self) -> ObservationMatrix<T, M, N>;

    /// Returns the measurement noise covariance.
    fn measurement_noise(&self) -> MeasurementCovariance<T, M>;
}

/// Position-only sensor in 2D with isotropic, fixed measurement noise.
///
/// Observes [x, y] from state [x, y, vx, vy] with `R = variance * I₂`.
///
/// The variance is fixed for a run, while the simulated radar's noise grows
/// with range. The filter therefore under- or over-weights detections
/// depending on target range.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSensor2D<T: RealField> {
    /// Measurement noise variance on each axis
    pub variance: T,
}

impl<T: RealField + Float + Copy> PositionSensor2D<T> {
    /// Creates a position sensor with `R = variance * I₂`.
    ///
    /// Fails unless `variance` is positive and finite, which keeps the
    /// innovation covariance invertible.
    pub fn new(variance: T) -> Result<Self> {
        if !Float::is_finite(variance) || variance <= T::zero() {
            return Err(TrackerError::config(
                "measurement noise must be finite and positive",
            ));
        }
        Ok(Self { variance })
    }
}

impl<T: RealField + Float + Copy> ObservationModel<T, 4, 2> for PositionSensor2D<T> {
    fn observation_matrix(&self) -> ObservationMatrix<T, 2, 4> {
        let one = T::one();
        let zero = T::zero();

        ObservationMatrix::from_matrix(nalgebra::matrix![
            one, zero, zero, zero;
            zero, one, zero, zero
        ])
    }

    fn measurement_noise(&self) -> MeasurementCovariance<T, 2> {
        let zero = T::zero();

        MeasurementCovariance::from_matrix(nalgebra::matrix![
            self.variance, zero;
            zero, self.variance
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_sensor_noise() {
        let sensor = PositionSensor2D::new(30.0_f64).unwrap();
        let r = sensor.measurement_noise();

        assert!((r.as_matrix()[(0, 0)] - 30.0).abs() < 1e-12);
        assert!((r.as_matrix()[(1, 1)] - 30.0).abs() < 1e-12);
        assert!(r.as_matrix()[(0, 1)].abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_noise_rejected() {
        assert!(PositionSensor2D::new(0.0_f64).is_err());
        assert!(PositionSensor2D::new(-5.0_f64).is_err());
        assert!(PositionSensor2D::new(f64::INFINITY).is_err());
    }
}
