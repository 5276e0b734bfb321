//! Linear Kalman filter and per-target state estimator
//!
//! [`KalmanFilter`] holds the motion and sensor models and performs
//! stateless predict/update steps on a [`KalmanState`].
//! [`TargetEstimator`] wraps one filter together with the state it owns and
//! is what the tracking engine keeps per target.
//!
//! # Example
//!
//! ```
//! use radartrack::filters::kalman::TargetEstimator;
//! use radartrack::types::spaces::Measurement;
//!
//! // Start at (100, 200) at rest, q = 1.0, R = 30 * I, dt = 1
//! let mut estimator = TargetEstimator::at_rest([100.0, 200.0], 1.0, 30.0, 1.0).unwrap();
//!
//! estimator.predict();
//! estimator.update(&Measurement::from_array([102.0, 199.0])).unwrap();
//!
//! let [x, y] = estimator.position();
//! assert!((x - 102.0).abs() < 1.0 && (y - 199.0).abs() < 1.0);
//! ```

use ::core::marker::PhantomData;

use nalgebra::RealField;
use num_traits::Float;

use crate::error::{Result, TrackerError};
use crate::models::{ConstantVelocity2D, ObservationModel, PositionSensor2D, TransitionModel};
use crate::types::spaces::{
    ComputeInnovation, Measurement, MeasurementCovariance, Point2, StateCovariance, StateVector,
};
use crate::types::transforms::{
    compute_innovation_covariance, compute_kalman_gain, symmetric_covariance_update,
};

/// Initial variance on every state component for a freshly started track.
pub const INITIAL_VARIANCE: f64 = 1000.0;

// ============================================================================
// Kalman Filter State
// ============================================================================

/// Mean and covariance of one target's state estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanState<T: RealField, const N: usize> {
    /// State estimate mean
    pub mean: StateVector<T, N>,
    /// State estimate covariance
    pub covariance: StateCovariance<T, N>,
}

impl<T: RealField + Copy, const N: usize> KalmanState<T, N> {
    /// Creates a new state.
    #[inline]
    pub fn new(mean: StateVector<T, N>, covariance: StateCovariance<T, N>) -> Self {
        Self { mean, covariance }
    }

    /// Trace of the covariance matrix (sum of variances).
    #[inline]
    pub fn uncertainty(&self) -> T {
        self.covariance.trace()
    }
}

impl KalmanState<f64, 4> {
    /// Constant-velocity state at `position` with zero velocity and
    /// covariance `INITIAL_VARIANCE * I`.
    pub fn at_rest(position: Point2) -> Self {
        Self::new(
            StateVector::from_array([position[0], position[1], 0.0, 0.0]),
            StateCovariance::identity().scale(INITIAL_VARIANCE),
        )
    }
}

// ============================================================================
// Kalman Filter
// ============================================================================

/// A discrete-time linear Kalman filter over a transition and an
/// observation model.
#[derive(Debug, Clone)]
pub struct KalmanFilter<T, Trans, Obs, const N: usize, const M: usize>
where
    T: RealField,
    Trans: TransitionModel<T, N>,
    Obs: ObservationModel<T, N, M>,
{
    /// Transition (motion) model
    pub transition: Trans,
    /// Observation (sensor) model
    pub observation: Obs,
    _marker: PhantomData<T>,
}

impl<T, Trans, Obs, const N: usize, const M: usize> KalmanFilter<T, Trans, Obs, N, M>
where
    T: RealField + Float + Copy,
    Trans: TransitionModel<T, N>,
    Obs: ObservationModel<T, N, M>,
{
    /// Creates a new Kalman filter with the given models.
    #[inline]
    pub fn new(transition: Trans, observation: Obs) -> Self {
        Self {
            transition,
            observation,
            _marker: PhantomData,
        }
    }

    /// Prediction step.
    ///
    /// - x_pred = F * x
    /// - P_pred = F * P * Fᵀ + Q
    pub fn predict(&self, state: &KalmanState<T, N>, dt: T) -> KalmanState<T, N> {
        let f = self.transition.transition_matrix(dt);
        let q = self.transition.process_noise(dt);

        KalmanState {
            mean: f.apply_state(&state.mean),
            covariance: f.propagate_covariance(&state.covariance).add(&q),
        }
    }

    /// Predicted measurement H * x.
    #[inline]
    pub fn predicted_measurement(&self, state: &KalmanState<T, N>) -> Measurement<T, M> {
        self.observation.observation_matrix().observe(&state.mean)
    }

    /// Innovation covariance S = H * P * Hᵀ + R.
    pub fn innovation_covariance(&self, state: &KalmanState<T, N>) -> MeasurementCovariance<T, M> {
        let h = self.observation.observation_matrix();
        let r = self.observation.measurement_noise();
        compute_innovation_covariance(&state.covariance, &h, &r)
    }

    /// Update step.
    ///
    /// - y = z - H * x
    /// - S = H * P * Hᵀ + R
    /// - K = P * Hᵀ * S⁻¹
    /// - x_upd = x + K * y
    /// - P_upd = sym((I - K*H) * P)
    ///
    /// Fails with [`TrackerError::Numerical`] if S is singular.
    pub fn update(
        &self,
        state: &KalmanState<T, N>,
        measurement: &Measurement<T, M>,
    ) -> Result<KalmanState<T, N>> {
        let h = self.observation.observation_matrix();
        let r = self.observation.measurement_noise();

        let innovation = measurement.innovation(h.observe(&state.mean));
        let innovation_cov = compute_innovation_covariance(&state.covariance, &h, &r);

        let kalman_gain = compute_kalman_gain(&state.covariance, &h, &innovation_cov)
            .ok_or_else(|| TrackerError::Numerical("innovation covariance is singular".into()))?;

        let correction = kalman_gain.correct(&innovation);

        Ok(KalmanState {
            mean: state.mean + correction,
            covariance: symmetric_covariance_update(&state.covariance, &kalman_gain, &h),
        })
    }

    /// Squared Mahalanobis distance of a measurement under the innovation
    /// covariance, or `None` if S is singular.
    pub fn mahalanobis_distance_squared(
        &self,
        state: &KalmanState<T, N>,
        measurement: &Measurement<T, M>,
    ) -> Option<T> {
        let innovation = measurement.innovation(self.predicted_measurement(state));
        let s_inv = self.innovation_covariance(state).try_inverse()?;

        let y = innovation.as_svector();
        Some((y.transpose() * s_inv.as_matrix() * y)[(0, 0)])
    }
}

// ============================================================================
// Target Estimator
// ============================================================================

/// Constant-velocity filter for a 2D point target observed in position.
pub type CvKalmanFilter = KalmanFilter<f64, ConstantVelocity2D<f64>, PositionSensor2D<f64>, 4, 2>;

/// Owns the state of one target and advances it frame by frame.
///
/// State is [px, py, vx, vy].
#[derive(Debug, Clone)]
pub struct TargetEstimator {
    filter: CvKalmanFilter,
    state: KalmanState<f64, 4>,
    dt: f64,
}

impl TargetEstimator {
    /// Creates an estimator from an explicit filter and initial state.
    ///
    /// Fails unless `dt` is positive and finite.
    pub fn new(filter: CvKalmanFilter, state: KalmanState<f64, 4>, dt: f64) -> Result<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(TrackerError::config(format!(
                "time step must be finite and positive, got {dt}"
            )));
        }
        Ok(Self { filter, state, dt })
    }

    /// Starts a track at `position` with zero velocity and covariance
    /// `INITIAL_VARIANCE * I`.
    ///
    /// # Arguments
    /// - `process_noise`: Coefficient scaling the constant-velocity Q
    /// - `measurement_noise`: Per-axis variance of R
    /// - `dt`: Time between frames
    pub fn at_rest(position: Point2, process_noise: f64, measurement_noise: f64, dt: f64) -> Result<Self> {
        let filter = KalmanFilter::new(
            ConstantVelocity2D::new(process_noise)?,
            PositionSensor2D::new(measurement_noise)?,
        );
        Self::new(filter, KalmanState::at_rest(position), dt)
    }

    /// x ← F x, P ← F P Fᵀ + Q
    pub fn predict(&mut self) {
        self.state = self.filter.predict(&self.state, self.dt);
    }

    /// Corrects the state with `z`. On failure the state is left unchanged.
    pub fn update(&mut self, z: &Measurement<f64, 2>) -> Result<()> {
        self.state = self.filter.update(&self.state, z)?;
        Ok(())
    }

    /// H x for the current state.
    pub fn predicted_measurement(&self) -> Measurement<f64, 2> {
        self.filter.predicted_measurement(&self.state)
    }

    /// S = H P Hᵀ + R for the current state.
    pub fn innovation_covariance(&self) -> MeasurementCovariance<f64, 2> {
        self.filter.innovation_covariance(&self.state)
    }

    /// Measurement noise R assumed by the filter.
    pub fn measurement_noise(&self) -> MeasurementCovariance<f64, 2> {
        self.filter.observation.measurement_noise()
    }

    /// Current position estimate.
    pub fn position(&self) -> Point2 {
        [*self.state.mean.index(0), *self.state.mean.index(1)]
    }

    /// Current velocity estimate.
    pub fn velocity(&self) -> Point2 {
        [*self.state.mean.index(2), *self.state.mean.index(3)]
    }

    /// Trace of P.
    pub fn uncertainty(&self) -> f64 {
        self.state.uncertainty()
    }

    /// Current mean and covariance.
    pub fn state(&self) -> &KalmanState<f64, 4> {
        &self.state
    }

    /// The underlying filter.
    pub fn filter(&self) -> &CvKalmanFilter {
        &self.filter
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cv_filter(q: f64, r: f64) -> CvKalmanFilter {
        KalmanFilter::new(
            ConstantVelocity2D::new(q).unwrap(),
            PositionSensor2D::new(r).unwrap(),
        )
    }

    #[test]
    fn test_kalman_predict() {
        let filter = cv_filter(0.1, 1.0);

        // At origin, moving right at 10 m/s
        let state = KalmanState::new(
            StateVector::from_array([0.0, 0.0, 10.0, 0.0]),
            StateCovariance::identity(),
        );

        let predicted = filter.predict(&state, 1.0);

        assert!((predicted.mean.index(0) - 10.0).abs() < 1e-10);
        assert!((predicted.mean.index(1) - 0.0).abs() < 1e-10);
        assert!((predicted.mean.index(2) - 10.0).abs() < 1e-10);
        assert!(predicted.uncertainty() > state.uncertainty());
    }

    #[test]
    fn test_predict_at_rest_grows_every_variance() {
        for dt in [0.1, 1.0, 3.5] {
            let mut est = TargetEstimator::at_rest([50.0, -20.0], 1.0, 30.0, dt).unwrap();
            let before = est.state().clone();

            est.predict();

            assert_eq!(est.state().mean, before.mean);
            for i in 0..4 {
                assert!(
                    est.state().covariance.variance(i) > before.covariance.variance(i),
                    "variance {i} did not grow for dt={dt}"
                );
            }
        }
    }

    #[test]
    fn test_update_at_prediction_keeps_mean_and_shrinks_trace() {
        let mut est = TargetEstimator::at_rest([10.0, 5.0], 1.0, 30.0, 1.0).unwrap();
        est.predict();
        let before = est.state().clone();

        let z = est.predicted_measurement();
        est.update(&z).unwrap();

        for i in 0..4 {
            assert!((est.state().mean.index(i) - before.mean.index(i)).abs() < 1e-12);
        }
        assert!(est.uncertainty() < before.uncertainty());
        assert!(est.state().covariance.is_symmetric(0.0));
    }

    #[test]
    fn test_kalman_update_moves_toward_measurement() {
        let filter = cv_filter(0.1, 1.0);
        let state = KalmanState::new(
            StateVector::from_array([0.0, 0.0, 0.0, 0.0]),
            StateCovariance::identity().scale(100.0),
        );

        let updated = filter
            .update(&state, &Measurement::from_array([10.0, 5.0]))
            .unwrap();

        assert!(*updated.mean.index(0) > 5.0);
        assert!(*updated.mean.index(1) > 2.0);
        assert!(updated.uncertainty() < state.uncertainty());
    }

    #[test]
    fn test_singular_innovation_is_numerical_error() {
        // P = 0 and R forced to zero through an explicit zero-variance sensor
        let filter = KalmanFilter::new(
            ConstantVelocity2D::new(0.0).unwrap(),
            PositionSensor2D { variance: 0.0 },
        );
        let state = KalmanState::new(StateVector::zeros(), StateCovariance::zeros());

        let mut est = TargetEstimator::new(filter, state.clone(), 1.0).unwrap();
        let err = est.update(&Measurement::from_array([1.0, 1.0])).unwrap_err();

        assert!(matches!(err, TrackerError::Numerical(_)));
        assert_eq!(est.state(), &state);
    }

    #[test]
    fn test_innovation_covariance_exposed() {
        let est = TargetEstimator::at_rest([0.0, 0.0], 1.0, 30.0, 1.0).unwrap();
        let s = est.innovation_covariance();

        assert!((s.as_matrix()[(0, 0)] - (INITIAL_VARIANCE + 30.0)).abs() < 1e-9);
        assert!((s.as_matrix()[(1, 1)] - (INITIAL_VARIANCE + 30.0)).abs() < 1e-9);
        assert!((est.measurement_noise().trace() - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_mahalanobis_distance() {
        let filter = cv_filter(0.1, 1.0);
        let state = KalmanState::new(StateVector::zeros(), StateCovariance::identity());

        let close = filter
            .mahalanobis_distance_squared(&state, &Measurement::from_array([0.0, 0.0]))
            .unwrap();
        let far = filter
            .mahalanobis_distance_squared(&state, &Measurement::from_array([10.0, 10.0]))
            .unwrap();

        assert!(close < 1e-12);
        // S = 2I, so d² = (100 + 100) / 2
        assert!((far - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_tracks_constant_velocity_target() {
        let mut est = TargetEstimator::at_rest([0.0, 0.0], 0.01, 1.0, 1.0).unwrap();

        for t in 1..=30 {
            est.predict();
            let truth = [3.0 * t as f64, -2.0 * t as f64];
            est.update(&Measurement::from_array(truth)).unwrap();
        }

        let [vx, vy] = est.velocity();
        assert!((vx - 3.0).abs() < 0.1, "vx = {vx}");
        assert!((vy + 2.0).abs() < 0.1, "vy = {vy}");
    }

    #[test]
    fn test_invalid_dt_rejected() {
        assert!(TargetEstimator::at_rest([0.0, 0.0], 1.0, 1.0, 0.0).is_err());
        assert!(TargetEstimator::at_rest([0.0, 0.0], 1.0, 0.0, 1.0).is_err());
    }
}
