//! Euclidean measurement gating
//!
//! Cheaply discards detections that are too far from a target's predicted
//! position before the association step sees them. The distance is plain
//! Euclidean, not normalized by the innovation covariance, so the gate size
//! does not adapt to how uncertain the track currently is.

use nalgebra::RealField;
use num_traits::Float;

use crate::error::{Result, TrackerError};
use crate::types::spaces::Measurement;

/// Measurements that passed the gate, plus diagnostics for all inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome<T: RealField, const M: usize> {
    /// Retained measurements, in input order
    pub gated: Vec<Measurement<T, M>>,
    /// Input index of each retained measurement
    pub indices: Vec<usize>,
    /// Distance from the prediction to every input measurement
    pub distances: Vec<T>,
}

impl<T: RealField, const M: usize> GateOutcome<T, M> {
    /// Returns true if nothing passed the gate.
    pub fn is_empty(&self) -> bool {
        self.gated.is_empty()
    }

    /// Number of retained measurements.
    pub fn len(&self) -> usize {
        self.gated.len()
    }
}

/// Keeps measurements within `threshold` (inclusive) of `predicted`.
pub fn gate_measurement<T: RealField + Copy, const M: usize>(
    predicted: &Measurement<T, M>,
    measurements: &[Measurement<T, M>],
    threshold: T,
) -> GateOutcome<T, M> {
    let distances: Vec<T> = measurements.iter().map(|z| z.distance(predicted)).collect();

    let (indices, gated) = measurements
        .iter()
        .zip(&distances)
        .enumerate()
        .filter(|(_, (_, d))| **d <= threshold)
        .map(|(i, (z, _))| (i, *z))
        .unzip();

    GateOutcome {
        gated,
        indices,
        distances,
    }
}

/// A fixed-size Euclidean gate shared by every target in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate<T: RealField> {
    threshold: T,
}

impl<T: RealField + Float + Copy> Gate<T> {
    /// Creates a gate. The threshold must be positive and finite.
    pub fn new(threshold: T) -> Result<Self> {
        if !Float::is_finite(threshold) || threshold <= T::zero() {
            return Err(TrackerError::config(
                "gate threshold must be finite and positive",
            ));
        }
        Ok(Self { threshold })
    }

    /// Gate radius.
    pub fn threshold(&self) -> T {
        self.threshold
    }

    /// Applies the gate around `predicted`.
    pub fn gate_measurement<const M: usize>(
        &self,
        predicted: &Measurement<T, M>,
        measurements: &[Measurement<T, M>],
    ) -> GateOutcome<T, M> {
        gate_measurement(predicted, measurements, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z(x: f64, y: f64) -> Measurement<f64, 2> {
        Measurement::from_array([x, y])
    }

    #[test]
    fn test_gate_keeps_order_and_reports_all_distances() {
        let gate = Gate::new(10.0).unwrap();
        let predicted = z(0.0, 0.0);
        let measurements = [z(3.0, 4.0), z(100.0, 0.0), z(-6.0, 8.0), z(0.0, 11.0)];

        let outcome = gate.gate_measurement(&predicted, &measurements);

        assert_eq!(outcome.gated, vec![z(3.0, 4.0), z(-6.0, 8.0)]);
        assert_eq!(outcome.indices, vec![0, 2]);
        assert_eq!(outcome.distances.len(), 4);
        assert!((outcome.distances[1] - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_gate_boundary_is_inclusive() {
        let predicted = z(1.0, 1.0);
        let on_boundary = z(4.0, 5.0); // distance exactly 5
        let just_outside = z(4.0, 5.0 + 1e-9);

        let outcome = gate_measurement(&predicted, &[on_boundary, just_outside], 5.0);

        assert_eq!(outcome.gated, vec![on_boundary]);
        assert_eq!(outcome.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let outcome = gate_measurement::<f64, 2>(&z(0.0, 0.0), &[], 5.0);
        assert!(outcome.is_empty());
        assert!(outcome.distances.is_empty());
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(Gate::new(0.0).is_err());
        assert!(Gate::new(-1.0).is_err());
        assert!(Gate::new(f64::NAN).is_err());
    }
}
