//! Property tests for gating, association, and the Kalman update

mod common;

use common::make_measurement;
use proptest::prelude::*;
use radartrack::association::{
    gate_measurement, AssociationInfo, DataAssociator, NearestNeighbor,
    ProbabilisticDataAssociation,
};
use radartrack::filters::kalman::TargetEstimator;
use radartrack::types::spaces::{Measurement, MeasurementCovariance};

fn points(max: usize) -> impl Strategy<Value = Vec<Measurement<f64, 2>>> {
    prop::collection::vec((-500.0..500.0f64, -500.0..500.0f64), 0..max)
        .prop_map(|v| v.into_iter().map(|(x, y)| make_measurement(x, y)).collect())
}

proptest! {
    #[test]
    fn gate_keeps_exactly_the_points_inside(
        measurements in points(30),
        px in -500.0..500.0f64,
        py in -500.0..500.0f64,
        threshold in 1.0..400.0f64,
    ) {
        let predicted = make_measurement(px, py);
        let outcome = gate_measurement(&predicted, &measurements, threshold);

        prop_assert_eq!(outcome.distances.len(), measurements.len());
        let expected: Vec<usize> = outcome
            .distances
            .iter()
            .enumerate()
            .filter(|(_, d)| **d <= threshold)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(&outcome.indices, &expected);
        for (z, i) in outcome.gated.iter().zip(&outcome.indices) {
            prop_assert_eq!(z, &measurements[*i]);
        }
    }

    #[test]
    fn nearest_neighbor_is_closest(
        gated in points(20),
        px in -500.0..500.0f64,
        py in -500.0..500.0f64,
    ) {
        let predicted = make_measurement(px, py);
        match NearestNeighbor.choose(&predicted, &gated) {
            None => prop_assert!(gated.is_empty()),
            Some(result) => {
                let best = result.measurement.distance(&predicted);
                for z in &gated {
                    prop_assert!(best <= z.distance(&predicted));
                }
                match result.info {
                    AssociationInfo::Nearest { index } => {
                        prop_assert_eq!(&gated[index], &result.measurement);
                        for z in &gated[..index] {
                            prop_assert!(z.distance(&predicted) > best);
                        }
                    }
                    other => prop_assert!(false, "unexpected info {:?}", other),
                }
            }
        }
    }

    #[test]
    fn pda_weights_form_a_distribution(
        gated in points(15),
        px in -500.0..500.0f64,
        py in -500.0..500.0f64,
        variance in 0.5..5000.0f64,
    ) {
        let pda = ProbabilisticDataAssociation::new(
            MeasurementCovariance::identity().scale(variance),
        ).unwrap();
        let predicted = make_measurement(px, py);
        let weights = pda.weights(&predicted, &gated);

        prop_assert_eq!(weights.len(), gated.len());
        if !gated.is_empty() {
            let sum: f64 = weights.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            prop_assert!(weights.iter().all(|w| (0.0..=1.0 + 1e-12).contains(w)));

            // Fused point is a convex combination of the inputs.
            let fused = pda.choose(&predicted, &gated).unwrap().measurement;
            for axis in 0..2 {
                let lo = gated.iter().map(|z| *z.index(axis)).fold(f64::INFINITY, f64::min);
                let hi = gated.iter().map(|z| *z.index(axis)).fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(*fused.index(axis) >= lo - 1e-6);
                prop_assert!(*fused.index(axis) <= hi + 1e-6);
            }
        }
    }

    #[test]
    fn update_at_prediction_shrinks_uncertainty(
        x in -5000.0..5000.0f64,
        y in -5000.0..5000.0f64,
        q in 0.01..10.0f64,
        r in 1.0..100.0f64,
    ) {
        let mut estimator = TargetEstimator::at_rest([x, y], q, r, 1.0).unwrap();
        estimator.predict();
        let before = estimator.uncertainty();
        let z = estimator.predicted_measurement();

        estimator.update(&z).unwrap();

        prop_assert!(estimator.uncertainty() < before);
        prop_assert!((estimator.position()[0] - x).abs() < 1e-6);
        prop_assert!((estimator.position()[1] - y).abs() < 1e-6);
        prop_assert!(estimator.state().covariance.is_symmetric(1e-9));
    }
}
