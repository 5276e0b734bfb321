//! Common helpers for tracking engine integration tests

#![allow(dead_code)]

use radartrack::config::{AssociationMethod, TrackerConfig};
use radartrack::models::Trajectories;
use radartrack::types::spaces::Measurement;

/// Creates a measurement at given position
pub fn make_measurement(x: f64, y: f64) -> Measurement<f64, 2> {
    Measurement::from_array([x, y])
}

/// Run configuration with light clutter and the given method
pub fn make_config(num_objects: usize, method: AssociationMethod) -> TrackerConfig {
    TrackerConfig {
        num_objects,
        association_method: method,
        lambda_clutter: 10.0,
        ..TrackerConfig::default()
    }
}

/// Straight-line targets 600 m apart, 1-3 km from the radar
pub fn make_trajectories(targets: usize, frames: usize) -> Trajectories {
    (0..targets)
        .map(|i| {
            let i = i as f64;
            let start = [800.0 + 600.0 * i, 1200.0 - 300.0 * i];
            let velocity = [4.0 - 2.0 * i, 3.0 + i];
            (0..frames)
                .map(|t| {
                    let t = t as f64;
                    [start[0] + velocity[0] * t, start[1] + velocity[1] * t]
                })
                .collect()
        })
        .collect()
}

/// Mean Euclidean distance between a track and its truth
pub fn mean_error(track: &[[f64; 2]], truth: &[[f64; 2]]) -> f64 {
    let total: f64 = track
        .iter()
        .zip(truth)
        .map(|(a, b)| ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt())
        .sum();
    total / track.len().min(truth.len()) as f64
}
