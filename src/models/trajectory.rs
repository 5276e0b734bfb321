//! Ground-truth trajectories consumed by the tracking engine

use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, TrackerError};
use crate::types::spaces::Point2;

/// True positions indexed `[target][frame]`.
pub type Trajectories = Vec<Vec<Point2>>;

/// Supplier of precomputed ground-truth positions.
pub trait TrajectorySource {
    /// All available trajectories, indexed `[target][frame]`.
    fn trajectories(&self) -> &Trajectories;
}

impl TrajectorySource for Trajectories {
    fn trajectories(&self) -> &Trajectories {
        self
    }
}

/// Straight-line targets with random start positions and velocities.
///
/// Start positions are uniform in `[0, box_size]²` and velocity components
/// uniform in `velocity_range`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantVelocityScenario {
    /// Side length of the start region
    pub box_size: f64,
    /// Number of targets
    pub num_targets: usize,
    /// Number of frames per target
    pub num_frames: usize,
    /// Inclusive range for each velocity component
    pub velocity_range: (f64, f64),
    /// Time between frames
    pub dt: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for ConstantVelocityScenario {
    fn default() -> Self {
        Self {
            box_size: 1000.0,
            num_targets: 3,
            num_frames: 100,
            velocity_range: (-20.0, 20.0),
            dt: 1.0,
            seed: 42,
        }
    }
}

impl ConstantVelocityScenario {
    /// Generates the trajectories.
    pub fn generate(&self) -> Result<Trajectories> {
        if !self.box_size.is_finite() || self.box_size <= 0.0 {
            return Err(TrackerError::config("scenario box size must be positive"));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(TrackerError::config("scenario dt must be positive"));
        }
        let (vmin, vmax) = self.velocity_range;
        let start = Uniform::new_inclusive(0.0, self.box_size)
            .map_err(|e| TrackerError::config(e.to_string()))?;
        let velocity = Uniform::new_inclusive(vmin, vmax)
            .map_err(|e| TrackerError::config(format!("velocity range: {e}")))?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let targets = (0..self.num_targets)
            .map(|_| {
                let p0 = [start.sample(&mut rng), start.sample(&mut rng)];
                let v = [velocity.sample(&mut rng), velocity.sample(&mut rng)];
                (0..self.num_frames)
                    .map(|t| {
                        let elapsed = t as f64 * self.dt;
                        [p0[0] + v[0] * elapsed, p0[1] + v[1] * elapsed]
                    })
                    .collect()
            })
            .collect();

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_shape_and_motion() {
        let scenario = ConstantVelocityScenario {
            num_targets: 4,
            num_frames: 30,
            ..Default::default()
        };
        let traj = scenario.generate().unwrap();

        assert_eq!(traj.len(), 4);
        for track in &traj {
            assert_eq!(track.len(), 30);
            assert!(track[0].iter().all(|v| (0.0..=1000.0).contains(v)));

            // Constant velocity: equal successive displacements
            let d0 = [track[1][0] - track[0][0], track[1][1] - track[0][1]];
            let d1 = [track[29][0] - track[28][0], track[29][1] - track[28][1]];
            assert!((d0[0] - d1[0]).abs() < 1e-9 && (d0[1] - d1[1]).abs() < 1e-9);
            assert!(d0.iter().all(|v| v.abs() <= 20.0));
        }
    }

    #[test]
    fn test_scenario_is_seeded() {
        let scenario = ConstantVelocityScenario::default();
        assert_eq!(scenario.generate().unwrap(), scenario.generate().unwrap());

        let other = ConstantVelocityScenario {
            seed: 7,
            ..Default::default()
        };
        assert_ne!(scenario.generate().unwrap(), other.generate().unwrap());
    }

    #[test]
    fn test_invalid_scenario_rejected() {
        let scenario = ConstantVelocityScenario {
            velocity_range: (5.0, -5.0),
            ..Default::default()
        };
        assert!(scenario.generate().is_err());
    }
}
