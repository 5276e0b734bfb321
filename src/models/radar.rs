//! Radar sensor simulation
//!
//! Turns true target positions into a scan of lossy, noisy detections mixed
//! with Poisson clutter. Detection probability falls off with range and the
//! measurement noise grows quadratically with range.
//!
//! All randomness comes from the caller's RNG so a whole run can be replayed
//! from a single seed.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{Result, TrackerError};
use crate::models::{UniformSquareClutter, MAX_CLUTTER_RATE};
use crate::types::spaces::{Measurement, Point2};

/// Peak detection probability at zero range.
pub const DEFAULT_MAX_DETECTION_PROBABILITY: f64 = 0.95;

/// Exponent of the detection fall-off curve.
pub const DEFAULT_DETECTION_EXPONENT: f64 = 2.0;

/// Parameters and behavior of the simulated radar.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarSensor {
    origin: Point2,
    max_range: f64,
    sigma_base: f64,
    range_ref: f64,
    clutter_rate: f64,
    p_max: f64,
    exponent: f64,
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrackerError::config(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

impl RadarSensor {
    /// Creates a radar at `origin`.
    ///
    /// # Arguments
    /// - `max_range`: Range beyond which nothing is detected
    /// - `sigma_base`: Noise standard deviation at `range_ref`
    /// - `range_ref`: Reference range for the noise model
    /// - `clutter_rate`: Expected false alarms per scan, up to [`MAX_CLUTTER_RATE`]
    pub fn new(
        origin: Point2,
        max_range: f64,
        sigma_base: f64,
        range_ref: f64,
        clutter_rate: f64,
    ) -> Result<Self> {
        if !origin.iter().all(|v| v.is_finite()) {
            return Err(TrackerError::config("radar origin must be finite"));
        }
        require_positive("max_range", max_range)?;
        require_positive("sigma_base", sigma_base)?;
        require_positive("range_ref", range_ref)?;
        require_positive("lambda_clutter", clutter_rate)?;
        if clutter_rate > MAX_CLUTTER_RATE {
            return Err(TrackerError::config(format!(
                "lambda_clutter must be at most {MAX_CLUTTER_RATE}, got {clutter_rate}"
            )));
        }

        Ok(Self {
            origin,
            max_range,
            sigma_base,
            range_ref,
            clutter_rate,
            p_max: DEFAULT_MAX_DETECTION_PROBABILITY,
            exponent: DEFAULT_DETECTION_EXPONENT,
        })
    }

    /// Overrides the detection curve `p_max * (1 - (r / max_range)^exponent)`.
    pub fn with_detection_curve(mut self, p_max: f64, exponent: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&p_max) {
            return Err(TrackerError::config(format!(
                "peak detection probability must be in [0, 1], got {p_max}"
            )));
        }
        require_positive("detection exponent", exponent)?;
        self.p_max = p_max;
        self.exponent = exponent;
        Ok(self)
    }

    /// Radar position.
    pub fn origin(&self) -> Point2 {
        self.origin
    }

    /// Maximum detection range.
    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    /// Expected false alarms per scan.
    pub fn clutter_rate(&self) -> f64 {
        self.clutter_rate
    }

    // ------------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------------

    /// Euclidean distance from the radar.
    pub fn range(&self, pos: Point2) -> f64 {
        let dx = pos[0] - self.origin[0];
        let dy = pos[1] - self.origin[1];
        dx.hypot(dy)
    }

    /// Component of `velocity` along the line of sight from the radar to
    /// `pos`. Positive when the target is receding. Zero at the radar itself.
    pub fn radial_velocity(&self, velocity: Point2, pos: Point2) -> f64 {
        let r = self.range(pos);
        if r == 0.0 {
            return 0.0;
        }
        let ux = (pos[0] - self.origin[0]) / r;
        let uy = (pos[1] - self.origin[1]) / r;
        velocity[0] * ux + velocity[1] * uy
    }

    // ------------------------------------------------------------------------
    // Noise and detection
    // ------------------------------------------------------------------------

    /// Measurement noise standard deviation at range `r`.
    pub fn sigma_range(&self, r: f64) -> f64 {
        let ratio = r / self.range_ref;
        self.sigma_base * ratio * ratio
    }

    /// Probability of detecting a target at range `r`; exactly zero beyond
    /// `max_range`.
    pub fn detection_probability(&self, r: f64) -> f64 {
        if r > self.max_range {
            0.0
        } else {
            self.p_max * (1.0 - (r / self.max_range).powf(self.exponent))
        }
    }

    /// Bernoulli draw with [`Self::detection_probability`].
    pub fn is_detected<R: Rng>(&self, r: f64, rng: &mut R) -> bool {
        rng.random::<f64>() < self.detection_probability(r)
    }

    /// True position plus isotropic Gaussian noise with standard deviation
    /// `sigma_range(range(true_pos))`.
    pub fn generate_measurement<R: Rng>(&self, true_pos: Point2, rng: &mut R) -> Measurement<f64, 2> {
        let sigma = self.sigma_range(self.range(true_pos));
        let nx: f64 = rng.sample(StandardNormal);
        let ny: f64 = rng.sample(StandardNormal);
        Measurement::from_array([true_pos[0] + sigma * nx, true_pos[1] + sigma * ny])
    }

    /// Poisson-distributed clutter, uniform over `[-map_size, map_size]²`.
    pub fn generate_clutter<R: Rng>(&self, map_size: f64, rng: &mut R) -> Result<Vec<Measurement<f64, 2>>> {
        Ok(self.clutter(map_size)?.sample(rng))
    }

    fn clutter(&self, map_size: f64) -> Result<UniformSquareClutter> {
        UniformSquareClutter::new(self.clutter_rate, map_size)
    }

    // ------------------------------------------------------------------------
    // Scans
    // ------------------------------------------------------------------------

    /// One scan: detections of the given true positions followed by clutter.
    ///
    /// The returned list carries no origin tags.
    pub fn simulate_frame<R: Rng>(
        &self,
        positions: &[Point2],
        map_size: f64,
        rng: &mut R,
    ) -> Result<Vec<Measurement<f64, 2>>> {
        let clutter = self.clutter(map_size)?;
        Ok(self.scan(positions, &clutter, rng))
    }

    fn scan<R: Rng>(
        &self,
        positions: &[Point2],
        clutter: &UniformSquareClutter,
        rng: &mut R,
    ) -> Vec<Measurement<f64, 2>> {
        let mut frame = Vec::with_capacity(positions.len());
        for &pos in positions {
            if self.is_detected(self.range(pos), rng) {
                frame.push(self.generate_measurement(pos, rng));
            }
        }
        frame.extend(clutter.sample(rng));
        frame
    }

    /// Simulates every frame of a trajectory set indexed `[target][frame]`.
    ///
    /// Targets with fewer frames than the longest one simply stop appearing.
    pub fn simulate_all_frames<R: Rng>(
        &self,
        trajectory: &[Vec<Point2>],
        map_size: f64,
        rng: &mut R,
    ) -> Result<Vec<Vec<Measurement<f64, 2>>>> {
        let clutter = self.clutter(map_size)?;
        let num_frames = trajectory.iter().map(Vec::len).max().unwrap_or(0);

        let frames = (0..num_frames)
            .map(|t| {
                let positions: Vec<Point2> = trajectory
                    .iter()
                    .filter_map(|track| track.get(t).copied())
                    .collect();
                self.scan(&positions, &clutter, rng)
            })
            .collect();

        Ok(frames)
    }
}
