//! Clutter models for false alarm generation
//!
//! Describes the statistical properties of clutter (false alarms) in the
//! surveillance region, and draws clutter points for the radar simulator.

use rand::distr::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Poisson;

use crate::error::{Result, TrackerError};
use crate::types::spaces::Measurement;

/// Largest accepted clutter rate (expected false alarms per scan).
///
/// Every scan's clutter is materialised, so the Poisson count has to stay
/// allocatable.
pub const MAX_CLUTTER_RATE: f64 = 1.0e6;

// ============================================================================
// Uniform Square Clutter
// ============================================================================

/// Poisson clutter spread uniformly over the square `[-half_width, half_width]²`.
#[derive(Debug, Clone)]
pub struct UniformSquareClutter {
    rate: f64,
    half_width: f64,
    count: Option<Poisson<f64>>,
    axis: Uniform<f64>,
}

impl UniformSquareClutter {
    /// Creates a clutter model.
    ///
    /// # Arguments
    /// - `rate`: Expected false alarms per scan (0 <= rate <= [`MAX_CLUTTER_RATE`])
    /// - `half_width`: Half the side length of the square region (must be > 0)
    pub fn new(rate: f64, half_width: f64) -> Result<Self> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(TrackerError::config(format!(
                "clutter rate must be finite and non-negative, got {rate}"
            )));
        }
        if rate > MAX_CLUTTER_RATE {
            return Err(TrackerError::config(format!(
                "clutter rate must be at most {MAX_CLUTTER_RATE}, got {rate}"
            )));
        }
        if !half_width.is_finite() || half_width <= 0.0 {
            return Err(TrackerError::config(format!(
                "map size must be finite and positive, got {half_width}"
            )));
        }

        let count = if rate > 0.0 {
            Some(Poisson::new(rate).map_err(|e| TrackerError::config(e.to_string()))?)
        } else {
            None
        };
        let axis = Uniform::new_inclusive(-half_width, half_width)
            .map_err(|e| TrackerError::config(e.to_string()))?;

        Ok(Self {
            rate,
            half_width,
            count,
            axis,
        })
    }

    /// Expected false alarms per scan.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Half the side length of the clutter region.
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Draws one scan's clutter: a Poisson number of uniform points.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<Measurement<f64, 2>> {
        let n = match &self.count {
            Some(poisson) => {
                let k: f64 = poisson.sample(rng);
                k as usize
            }
            None => 0,
        };

        (0..n)
            .map(|_| {
                let x = self.axis.sample(rng);
                let y = self.axis.sample(rng);
                Measurement::from_array([x, y])
            })
            .collect()
    }
}
