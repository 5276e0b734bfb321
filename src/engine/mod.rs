//! Frame-by-frame multi-target tracking
//!
//! [`TrackingEngine`] owns one run: the radar scans simulated at `reset`,
//! one [`TargetEstimator`] per target, the gate, and the association
//! strategy. Each call to [`TrackingEngine::step`] consumes one scan and
//! runs predict → gate → associate → update for every target in order.
//!
//! # Example
//!
//! ```
//! use radartrack::config::{AssociationMethod, TrackerConfig};
//! use radartrack::engine::TrackingEngine;
//! use radartrack::models::ConstantVelocityScenario;
//!
//! let trajectories = ConstantVelocityScenario::default().generate().unwrap();
//! let mut engine = TrackingEngine::new(trajectories);
//!
//! let config = TrackerConfig {
//!     num_objects: 2,
//!     association_method: AssociationMethod::Probabilistic,
//!     ..TrackerConfig::default()
//! };
//! engine.reset(config).unwrap();
//!
//! let frame = engine.step().unwrap();
//! assert_eq!(frame.frame_index, 0);
//! assert_eq!(frame.filtered_positions.len(), 2);
//! ```

mod frame;

pub use frame::*;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::association::{Associator, DataAssociator, Gate};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::filters::kalman::{CvKalmanFilter, KalmanState, TargetEstimator};
use crate::models::{
    ConstantVelocity2D, PositionSensor2D, RadarSensor, Trajectories, TrajectorySource,
};
use crate::types::spaces::{Measurement, Point2};

/// Drives one tracking run over a fixed set of ground-truth trajectories.
///
/// Created uninitialized; [`reset`](Self::reset) starts a run and may be
/// called again at any time to replace it.
#[derive(Debug, Clone)]
pub struct TrackingEngine {
    trajectories: Trajectories,
    run: Option<Run>,
}

/// State of the current run. Replaced wholesale on reset.
#[derive(Debug, Clone)]
struct Run {
    config: TrackerConfig,
    truth: Trajectories,
    frames: Vec<Vec<Measurement<f64, 2>>>,
    estimators: Vec<TargetEstimator>,
    gate: Gate<f64>,
    associator: Associator,
    track_history: Vec<Vec<Point2>>,
    measurement_history: Vec<Vec<Point2>>,
    stats: Vec<TargetStats>,
    frame_index: usize,
}

impl TrackingEngine {
    /// Creates an engine over `trajectories`, indexed `[target][frame]`.
    pub fn new(trajectories: Trajectories) -> Self {
        Self {
            trajectories,
            run: None,
        }
    }

    /// Creates an engine from any trajectory source.
    pub fn from_source<S: TrajectorySource + ?Sized>(source: &S) -> Self {
        Self::new(source.trajectories().clone())
    }

    /// Starts a new run, discarding any previous one.
    ///
    /// Uses the first `num_objects` trajectories. All radar scans are
    /// simulated here from `config.seed`, so two resets with the same
    /// configuration produce identical runs. On error the previous run is
    /// left as it was.
    pub fn reset(&mut self, config: TrackerConfig) -> Result<()> {
        let run = Run::start(&self.trajectories, config)?;
        info!(
            targets = run.estimators.len(),
            frames = run.frames.len(),
            method = %run.config.association_method,
            seed = run.config.seed,
            "tracking run reset"
        );
        self.run = Some(run);
        Ok(())
    }

    /// Processes the next frame.
    ///
    /// # Errors
    /// - [`TrackerError::NotInitialized`] before a successful reset
    /// - [`TrackerError::SequenceExhausted`] once every frame was consumed
    /// - [`TrackerError::Numerical`] if an update hits a singular innovation
    ///   covariance; nothing is committed in that case
    pub fn step(&mut self) -> Result<FrameResult> {
        self.run.as_mut().ok_or(TrackerError::NotInitialized)?.step()
    }

    /// Steps until the sequence is exhausted and returns every frame.
    pub fn run_to_end(&mut self) -> Result<Vec<FrameResult>> {
        let remaining = self.run.as_ref().ok_or(TrackerError::NotInitialized)?.remaining();
        (0..remaining).map(|_| self.step()).collect()
    }

    /// Statistics of the current run so far.
    pub fn summary(&self) -> Result<RunSummary> {
        Ok(self.run.as_ref().ok_or(TrackerError::NotInitialized)?.summary())
    }

    /// True once a reset has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.run.is_some()
    }

    /// Index of the next frame to process.
    pub fn frame_index(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.frame_index)
    }

    /// Frames in the current run.
    pub fn num_frames(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.frames.len())
    }

    /// Frames not yet processed.
    pub fn remaining_frames(&self) -> usize {
        self.run.as_ref().map_or(0, Run::remaining)
    }

    /// Filtered positions so far, per target.
    pub fn track_history(&self) -> &[Vec<Point2>] {
        self.run
            .as_ref()
            .map(|run| run.track_history.as_slice())
            .unwrap_or_default()
    }

    /// Measurements of every processed frame.
    pub fn measurement_history(&self) -> &[Vec<Point2>] {
        self.run
            .as_ref()
            .map(|run| run.measurement_history.as_slice())
            .unwrap_or_default()
    }

    /// Configuration of the current run.
    pub fn config(&self) -> Option<&TrackerConfig> {
        self.run.as_ref().map(|run| &run.config)
    }

    /// Per-target estimators of the current run.
    pub fn estimators(&self) -> &[TargetEstimator] {
        self.run
            .as_ref()
            .map(|run| run.estimators.as_slice())
            .unwrap_or_default()
    }
}

impl Run {
    fn start(trajectories: &Trajectories, config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        let truth = select_targets(trajectories, config.num_objects)?;

        let sensor = RadarSensor::new(
            config.radar_origin,
            config.max_range,
            config.sigma_base,
            config.range_ref,
            config.lambda_clutter,
        )?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let frames = sensor.simulate_all_frames(&truth, config.map_size, &mut rng)?;

        let filter = CvKalmanFilter::new(
            ConstantVelocity2D::new(config.process_noise)?,
            PositionSensor2D::new(config.measurement_noise)?,
        );
        let associator = Associator::from_method(config.association_method, &filter.observation)?;
        let gate = Gate::new(config.gate_threshold)?;

        let estimators = truth
            .iter()
            .map(|track| TargetEstimator::new(filter.clone(), KalmanState::at_rest(track[0]), config.dt))
            .collect::<Result<Vec<_>>>()?;

        let n = estimators.len();
        Ok(Self {
            config,
            truth,
            frames,
            estimators,
            gate,
            associator,
            track_history: vec![Vec::new(); n],
            measurement_history: Vec::new(),
            stats: vec![TargetStats::default(); n],
            frame_index: 0,
        })
    }

    fn remaining(&self) -> usize {
        self.frames.len() - self.frame_index
    }

    fn step(&mut self) -> Result<FrameResult> {
        let t = self.frame_index;
        let frame = self.frames.get(t).ok_or(TrackerError::SequenceExhausted {
            frames: self.frames.len(),
        })?;

        // Work on copies so a failing target leaves the run untouched.
        let mut estimators = self.estimators.clone();
        let n = estimators.len();
        let mut predicted_positions = Vec::with_capacity(n);
        let mut filtered_positions = Vec::with_capacity(n);
        let mut diagnostics = Vec::with_capacity(n);

        for (index, estimator) in estimators.iter_mut().enumerate() {
            estimator.predict();
            let predicted = estimator.predicted_measurement();

            let gated = self.gate.gate_measurement(&predicted, frame);
            let association = self.associator.choose(&predicted, &gated.gated);

            let (innovation_norm, info) = match association {
                Some(association) => {
                    estimator.update(&association.measurement).map_err(|e| {
                        warn!(frame = t, track = index, error = %e, "filter update failed");
                        e
                    })?;
                    (
                        Some(association.measurement.distance(&predicted)),
                        Some(association.info),
                    )
                }
                None => (None, None),
            };

            debug!(
                frame = t,
                track = index,
                gated = gated.len(),
                associated = info.is_some(),
                innovation = ?innovation_norm,
                "target stepped"
            );

            predicted_positions.push(predicted.to_point());
            filtered_positions.push(estimator.position());
            diagnostics.push(TargetDiagnostics {
                gated_count: gated.len(),
                associated: info.is_some(),
                innovation_norm,
                covariance_trace: estimator.uncertainty(),
                association: info,
            });
        }

        let measurements: Vec<Point2> = frame.iter().map(|z| z.to_point()).collect();

        self.estimators = estimators;
        for ((track, stats), (pos, diag)) in self
            .track_history
            .iter_mut()
            .zip(self.stats.iter_mut())
            .zip(filtered_positions.iter().zip(&diagnostics))
        {
            track.push(*pos);
            stats.record(diag);
        }
        self.measurement_history.push(measurements.clone());
        self.frame_index += 1;

        debug!(frame = t, measurements = measurements.len(), "frame processed");

        Ok(FrameResult {
            frame_index: t,
            measurements,
            predicted_positions,
            filtered_positions,
            track_history: self.track_history.clone(),
            measurement_history: self.measurement_history.clone(),
            truth_positions: self.truth.iter().map(|track| track[t]).collect(),
            diagnostics,
        })
    }

    fn summary(&self) -> RunSummary {
        let targets = self
            .estimators
            .iter()
            .zip(&self.stats)
            .zip(self.track_history.iter().zip(&self.truth))
            .map(|((estimator, stats), (track, truth))| TargetSummary {
                updates: stats.updates,
                coasts: stats.coasts,
                mean_innovation_norm: stats.mean_innovation_norm(),
                mean_covariance_trace: stats.mean_covariance_trace(),
                position_rmse: position_rmse(track, truth),
                final_position: estimator.position(),
                final_velocity: estimator.velocity(),
            })
            .collect();

        RunSummary {
            association_method: self.config.association_method,
            frames_processed: self.frame_index,
            num_frames: self.frames.len(),
            targets,
        }
    }
}

/// Takes the first `count` trajectories and cuts them to a common length.
fn select_targets(trajectories: &Trajectories, count: usize) -> Result<Trajectories> {
    if count > trajectories.len() {
        return Err(TrackerError::config(format!(
            "num_objects is {count} but only {} trajectories are available",
            trajectories.len()
        )));
    }

    let selected = &trajectories[..count];
    for (i, track) in selected.iter().enumerate() {
        if track.is_empty() {
            return Err(TrackerError::config(format!("trajectory {i} has no frames")));
        }
        if !track.iter().flatten().all(|v| v.is_finite()) {
            return Err(TrackerError::config(format!(
                "trajectory {i} contains non-finite positions"
            )));
        }
    }

    let len = selected.iter().map(Vec::len).min().unwrap_or(0);
    Ok(selected.iter().map(|track| track[..len].to_vec()).collect())
}
