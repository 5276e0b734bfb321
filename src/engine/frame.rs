//! Per-frame output and end-of-run statistics

use serde::Serialize;

use crate::association::AssociationInfo;
use crate::config::AssociationMethod;
use crate::types::spaces::Point2;

/// Per-target diagnostics for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetDiagnostics {
    /// Measurements that survived the gate
    pub gated_count: usize,
    /// Whether the filter was updated this frame
    pub associated: bool,
    /// ‖z̄ − H x_pred‖ when updated
    pub innovation_norm: Option<f64>,
    /// trace(P) after the step
    pub covariance_trace: f64,
    /// Association details when updated
    pub association: Option<AssociationInfo<f64>>,
}

/// Everything produced by one engine step.
///
/// Every per-target list has one entry per tracked target, in target order.
/// Histories include the current frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    /// Index of the frame just processed
    pub frame_index: usize,
    /// The frame's detections and clutter, untagged
    pub measurements: Vec<Point2>,
    /// H x after predict, before update
    pub predicted_positions: Vec<Point2>,
    /// Position estimate after update
    pub filtered_positions: Vec<Point2>,
    /// Filtered positions so far, per target
    pub track_history: Vec<Vec<Point2>>,
    /// Every frame's measurements so far
    pub measurement_history: Vec<Vec<Point2>>,
    /// Ground truth at this frame
    pub truth_positions: Vec<Point2>,
    /// Per-target gate/association/filter diagnostics
    pub diagnostics: Vec<TargetDiagnostics>,
}

/// Accumulated statistics of one target over a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSummary {
    /// Frames with a filter update
    pub updates: usize,
    /// Frames without any associated measurement
    pub coasts: usize,
    /// Mean innovation norm over updated frames
    pub mean_innovation_norm: Option<f64>,
    /// Mean trace(P) over processed frames
    pub mean_covariance_trace: Option<f64>,
    /// Root-mean-square distance between filtered and true positions
    pub position_rmse: Option<f64>,
    /// Last filtered position
    pub final_position: Point2,
    /// Last velocity estimate
    pub final_velocity: Point2,
}

/// Statistics for the current run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Method the run was configured with
    pub association_method: AssociationMethod,
    /// Frames stepped so far
    pub frames_processed: usize,
    /// Frames available in the run
    pub num_frames: usize,
    /// One entry per target
    pub targets: Vec<TargetSummary>,
}

impl RunSummary {
    /// Fraction of target-frames that ended with an update.
    pub fn update_ratio(&self) -> Option<f64> {
        let (updates, total) = self
            .targets
            .iter()
            .fold((0usize, 0usize), |(u, n), t| (u + t.updates, n + t.updates + t.coasts));
        (total > 0).then(|| updates as f64 / total as f64)
    }
}

/// Running sums from which a [`TargetSummary`] is derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TargetStats {
    pub updates: usize,
    pub coasts: usize,
    pub innovation_sum: f64,
    pub trace_sum: f64,
}

impl TargetStats {
    pub fn record(&mut self, diagnostics: &TargetDiagnostics) {
        match diagnostics.innovation_norm {
            Some(norm) if diagnostics.associated => {
                self.updates += 1;
                self.innovation_sum += norm;
            }
            _ => self.coasts += 1,
        }
        self.trace_sum += diagnostics.covariance_trace;
    }

    pub fn mean_innovation_norm(&self) -> Option<f64> {
        (self.updates > 0).then(|| self.innovation_sum / self.updates as f64)
    }

    pub fn mean_covariance_trace(&self) -> Option<f64> {
        let frames = self.updates + self.coasts;
        (frames > 0).then(|| self.trace_sum / frames as f64)
    }
}

/// RMS distance between paired positions, `None` if there are none.
pub(crate) fn position_rmse(track: &[Point2], truth: &[Point2]) -> Option<f64> {
    let n = track.len().min(truth.len());
    if n == 0 {
        return None;
    }
    let sum_sq: f64 = track
        .iter()
        .zip(truth)
        .map(|(a, b)| (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2))
        .sum();
    Some((sum_sq / n as f64).sqrt())
}
