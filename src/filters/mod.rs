//! Single-target state estimation
//!
//! - [`kalman::KalmanFilter`]: Linear Kalman filter over a motion and sensor model
//! - [`kalman::TargetEstimator`]: Per-target filter state owned by the tracking engine

pub mod kalman;
