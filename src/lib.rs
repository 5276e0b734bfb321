//! radartrack: radar simulation and multi-target tracking
//!
//! Simulates a range-limited radar observing point targets and tracks each
//! target with its own constant-velocity Kalman filter.
//!
//! # Features
//!
//! - **Type Safety**: State, measurement and innovation spaces encoded in the type system
//! - **Sensor Model**: Range-dependent noise and detection probability with Poisson clutter
//! - **Association**: Euclidean gating with nearest-neighbor or probabilistic data association
//! - **Reproducible Runs**: Every scan of a run is simulated from one seed

pub mod types;
pub mod models;
pub mod filters;
pub mod association;
pub mod engine;
pub mod config;
pub mod error;

pub use error::{Result, TrackerError};

pub mod prelude {
    pub use crate::types::spaces::*;
    pub use crate::types::transforms::*;
    pub use crate::models::*;
    pub use crate::filters::kalman::*;
    pub use crate::association::*;
    pub use crate::engine::*;
    pub use crate::config::*;
    pub use crate::error::{Result, TrackerError};
}
