//! Target, sensor, and scenario models
//!
//! The traits here describe target dynamics and the sensor as seen by the
//! filter. [`RadarSensor`] and [`ConstantVelocityScenario`] produce the
//! simulated data those filters consume.

mod transition;
mod observation;
mod clutter;
mod radar;
mod trajectory;

pub use transition::*;
pub use observation::*;
pub use clutter::*;
pub use radar::*;
pub use trajectory::*;
