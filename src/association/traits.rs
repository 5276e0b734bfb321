//! Association interface and result types
//!
//! An associator reduces the gated measurements of one target to a single
//! effective observation, or to nothing when the gate was empty.

use nalgebra::RealField;
use serde::Serialize;

use crate::types::spaces::Measurement;

/// Auxiliary output of an association, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssociationInfo<T> {
    /// Index of the chosen measurement within the gated set
    Nearest {
        /// Position in the gated slice
        index: usize,
    },
    /// Association probability of every gated measurement
    Probabilistic {
        /// One weight per gated measurement, summing to one
        weights: Vec<T>,
    },
}

/// The observation an associator hands to the filter update.
#[derive(Debug, Clone, PartialEq)]
pub struct Association<T: RealField, const M: usize> {
    /// Chosen measurement or fused pseudo-measurement
    pub measurement: Measurement<T, M>,
    /// How it was obtained
    pub info: AssociationInfo<T>,
}

/// Reduces a gated measurement set to one effective observation.
pub trait DataAssociator<T: RealField, const M: usize> {
    /// Returns `None` when `gated` is empty.
    fn choose(
        &self,
        predicted: &Measurement<T, M>,
        gated: &[Measurement<T, M>],
    ) -> Option<Association<T, M>>;
}
