//! Measurement gating and data association
//!
//! Each target is handled independently against the shared frame: the
//! [`Gate`] discards distant detections, then a [`DataAssociator`] reduces
//! the survivors to the single observation used for the filter update.
//! Measurements are not exclusive, so two targets may use the same one.

mod gating;
mod nearest;
mod pda;
mod traits;

pub use gating::*;
pub use nearest::*;
pub use pda::*;
pub use traits::*;

use crate::config::AssociationMethod;
use crate::error::Result;
use crate::models::ObservationModel;
use crate::types::spaces::Measurement;

/// Association strategy chosen once per run.
#[derive(Debug, Clone, PartialEq)]
pub enum Associator {
    /// Closest gated measurement wins
    NearestNeighbor(NearestNeighbor),
    /// Likelihood-weighted fusion
    Probabilistic(ProbabilisticDataAssociation<f64, 2>),
}

impl Associator {
    /// Builds the strategy for `method`. PDA takes its R from `observation`,
    /// the same model the filter updates with.
    pub fn from_method<O>(method: AssociationMethod, observation: &O) -> Result<Self>
    where
        O: ObservationModel<f64, 4, 2>,
    {
        Ok(match method {
            AssociationMethod::NearestNeighbor => Associator::NearestNeighbor(NearestNeighbor),
            AssociationMethod::Probabilistic => Associator::Probabilistic(
                ProbabilisticDataAssociation::from_observation_model::<O, 4>(observation)?,
            ),
        })
    }

    /// Which method this is.
    pub fn method(&self) -> AssociationMethod {
        match self {
            Associator::NearestNeighbor(_) => AssociationMethod::NearestNeighbor,
            Associator::Probabilistic(_) => AssociationMethod::Probabilistic,
        }
    }
}

impl DataAssociator<f64, 2> for Associator {
    fn choose(
        &self,
        predicted: &Measurement<f64, 2>,
        gated: &[Measurement<f64, 2>],
    ) -> Option<Association<f64, 2>> {
        match self {
            Associator::NearestNeighbor(nn) => nn.choose(predicted, gated),
            Associator::Probabilistic(pda) => pda.choose(predicted, gated),
        }
    }
}
