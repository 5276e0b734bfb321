//! Probabilistic data association
//!
//! Every gated measurement contributes to the update in proportion to its
//! Gaussian likelihood under the measurement noise R:
//!
//! ```text
//! d²ᵢ = (zᵢ - ẑ)ᵀ R⁻¹ (zᵢ - ẑ)
//! Lᵢ  = exp(-d²ᵢ / 2)
//! βᵢ  = Lᵢ / Σ L
//! z̄   = Σ βᵢ zᵢ
//! ```
//!
//! This is the simplified form without a missed-detection hypothesis: the
//! weights always sum to one and the fused point is fed to a standard
//! Kalman update. If every likelihood underflows to zero the weights fall
//! back to uniform.

use nalgebra::RealField;
use num_traits::Float;

use super::traits::{Association, AssociationInfo, DataAssociator};
use crate::error::{Result, TrackerError};
use crate::models::ObservationModel;
use crate::types::spaces::{Measurement, MeasurementCovariance};

/// PDA associator bound to a fixed measurement noise covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilisticDataAssociation<T: RealField, const M: usize> {
    noise: MeasurementCovariance<T, M>,
    noise_inv: MeasurementCovariance<T, M>,
}

impl<T: RealField + Float + Copy, const M: usize> ProbabilisticDataAssociation<T, M> {
    /// Creates the associator. Fails if `noise` is not invertible.
    pub fn new(noise: MeasurementCovariance<T, M>) -> Result<Self> {
        let noise_inv = noise.try_inverse().ok_or_else(|| {
            TrackerError::Numerical("PDA measurement noise is singular".into())
        })?;
        Ok(Self { noise, noise_inv })
    }

    /// Uses the same R as the filter update, so weighting and correction
    /// agree on how noisy a detection is.
    pub fn from_observation_model<O, const N: usize>(model: &O) -> Result<Self>
    where
        O: ObservationModel<T, N, M>,
    {
        Self::new(model.measurement_noise())
    }

    /// The R used for weighting.
    pub fn measurement_noise(&self) -> &MeasurementCovariance<T, M> {
        &self.noise
    }

    /// Normalized association weights for `gated` around `predicted`.
    ///
    /// Empty input gives an empty vector.
    pub fn weights(&self, predicted: &Measurement<T, M>, gated: &[Measurement<T, M>]) -> Vec<T> {
        if gated.is_empty() {
            return Vec::new();
        }

        let half: T = nalgebra::convert(0.5);
        let likelihoods: Vec<T> = gated
            .iter()
            .map(|z| {
                let diff = z.as_svector() - predicted.as_svector();
                let d2 = (diff.transpose() * self.noise_inv.as_matrix() * diff)[(0, 0)];
                Float::exp(-d2 * half)
            })
            .collect();

        let total = likelihoods.iter().fold(T::zero(), |acc, l| acc + *l);

        if total > T::zero() && Float::is_finite(total) {
            likelihoods.into_iter().map(|l| l / total).collect()
        } else {
            let uniform = T::one() / nalgebra::convert::<f64, T>(gated.len() as f64);
            vec![uniform; gated.len()]
        }
    }
}

impl<T: RealField + Float + Copy, const M: usize> DataAssociator<T, M>
    for ProbabilisticDataAssociation<T, M>
{
    fn choose(
        &self,
        predicted: &Measurement<T, M>,
        gated: &[Measurement<T, M>],
    ) -> Option<Association<T, M>> {
        if gated.is_empty() {
            return None;
        }

        let weights = self.weights(predicted, gated);
        let fused = gated
            .iter()
            .zip(&weights)
            .fold(Measurement::zeros(), |acc, (z, w)| acc + *z * *w);

        Some(Association {
            measurement: fused,
            info: AssociationInfo::Probabilistic { weights },
        })
    }
}
