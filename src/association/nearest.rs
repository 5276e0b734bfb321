//! Nearest-neighbor association

use nalgebra::RealField;

use super::traits::{Association, AssociationInfo, DataAssociator};
use crate::types::spaces::Measurement;

/// Picks the gated measurement closest (Euclidean) to the prediction.
///
/// Ties go to the measurement that appears first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NearestNeighbor;

impl<T: RealField + Copy, const M: usize> DataAssociator<T, M> for NearestNeighbor {
    fn choose(
        &self,
        predicted: &Measurement<T, M>,
        gated: &[Measurement<T, M>],
    ) -> Option<Association<T, M>> {
        let mut best: Option<(usize, T)> = None;

        for (i, z) in gated.iter().enumerate() {
            let d = z.distance(predicted);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((i, d)),
            }
        }

        best.map(|(index, _)| Association {
            measurement: gated[index],
            info: AssociationInfo::Nearest { index },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z(x: f64, y: f64) -> Measurement<f64, 2> {
        Measurement::from_array([x, y])
    }

    #[test]
    fn test_nearest_neighbor_choice() {
        let gated = [z(0.0, 0.0), z(1.0, 1.0), z(5.0, 5.0)];
        let result = NearestNeighbor.choose(&z(0.4, 0.4), &gated).unwrap();

        assert_eq!(result.measurement, z(0.0, 0.0));
        assert_eq!(result.info, AssociationInfo::Nearest { index: 0 });
    }

    #[test]
    fn test_empty_gate_yields_none() {
        assert!(DataAssociator::<f64, 2>::choose(&NearestNeighbor, &z(0.0, 0.0), &[]).is_none());
    }

    #[test]
    fn test_tie_goes_to_first() {
        let gated = [z(5.0, 0.0), z(-5.0, 0.0), z(0.0, 5.0)];
        let result = NearestNeighbor.choose(&z(0.0, 0.0), &gated).unwrap();
        assert_eq!(result.info, AssociationInfo::Nearest { index: 0 });
    }
}
