// navslam_core/src/mapping/mod.rs

use nalgebra::{Matrix2, Vector2};

use crate::types::LandmarkId;

// --- Map Data Structures ---

/// The current belief about one mapped landmark.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkEstimate {
    pub id: LandmarkId,
    pub mean: Vector2<f64>,
    /// The landmark's 2x2 marginal covariance.
    pub covariance: Matrix2<f64>,
}

impl LandmarkEstimate {
    /// Semi-axes and orientation of the 1-sigma uncertainty ellipse:
    /// `(major, minor, angle)` with the angle of the major axis in radians.
    pub fn uncertainty_ellipse(&self) -> (f64, f64, f64) {
        let eigen = self.covariance.symmetric_eigen();
        let (major_idx, minor_idx) = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
            (0, 1)
        } else {
            (1, 0)
        };
        let axis = eigen.eigenvectors.column(major_idx);
        (
            eigen.eigenvalues[major_idx].max(0.0).sqrt(),
            eigen.eigenvalues[minor_idx].max(0.0).sqrt(),
            axis[1].atan2(axis[0]),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum MapData {
    #[default]
    None, // A default variant for when no map is produced.
    /// Every landmark that has been seen at least once, in table order.
    FeatureMap { landmarks: Vec<LandmarkEstimate> },
}

impl MapData {
    pub fn landmarks(&self) -> &[LandmarkEstimate] {
        match self {
            MapData::None => &[],
            MapData::FeatureMap { landmarks } => landmarks,
        }
    }
}

// --- The Mapper Trait ("Contract") ---
/// The contract for any algorithm that performs the "Mapper" role.
/// Its job is to build a representation of the environment.
pub trait Mapper: Send + Sync {
    /// Returns a snapshot of the current map.
    fn get_map(&self) -> MapData;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_uncertainty_ellipse_of_axis_aligned_covariance() {
        let estimate = LandmarkEstimate {
            id: LandmarkId(0),
            mean: Vector2::zeros(),
            covariance: Matrix2::new(0.25, 0.0, 0.0, 4.0),
        };
        let (major, minor, angle) = estimate.uncertainty_ellipse();
        assert_abs_diff_eq!(major, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(minor, 0.5, epsilon = 1e-12);
        // Major axis along +/- y.
        assert_abs_diff_eq!(angle.abs(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_map_has_no_landmarks() {
        assert!(MapData::default().landmarks().is_empty());
    }
}
