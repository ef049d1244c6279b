// navslam_core/src/frames.rs

pub mod layout;

use nalgebra::{DMatrix, DVector, Matrix2, Matrix3, Vector2};

use crate::types::{Covariance, LandmarkId, Pose2D, State};

/// An enum that defines every variable that can exist in the joint SLAM state.
/// All of them are expressed in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariable {
    // --- Robot pose ---
    Px,
    Py,
    Yaw,
    // --- Static landmark positions ---
    LandmarkX(LandmarkId),
    LandmarkY(LandmarkId),
}

/// The state object owned by the filter. It bundles the state vector with its
/// schema (the layout), covariance, the per-landmark lifecycle flags and the
/// filter clock.
#[derive(Debug, Clone)]
pub struct SlamState {
    /// The ordered "schema" of the state vector.
    pub layout: Vec<StateVariable>,
    /// The joint mean `x`: robot pose followed by landmark positions.
    pub vector: State,
    /// The covariance matrix `P`.
    pub covariance: Covariance,
    /// `true` once a landmark has been initialized from its first sighting.
    /// Indexed by `LandmarkId.0`; never flips back to `false`.
    pub landmark_seen: Vec<bool>,
    /// Accumulated prediction time.
    pub last_update_timestamp: f64,
}

impl SlamState {
    /// Creates a state for the given layout. The pose block is seeded from
    /// `pose`, the landmark means are zero and the covariance is diagonal with
    /// `pose_variance` on the pose entries and `landmark_variance` elsewhere.
    ///
    /// The variances are not spread over whole blocks: every off-diagonal
    /// entry starts at zero, including those between two landmarks and
    /// between the x and y of one landmark. Correlations only appear through
    /// corrections.
    pub fn new(
        layout: Vec<StateVariable>,
        pose: Pose2D,
        pose_variance: f64,
        landmark_variance: f64,
    ) -> Self {
        let dim = layout.len();
        let landmark_count = layout
            .iter()
            .filter(|v| matches!(v, StateVariable::LandmarkX(_)))
            .count();

        let mut vector = DVector::zeros(dim);
        let mut diagonal = DVector::from_element(dim, landmark_variance);
        for (i, var) in layout.iter().enumerate() {
            match var {
                StateVariable::Px => {
                    vector[i] = pose.x;
                    diagonal[i] = pose_variance;
                }
                StateVariable::Py => {
                    vector[i] = pose.y;
                    diagonal[i] = pose_variance;
                }
                StateVariable::Yaw => {
                    vector[i] = pose.theta;
                    diagonal[i] = pose_variance;
                }
                _ => {}
            }
        }

        Self {
            layout,
            vector,
            covariance: DMatrix::from_diagonal(&diagonal),
            landmark_seen: vec![false; landmark_count],
            last_update_timestamp: 0.0,
        }
    }

    /// Returns the dimension (number of rows) of the state vector.
    pub fn dim(&self) -> usize {
        self.layout.len()
    }

    /// Number of landmark slots in the state.
    pub fn landmark_count(&self) -> usize {
        self.landmark_seen.len()
    }

    /// Finds the index of a specific `StateVariable` in the layout.
    pub fn find_idx(&self, var: &StateVariable) -> Option<usize> {
        self.layout.iter().position(|v| v == var)
    }

    /// The filter's current pose belief. Assumes the standard layout where the
    /// pose occupies indices 0..3 (validated by the estimator constructor).
    pub fn pose(&self) -> Pose2D {
        Pose2D {
            x: self.vector[0],
            y: self.vector[1],
            theta: self.vector[2],
        }
    }

    /// 3x3 covariance of the robot pose.
    pub fn pose_covariance(&self) -> Matrix3<f64> {
        self.covariance.fixed_view::<3, 3>(0, 0).into_owned()
    }

    pub fn is_seen(&self, id: LandmarkId) -> bool {
        self.landmark_seen.get(id.0).copied().unwrap_or(false)
    }

    /// Index of the landmark's x entry (y follows immediately).
    pub fn landmark_idx(&self, id: LandmarkId) -> Option<usize> {
        self.find_idx(&StateVariable::LandmarkX(id))
    }

    /// Current mean of a landmark. Returned even when the landmark is unseen,
    /// in which case it is the (meaningless) zero prior.
    pub fn landmark_mean(&self, id: LandmarkId) -> Option<Vector2<f64>> {
        let idx = self.landmark_idx(id)?;
        Some(Vector2::new(self.vector[idx], self.vector[idx + 1]))
    }

    /// The 2x2 covariance block of a landmark.
    pub fn landmark_covariance(&self, id: LandmarkId) -> Option<Matrix2<f64>> {
        let idx = self.landmark_idx(id)?;
        Some(self.covariance.fixed_view::<2, 2>(idx, idx).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::layout::slam_state_layout;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_state_seeds_pose_and_diagonal_covariance() {
        let layout = slam_state_layout(2);
        let state = SlamState::new(layout, Pose2D::new(1.0, 2.0, 0.5), 0.001, 1000.0);

        assert_eq!(state.dim(), 7);
        assert_eq!(state.landmark_count(), 2);
        assert_eq!(state.pose(), Pose2D::new(1.0, 2.0, 0.5));
        assert_eq!(state.covariance[(0, 0)], 0.001);
        assert_eq!(state.covariance[(2, 2)], 0.001);
        assert_eq!(state.covariance[(3, 3)], 1000.0);
        assert_eq!(state.covariance[(6, 6)], 1000.0);
        assert_eq!(state.covariance[(0, 1)], 0.0);
        assert_eq!(state.covariance[(3, 4)], 0.0);
        assert!(!state.is_seen(LandmarkId(0)));
        assert!(!state.is_seen(LandmarkId(5)));
    }

    #[test]
    fn test_initial_covariance_has_no_cross_terms() {
        let state = SlamState::new(slam_state_layout(3), Pose2D::default(), 0.001, 1000.0);
        let p = &state.covariance;
        for i in 0..state.dim() {
            for j in 0..state.dim() {
                if i != j {
                    assert_eq!(p[(i, j)], 0.0, "P[{i}, {j}]");
                }
            }
        }
        // Between landmarks and inside one landmark block.
        assert_eq!(p[(3, 5)], 0.0);
        assert_eq!(p[(4, 8)], 0.0);
        assert_eq!(p[(7, 8)], 0.0);
        assert_abs_diff_eq!(p.trace(), 3.0 * 0.001 + 6.0 * 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_landmark_accessors_follow_layout() {
        let mut state = SlamState::new(slam_state_layout(3), Pose2D::default(), 0.001, 1000.0);
        state.vector[7] = 4.0;
        state.vector[8] = -2.0;

        assert_eq!(state.landmark_idx(LandmarkId(2)), Some(7));
        assert_eq!(state.landmark_mean(LandmarkId(2)), Some(Vector2::new(4.0, -2.0)));
        assert_eq!(
            state.landmark_covariance(LandmarkId(1)),
            Some(Matrix2::new(1000.0, 0.0, 0.0, 1000.0))
        );
        assert_eq!(state.landmark_mean(LandmarkId(3)), None);
    }
}
