// navslam_core/src/frames/layout.rs
use crate::frames::StateVariable;
use crate::types::LandmarkId;

/// Number of entries used by the robot pose `[x, y, theta]`.
pub const POSE_STATE_DIM: usize = 3;

/// Number of entries used by a single landmark `[x, y]`.
pub const LANDMARK_STATE_DIM: usize = 2;

/// Dimension of the joint state for `landmark_count` landmarks.
pub const fn slam_state_dim(landmark_count: usize) -> usize {
    POSE_STATE_DIM + LANDMARK_STATE_DIM * landmark_count
}

/// Returns the standard joint-state layout used by the EKF-SLAM filter.
///
/// The state is composed of:
/// - Robot position and heading (3) in the world frame, indices 0-2
/// - One `(x, y)` pair per landmark, in landmark-table order, starting at index 3
///
/// # Arguments
/// * `landmark_count`: The fixed number of landmarks known a priori.
pub fn slam_state_layout(landmark_count: usize) -> Vec<StateVariable> {
    let mut layout = Vec::with_capacity(slam_state_dim(landmark_count));
    layout.extend([StateVariable::Px, StateVariable::Py, StateVariable::Yaw]);
    for i in 0..landmark_count {
        layout.push(StateVariable::LandmarkX(LandmarkId(i)));
        layout.push(StateVariable::LandmarkY(LandmarkId(i)));
    }
    layout
}
