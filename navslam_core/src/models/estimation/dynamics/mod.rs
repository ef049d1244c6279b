// navslam_core/src/models/estimation/dynamics/mod.rs

use dyn_clone::DynClone;
use nalgebra::Matrix3;
use std::fmt::Debug;

use crate::types::{Pose2D, VelocityCommand};

/// A trait for the robot motion models used within state estimators.
///
/// This model's primary responsibilities are to propagate the pose forward in
/// time (`propagate`) and to provide the Jacobian of that propagation with
/// respect to the pose, which is essential for the EKF covariance prediction.
pub trait EstimationDynamics: DynClone + Debug + Send + Sync {
    /// Advances `pose` by applying the velocity command `u` for `dt` seconds.
    /// The returned heading is wrapped to (-pi, pi].
    ///
    /// # Arguments
    /// * `pose`: Pose at the start of the step.
    /// * `u`: Body-frame velocity command, assumed constant over `dt`.
    /// * `dt`: Time step duration in seconds. Must be non-negative.
    fn propagate(&self, pose: &Pose2D, u: &VelocityCommand, dt: f64) -> Pose2D;

    /// Calculates the Jacobian `F = ∂f/∂(x, y, theta)` of `propagate`,
    /// linearized at the pre-step pose.
    fn calculate_jacobian(&self, pose: &Pose2D, u: &VelocityCommand, dt: f64) -> Matrix3<f64>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn EstimationDynamics>`.
dyn_clone::clone_trait_object!(EstimationDynamics);

pub mod diff_drive;
