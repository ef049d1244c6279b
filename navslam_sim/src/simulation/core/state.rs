// navslam_sim/src/simulation/core/state.rs

use navslam_core::prelude::*;

/// Everything one run owns, passed around by `&mut` instead of living in globals.
///
/// The estimator alone owns the joint state, covariance and seen flags; the
/// rest of the simulation only reads them through `estimator.get_state()`.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Ticks completed so far.
    pub tick: u64,
    /// Simulated seconds elapsed.
    pub time: f64,

    /// Ground truth, advanced with the noiseless wheel command.
    pub true_pose: Pose2D,
    /// Dead reckoning from the noisy wheel speeds. Never corrected.
    pub odometry_pose: Pose2D,
    pub landmarks: Vec<Landmark>,

    pub estimator: EkfSlam,
    pub controller: GoalController,
    pub avoidance: ObstacleAvoidance,
    pub sensor: RangeBearingSensor,
    pub odometry: WheelOdometry,

    /// Rays produced by the most recent sensor sweep. Obstacle avoidance of
    /// the next tick reads these.
    pub sensor_rays: Vec<SensorRay>,
}

impl SimulationState {
    pub fn estimated_pose(&self) -> Pose2D {
        self.estimator.get_state().pose()
    }

    /// Euclidean distance between the true and the estimated position.
    pub fn position_error(&self) -> f64 {
        self.true_pose.distance_to(&self.estimated_pose())
    }

    pub fn status(&self) -> NavigationStatus {
        self.controller.status()
    }

    pub fn landmarks_seen(&self) -> usize {
        self.estimator
            .get_state()
            .landmark_seen
            .iter()
            .filter(|seen| **seen)
            .count()
    }
}
