// navslam_sim/src/simulation/debugging/trajectory.rs

use nalgebra::Vector2;
use navslam_core::prelude::Pose2D;

/// Down-sampled trails of the three trajectories (true, odometry, estimate).
#[derive(Debug, Clone, Default)]
pub struct TrajectoryHistory {
    pub sample_interval: u64,
    pub true_path: Vec<Vector2<f64>>,
    pub odometry_path: Vec<Vector2<f64>>,
    pub estimated_path: Vec<Vector2<f64>>,
}

impl TrajectoryHistory {
    pub fn new(sample_interval: u64) -> Self {
        Self {
            sample_interval: sample_interval.max(1),
            ..Default::default()
        }
    }

    /// Appends one point per trail when `tick` falls on the sampling interval.
    pub fn record(&mut self, tick: u64, true_pose: &Pose2D, odometry: &Pose2D, estimate: &Pose2D) {
        if tick % self.sample_interval != 0 {
            return;
        }
        self.true_path.push(true_pose.position());
        self.odometry_path.push(odometry.position());
        self.estimated_path.push(estimate.position());
    }

    pub fn len(&self) -> usize {
        self.true_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.true_path.is_empty()
    }
}
