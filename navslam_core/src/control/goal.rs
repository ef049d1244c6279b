// navslam_core/src/control/goal.rs

use nalgebra::Vector2;
use std::fmt;
use tracing::info;

use crate::config::ControllerParams;
use crate::control::avoidance::AvoidanceCommand;
use crate::error::SlamError;
use crate::types::{Pose2D, VelocityCommand};
use crate::utils::angles::angle_difference;

/// Progress through the waypoint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStatus {
    Navigating { goal_index: usize, total: usize },
    Complete,
}

impl fmt::Display for NavigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationStatus::Navigating { .. } => write!(f, "NAVIGATING"),
            NavigationStatus::Complete => write!(f, "COMPLETE"),
        }
    }
}

/// A proportional go-to-goal controller that visits a fixed list of
/// waypoints in order, driven by the *estimated* pose.
#[derive(Debug, Clone)]
pub struct GoalController {
    pub params: ControllerParams,
    goals: Vec<Vector2<f64>>,
    goal_index: usize,
}

impl GoalController {
    pub fn new(goals: Vec<Vector2<f64>>, params: ControllerParams) -> Result<Self, SlamError> {
        params.validate()?;
        Ok(Self {
            params,
            goals,
            goal_index: 0,
        })
    }

    pub fn goals(&self) -> &[Vector2<f64>] {
        &self.goals
    }

    /// Index of the waypoint being pursued; equals `goals().len()` once done.
    pub fn goal_index(&self) -> usize {
        self.goal_index
    }

    pub fn current_goal(&self) -> Option<Vector2<f64>> {
        self.goals.get(self.goal_index).copied()
    }

    pub fn status(&self) -> NavigationStatus {
        if self.goal_index < self.goals.len() {
            NavigationStatus::Navigating {
                goal_index: self.goal_index,
                total: self.goals.len(),
            }
        } else {
            NavigationStatus::Complete
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == NavigationStatus::Complete
    }

    /// Distance and wrapped heading error from `pose` to the current goal.
    pub fn goal_errors(&self, pose: &Pose2D) -> Option<(f64, f64)> {
        let goal = self.current_goal()?;
        let delta = goal - pose.position();
        let distance = delta.x.hypot(delta.y);
        let heading_error = angle_difference(delta.y.atan2(delta.x), pose.theta);
        Some((distance, heading_error))
    }

    /// Computes this tick's velocity command.
    ///
    /// Reaching a goal yields a zero command for that tick and advances to the
    /// next waypoint. When avoidance is active it takes over the yaw rate and
    /// halves the speed (scaled again by its speed factor). A large heading
    /// error without avoidance means turning in place.
    pub fn compute(&mut self, estimated: &Pose2D, avoidance: &AvoidanceCommand) -> VelocityCommand {
        let Some((distance, heading_error)) = self.goal_errors(estimated) else {
            return VelocityCommand::STOP;
        };
        let p = &self.params;

        if distance < p.goal_threshold {
            self.goal_index += 1;
            info!(
                reached = self.goal_index,
                total = self.goals.len(),
                "Goal reached"
            );
            return VelocityCommand::STOP;
        }

        let base_v = (p.k_distance * distance).min(p.max_speed);
        let base_omega = p.k_heading * heading_error;

        let mut cmd = if avoidance.is_active() {
            VelocityCommand::new(
                base_v * p.avoidance_slowdown * avoidance.speed_factor,
                avoidance.angle * p.avoidance_turn_gain,
            )
        } else {
            VelocityCommand::new(base_v, base_omega)
        };

        if heading_error.abs() > p.heading_gate
            && avoidance.angle.abs() < p.avoidance_active_threshold
        {
            cmd.linear = 0.0;
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn room_goals() -> Vec<Vector2<f64>> {
        vec![
            Vector2::new(0.0, 2.0),
            Vector2::new(8.0, 4.0),
            Vector2::new(9.0, 7.0),
        ]
    }

    fn controller() -> GoalController {
        GoalController::new(room_goals(), ControllerParams::default()).unwrap()
    }

    #[test]
    fn test_far_goal_saturates_speed() {
        let mut ctrl = controller();
        let cmd = ctrl.compute(&Pose2D::new(0.0, -3.0, FRAC_PI_2), &AvoidanceCommand::CLEAR);
        assert_abs_diff_eq!(cmd.linear, 1.0);
        assert_abs_diff_eq!(cmd.angular, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_near_goal_scales_speed_with_distance() {
        let mut ctrl = controller();
        let cmd = ctrl.compute(&Pose2D::new(0.0, 1.5, FRAC_PI_2), &AvoidanceCommand::CLEAR);
        assert_abs_diff_eq!(cmd.linear, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_large_heading_error_turns_in_place() {
        let mut ctrl = controller();
        // Goal straight behind.
        let cmd = ctrl.compute(&Pose2D::new(0.0, 0.0, -FRAC_PI_2), &AvoidanceCommand::CLEAR);
        assert_eq!(cmd.linear, 0.0);
        assert!(cmd.angular.abs() > 0.0);
    }

    #[test]
    fn test_avoidance_overrides_yaw_and_slows_down() {
        let mut ctrl = controller();
        let avoid = AvoidanceCommand {
            angle: -0.4,
            speed_factor: 1.0,
        };
        let cmd = ctrl.compute(&Pose2D::new(0.0, -3.0, FRAC_PI_2), &avoid);
        assert_abs_diff_eq!(cmd.linear, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(cmd.angular, -0.6, epsilon = 1e-12);

        let stop = AvoidanceCommand {
            angle: 0.4,
            speed_factor: 0.0,
        };
        let cmd = ctrl.compute(&Pose2D::new(0.0, -3.0, FRAC_PI_2), &stop);
        assert_eq!(cmd.linear, 0.0);
    }

    #[test]
    fn test_weak_avoidance_does_not_bypass_heading_gate() {
        let mut ctrl = controller();
        let avoid = AvoidanceCommand {
            angle: 0.05,
            speed_factor: 1.0,
        };
        let cmd = ctrl.compute(&Pose2D::new(0.0, 0.0, -FRAC_PI_2), &avoid);
        assert_eq!(cmd.linear, 0.0);
        assert_abs_diff_eq!(cmd.angular, 0.075, epsilon = 1e-12);
    }

    #[test]
    fn test_goal_sequence_is_monotone_and_ends_complete() {
        let mut ctrl = controller();
        assert_eq!(
            ctrl.status(),
            NavigationStatus::Navigating {
                goal_index: 0,
                total: 3
            }
        );

        let mut last_index = 0;
        for goal in room_goals() {
            let at_goal = Pose2D::new(goal.x + 0.05, goal.y, 0.0);
            // A tick away from the goal does not advance.
            ctrl.compute(&Pose2D::new(goal.x - 2.0, goal.y, 0.0), &AvoidanceCommand::CLEAR);
            assert_eq!(ctrl.goal_index(), last_index);

            let cmd = ctrl.compute(&at_goal, &AvoidanceCommand::CLEAR);
            assert_eq!(cmd, VelocityCommand::STOP);
            assert_eq!(ctrl.goal_index(), last_index + 1);
            last_index = ctrl.goal_index();
        }

        assert!(ctrl.is_complete());
        assert_eq!(ctrl.status().to_string(), "COMPLETE");
        for _ in 0..10 {
            let cmd = ctrl.compute(&Pose2D::new(3.0, 3.0, 1.0), &AvoidanceCommand::CLEAR);
            assert_eq!(cmd, VelocityCommand::STOP);
        }
        assert_eq!(ctrl.goal_index(), 3);
        assert_eq!(ctrl.current_goal(), None);
    }

    #[test]
    fn test_empty_goal_list_is_complete() {
        let ctrl = GoalController::new(Vec::new(), ControllerParams::default()).unwrap();
        assert!(ctrl.is_complete());
    }
}
