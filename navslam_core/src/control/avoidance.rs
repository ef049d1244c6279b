// navslam_core/src/control/avoidance.rs

use nalgebra::Vector2;
use std::f64::consts::FRAC_PI_2;

use crate::config::AvoidanceParams;
use crate::error::SlamError;
use crate::messages::SensorRay;
use crate::types::{Landmark, Pose2D};
use crate::utils::angles::wrap_angle;

/// Steering correction produced by the obstacle check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidanceCommand {
    /// Extra heading command in radians, bounded by `max_avoidance_angle`.
    /// Zero when nothing is in the way.
    pub angle: f64,
    /// `0.0` when an obstacle is inside the stop distance, `1.0` otherwise.
    pub speed_factor: f64,
}

impl AvoidanceCommand {
    pub const CLEAR: AvoidanceCommand = AvoidanceCommand {
        angle: 0.0,
        speed_factor: 1.0,
    };

    pub fn is_active(&self) -> bool {
        self.angle != 0.0
    }
}

impl Default for AvoidanceCommand {
    fn default() -> Self {
        Self::CLEAR
    }
}

/// Reactive steering away from close obstacles in the front half-plane.
#[derive(Debug, Clone)]
pub struct ObstacleAvoidance {
    pub params: AvoidanceParams,
}

impl ObstacleAvoidance {
    pub fn new(params: AvoidanceParams) -> Result<Self, SlamError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Computes the correction from the TRUE pose.
    ///
    /// Candidates are the end points of the current sensor rays and the true
    /// positions of every landmark, so a landmark that is also detected counts
    /// twice. A candidate closer than `safe_distance` and within +/-90 degrees
    /// of the heading pushes the heading away from its side with weight
    /// `gain / max(distance, min_weight_distance)`. An obstacle dead ahead
    /// counts as being on the left and steers right.
    pub fn steer(
        &self,
        true_pose: &Pose2D,
        landmarks: &[Landmark],
        detections: &[SensorRay],
    ) -> AvoidanceCommand {
        let p = &self.params;
        let origin = true_pose.position();

        let candidates = detections
            .iter()
            .map(|ray| ray.end)
            .chain(landmarks.iter().map(|landmark| landmark.position));

        let mut angle = 0.0;
        let mut nearest = f64::INFINITY;
        let mut detected = false;

        for point in candidates {
            let Some((distance, bearing)) = self.qualify(&origin, true_pose.theta, &point) else {
                continue;
            };
            detected = true;
            nearest = nearest.min(distance);

            let side = if bearing >= 0.0 { 1.0 } else { -1.0 };
            angle += -p.avoidance_gain * side / distance.max(p.min_weight_distance);
        }

        if !detected {
            return AvoidanceCommand::CLEAR;
        }

        AvoidanceCommand {
            angle: angle.clamp(-p.max_avoidance_angle, p.max_avoidance_angle),
            speed_factor: if nearest < p.stop_distance { 0.0 } else { 1.0 },
        }
    }

    /// Distance and relative bearing of `point` if it is close and in front.
    fn qualify(
        &self,
        origin: &Vector2<f64>,
        heading: f64,
        point: &Vector2<f64>,
    ) -> Option<(f64, f64)> {
        let delta = point - origin;
        let distance = delta.x.hypot(delta.y);
        if distance >= self.params.safe_distance {
            return None;
        }
        let bearing = wrap_angle(delta.y.atan2(delta.x) - heading);
        (bearing.abs() < FRAC_PI_2).then_some((distance, bearing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LandmarkId;
    use approx::assert_abs_diff_eq;

    fn avoidance() -> ObstacleAvoidance {
        ObstacleAvoidance::new(AvoidanceParams::default()).unwrap()
    }

    fn landmark_at(x: f64, y: f64) -> Landmark {
        Landmark::new(LandmarkId(0), "obstacle", x, y)
    }

    #[test]
    fn test_nothing_close_is_clear() {
        let cmd = avoidance().steer(&Pose2D::new(5.0, 5.0, 0.0), &[landmark_at(0.0, 0.0)], &[]);
        assert_eq!(cmd, AvoidanceCommand::CLEAR);
        assert!(!cmd.is_active());
    }

    #[test]
    fn test_obstacle_behind_is_ignored() {
        let cmd = avoidance().steer(&Pose2D::new(1.0, 0.0, 0.0), &[landmark_at(0.5, 0.0)], &[]);
        assert_eq!(cmd, AvoidanceCommand::CLEAR);
    }

    #[test]
    fn test_obstacle_on_left_steers_right() {
        // 0.8 m away at +45 degrees: -2.0 / 0.8 = -2.5, clamped to -0.8.
        let d = 0.8 / 2.0_f64.sqrt();
        let cmd = avoidance().steer(&Pose2D::new(0.0, 0.0, 0.0), &[landmark_at(d, d)], &[]);
        assert_abs_diff_eq!(cmd.angle, -0.8, epsilon = 1e-12);
        assert_eq!(cmd.speed_factor, 1.0);
    }

    #[test]
    fn test_obstacle_on_right_steers_left_and_stops_when_close() {
        let cmd = avoidance().steer(&Pose2D::new(0.0, 0.0, 0.0), &[landmark_at(0.3, -0.1)], &[]);
        assert_abs_diff_eq!(cmd.angle, 0.8, epsilon = 1e-12);
        assert_eq!(cmd.speed_factor, 0.0);
    }

    #[test]
    fn test_dead_ahead_counts_as_left() {
        let cmd = avoidance().steer(&Pose2D::new(0.0, 0.0, 0.0), &[landmark_at(0.9, 0.0)], &[]);
        assert!(cmd.angle < 0.0);
    }

    #[test]
    fn test_symmetric_obstacles_cancel_but_still_report_stop() {
        let pose = Pose2D::new(0.0, 0.0, 0.0);
        let landmarks = [landmark_at(0.3, 0.2), landmark_at(0.3, -0.2)];
        let cmd = avoidance().steer(&pose, &landmarks, &[]);
        assert_abs_diff_eq!(cmd.angle, 0.0, epsilon = 1e-12);
        assert_eq!(cmd.speed_factor, 0.0);
    }

    #[test]
    fn test_detected_rays_add_to_landmark_contribution() {
        let params = AvoidanceParams {
            max_avoidance_angle: 100.0,
            ..Default::default()
        };
        let avoidance = ObstacleAvoidance::new(params).unwrap();
        let pose = Pose2D::new(0.0, 0.0, 0.0);
        let far = [Landmark::new(LandmarkId(1), "far", 9.0, 9.0)];
        let ray = SensorRay {
            start: Vector2::zeros(),
            end: Vector2::new(0.5, 0.5),
        };

        let only_ray = avoidance.steer(&pose, &far, &[ray]);
        let ray_and_landmark = avoidance.steer(
            &pose,
            &[Landmark::new(LandmarkId(0), "near", 0.5, 0.5), far[0].clone()],
            &[ray],
        );
        assert_abs_diff_eq!(only_ray.angle, -2.0 / 0.5_f64.hypot(0.5), epsilon = 1e-12);
        assert_abs_diff_eq!(ray_and_landmark.angle, 2.0 * only_ray.angle, epsilon = 1e-12);
    }

    #[test]
    fn test_weight_is_floored_for_very_close_obstacles() {
        let params = AvoidanceParams {
            max_avoidance_angle: 100.0,
            ..Default::default()
        };
        let avoidance = ObstacleAvoidance::new(params).unwrap();
        let cmd = avoidance.steer(&Pose2D::new(0.0, 0.0, 0.0), &[landmark_at(0.01, -0.01)], &[]);
        assert_abs_diff_eq!(cmd.angle, 2.0 / 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_output_is_bounded() {
        let avoidance = avoidance();
        for i in 0..36 {
            let theta = f64::from(i) * 10.0_f64.to_radians();
            let landmarks: Vec<_> = (0..8)
                .map(|k| {
                    let a = f64::from(k) * 0.7;
                    landmark_at(0.2 + 0.1 * a.cos(), 0.1 * a.sin())
                })
                .collect();
            let cmd = avoidance.steer(&Pose2D::new(0.0, 0.0, theta), &landmarks, &[]);
            assert!(cmd.angle.abs() <= 0.8);
            assert!((0.0..=1.0).contains(&cmd.speed_factor));
        }
    }
}
