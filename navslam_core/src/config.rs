// navslam_core/src/config.rs

//! Static parameter sets for the estimation-and-control loop.
//!
//! Every struct deserializes with `#[serde(default)]`, so a scenario file only
//! needs to mention the values it changes. Defaults reproduce the reference
//! room setup.

use serde::{Deserialize, Serialize};

use crate::error::{check_noise, check_positive, SlamError};

// =========================================================================
// == Estimator ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorParams {
    /// Per-tick process noise variances added to the pose block: [x, y, theta].
    pub motion_noise: [f64; 3],
    /// Measurement noise standard deviations [range (m), bearing (rad)].
    pub meas_noise_std: [f64; 2],
    /// Multiplier applied to `diag(range_std^2, bearing_std^2)` to form `R`.
    pub meas_noise_scale: f64,
    /// Initial variance of each pose entry. Small: the start pose is known.
    pub initial_pose_variance: f64,
    /// Initial variance of each landmark coordinate. Large: position unknown.
    pub initial_landmark_variance: f64,
    /// Predicted ranges below this skip the correction (degenerate Jacobian).
    pub min_predicted_range: f64,
    /// Re-symmetrize `P` after every correction.
    pub symmetrize_covariance: bool,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            motion_noise: [0.01, 0.01, 0.005],
            meas_noise_std: [0.05, 0.02],
            meas_noise_scale: 5.0,
            initial_pose_variance: 0.001,
            initial_landmark_variance: 1000.0,
            min_predicted_range: 1e-6,
            symmetrize_covariance: true,
        }
    }
}

impl EstimatorParams {
    pub fn validate(&self) -> Result<(), SlamError> {
        check_noise("motion_noise.x", self.motion_noise[0])?;
        check_noise("motion_noise.y", self.motion_noise[1])?;
        check_noise("motion_noise.theta", self.motion_noise[2])?;
        check_positive("meas_noise.range_std", self.meas_noise_std[0])?;
        check_positive("meas_noise.bearing_std", self.meas_noise_std[1])?;
        check_positive("meas_noise_scale", self.meas_noise_scale)?;
        check_noise("initial_pose_variance", self.initial_pose_variance)?;
        check_positive("initial_landmark_variance", self.initial_landmark_variance)?;
        check_positive("min_predicted_range", self.min_predicted_range)
    }
}

// =========================================================================
// == Robot & Sensor ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriveParams {
    /// Distance between the wheels, in meters.
    pub wheel_base: f64,
    /// Standard deviation of the per-wheel speed noise seen by odometry (m/s).
    pub odom_std: f64,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            wheel_base: 0.5,
            odom_std: 0.06,
        }
    }
}

impl DriveParams {
    pub fn validate(&self) -> Result<(), SlamError> {
        check_positive("wheel_base", self.wheel_base)?;
        check_noise("odom_std", self.odom_std)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorParams {
    pub max_range: f64,
    pub range_std: f64,
    pub bearing_std: f64,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            max_range: 5.0,
            range_std: 0.1,
            bearing_std: 0.02,
        }
    }
}

impl SensorParams {
    pub fn validate(&self) -> Result<(), SlamError> {
        check_positive("max_sensor_range", self.max_range)?;
        check_noise("range_std", self.range_std)?;
        check_noise("bearing_std", self.bearing_std)
    }
}

// =========================================================================
// == Control ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerParams {
    pub max_speed: f64,
    pub k_distance: f64,
    pub k_heading: f64,
    /// A goal counts as reached inside this radius (m).
    pub goal_threshold: f64,
    /// Heading errors above this (rad) make the robot turn in place first.
    pub heading_gate: f64,
    /// Yaw rate per radian of avoidance angle while avoiding.
    pub avoidance_turn_gain: f64,
    /// Fraction of the base speed kept while avoiding.
    pub avoidance_slowdown: f64,
    /// Avoidance angles at or above this magnitude count as "avoiding" for the heading gate.
    pub avoidance_active_threshold: f64,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            max_speed: 1.0,
            k_distance: 1.2,
            k_heading: 3.5,
            goal_threshold: 0.2,
            heading_gate: 1.0,
            avoidance_turn_gain: 1.5,
            avoidance_slowdown: 0.5,
            avoidance_active_threshold: 0.1,
        }
    }
}

impl ControllerParams {
    pub fn validate(&self) -> Result<(), SlamError> {
        check_positive("max_speed", self.max_speed)?;
        check_noise("k_distance", self.k_distance)?;
        check_noise("k_heading", self.k_heading)?;
        check_positive("goal_threshold", self.goal_threshold)?;
        check_positive("heading_gate", self.heading_gate)?;
        check_noise("avoidance_turn_gain", self.avoidance_turn_gain)?;
        check_noise("avoidance_slowdown", self.avoidance_slowdown)?;
        check_noise("avoidance_active_threshold", self.avoidance_active_threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvoidanceParams {
    /// Obstacles closer than this (m) and ahead of the robot trigger avoidance.
    pub safe_distance: f64,
    pub avoidance_gain: f64,
    /// Bound on the returned steering correction (rad).
    pub max_avoidance_angle: f64,
    /// Nearest obstacle closer than this (m) stops forward motion.
    pub stop_distance: f64,
    /// Distance floor used when weighting very close obstacles (m).
    pub min_weight_distance: f64,
}

impl Default for AvoidanceParams {
    fn default() -> Self {
        Self {
            safe_distance: 1.0,
            avoidance_gain: 2.0,
            max_avoidance_angle: 0.8,
            stop_distance: 0.5,
            min_weight_distance: 0.1,
        }
    }
}

impl AvoidanceParams {
    pub fn validate(&self) -> Result<(), SlamError> {
        check_positive("safe_distance", self.safe_distance)?;
        check_noise("avoidance_gain", self.avoidance_gain)?;
        check_noise("max_avoidance_angle", self.max_avoidance_angle)?;
        check_noise("stop_distance", self.stop_distance)?;
        check_positive("min_weight_distance", self.min_weight_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        EstimatorParams::default().validate().unwrap();
        DriveParams::default().validate().unwrap();
        SensorParams::default().validate().unwrap();
        ControllerParams::default().validate().unwrap();
        AvoidanceParams::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let params = EstimatorParams {
            motion_noise: [0.01, -0.01, 0.005],
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(SlamError::InvalidNoise {
                name: "motion_noise.y",
                value: -0.01
            })
        );

        let drive = DriveParams {
            wheel_base: 0.0,
            ..Default::default()
        };
        assert!(drive.validate().is_err());

        let sensor = SensorParams {
            range_std: f64::NAN,
            ..Default::default()
        };
        assert!(sensor.validate().is_err());
    }
}
