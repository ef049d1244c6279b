// navslam_core/src/models/estimation/dynamics/diff_drive.rs

use nalgebra::Matrix3;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{check_noise, check_positive, SlamError};
use crate::models::estimation::dynamics::EstimationDynamics;
use crate::types::{Pose2D, VelocityCommand, WheelSpeeds};
use crate::utils::angles::wrap_angle;

/// Kinematics of a two-wheeled differential-drive base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    /// Distance between the two wheel contact points, in meters.
    pub wheel_base: f64,
}

impl DifferentialDrive {
    pub fn new(wheel_base: f64) -> Result<Self, SlamError> {
        check_positive("wheel_base", wheel_base)?;
        Ok(Self { wheel_base })
    }

    /// Splits a body command into wheel speeds: `v -/+ omega * B / 2`.
    pub fn to_wheel_speeds(&self, u: &VelocityCommand) -> WheelSpeeds {
        let half_turn = u.angular * self.wheel_base / 2.0;
        WheelSpeeds {
            left: u.linear - half_turn,
            right: u.linear + half_turn,
        }
    }

    /// Recombines wheel speeds into a body command.
    pub fn from_wheel_speeds(&self, wheels: &WheelSpeeds) -> VelocityCommand {
        VelocityCommand {
            linear: (wheels.left + wheels.right) / 2.0,
            angular: (wheels.right - wheels.left) / self.wheel_base,
        }
    }

    /// The command the base actually executes once it has gone through the
    /// wheels. Equal to `u` up to floating-point rounding.
    pub fn realize(&self, u: &VelocityCommand) -> VelocityCommand {
        self.from_wheel_speeds(&self.to_wheel_speeds(u))
    }
}

/// Unicycle pose update shared by the ground-truth, odometry and filter paths.
pub fn advance_pose(pose: &Pose2D, u: &VelocityCommand, dt: f64) -> Pose2D {
    Pose2D {
        x: pose.x + u.linear * pose.theta.cos() * dt,
        y: pose.y + u.linear * pose.theta.sin() * dt,
        theta: wrap_angle(pose.theta + u.angular * dt),
    }
}

impl EstimationDynamics for DifferentialDrive {
    fn propagate(&self, pose: &Pose2D, u: &VelocityCommand, dt: f64) -> Pose2D {
        assert!(dt >= 0.0, "DifferentialDrive::propagate: dt cannot be negative");
        advance_pose(pose, u, dt)
    }

    #[rustfmt::skip]
    fn calculate_jacobian(&self, pose: &Pose2D, u: &VelocityCommand, dt: f64) -> Matrix3<f64> {
        let (sin, cos) = pose.theta.sin_cos();
        Matrix3::new(
            1.0, 0.0, -u.linear * sin * dt,
            0.0, 1.0,  u.linear * cos * dt,
            0.0, 0.0,  1.0,
        )
    }
}

/// Wheel-encoder odometry: the commanded wheel speeds corrupted by independent
/// zero-mean Gaussian noise on each wheel.
#[derive(Debug, Clone)]
pub struct WheelOdometry {
    pub drive: DifferentialDrive,
    // Store the noise distribution for efficiency
    noise_dist: Normal<f64>,
}

impl WheelOdometry {
    pub fn new(drive: DifferentialDrive, wheel_speed_stddev: f64) -> Result<Self, SlamError> {
        check_noise("odom_std", wheel_speed_stddev)?;
        let noise_dist = Normal::new(0.0, wheel_speed_stddev)
            .map_err(|_| SlamError::InvalidNoise {
                name: "odom_std",
                value: wheel_speed_stddev,
            })?;
        Ok(Self { drive, noise_dist })
    }

    /// Returns the velocity the encoders report for the command `u`.
    /// This is what the odometry trajectory and the filter prediction consume.
    pub fn measure<R: Rng + ?Sized>(&self, u: &VelocityCommand, rng: &mut R) -> VelocityCommand {
        let wheels = self.drive.to_wheel_speeds(u);
        let noisy = WheelSpeeds {
            left: wheels.left + self.noise_dist.sample(rng),
            right: wheels.right + self.noise_dist.sample(rng),
        };
        self.drive.from_wheel_speeds(&noisy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_wheel_speed_round_trip() {
        let drive = DifferentialDrive::new(0.5).unwrap();
        let u = VelocityCommand::new(0.8, -1.2);
        let wheels = drive.to_wheel_speeds(&u);
        assert_abs_diff_eq!(wheels.left, 0.8 + 0.3, epsilon = EPS);
        assert_abs_diff_eq!(wheels.right, 0.8 - 0.3, epsilon = EPS);

        let back = drive.from_wheel_speeds(&wheels);
        assert_abs_diff_eq!(back.linear, u.linear, epsilon = EPS);
        assert_abs_diff_eq!(back.angular, u.angular, epsilon = EPS);
    }

    #[test]
    fn test_rejects_non_positive_wheel_base() {
        assert!(DifferentialDrive::new(0.0).is_err());
        assert!(DifferentialDrive::new(-1.0).is_err());
        assert!(DifferentialDrive::new(f64::NAN).is_err());
    }

    #[test]
    fn test_advance_straight_and_turning() {
        let pose = Pose2D::new(1.0, 1.0, FRAC_PI_2);
        let next = advance_pose(&pose, &VelocityCommand::new(2.0, 0.0), 0.5);
        assert_abs_diff_eq!(next.x, 1.0, epsilon = EPS);
        assert_abs_diff_eq!(next.y, 2.0, epsilon = EPS);
        assert_abs_diff_eq!(next.theta, FRAC_PI_2, epsilon = EPS);

        // Turning in place past +pi wraps to the negative side.
        let pose = Pose2D::new(0.0, 0.0, PI - 0.1);
        let next = advance_pose(&pose, &VelocityCommand::new(0.0, 1.0), 0.2);
        assert_abs_diff_eq!(next.theta, -PI + 0.1, epsilon = 1e-9);
        assert_eq!(next.x, 0.0);
    }

    #[test]
    fn test_jacobian_uses_pre_step_heading() {
        let drive = DifferentialDrive::new(0.5).unwrap();
        let pose = Pose2D::new(0.0, 0.0, FRAC_PI_2);
        let f = drive.calculate_jacobian(&pose, &VelocityCommand::new(1.0, 3.0), 0.1);
        assert_abs_diff_eq!(f[(0, 2)], -0.1, epsilon = EPS);
        assert_abs_diff_eq!(f[(1, 2)], 0.0, epsilon = EPS);
        assert_eq!(f[(0, 0)], 1.0);
        assert_eq!(f[(2, 2)], 1.0);
        assert_eq!(f[(2, 0)], 0.0);
    }

    #[test]
    fn test_noiseless_odometry_matches_realized_command() {
        let drive = DifferentialDrive::new(0.5).unwrap();
        let odometry = WheelOdometry::new(drive, 0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let u = VelocityCommand::new(0.7, 0.4);
        assert_eq!(odometry.measure(&u, &mut rng), drive.realize(&u));
    }

    #[test]
    fn test_noisy_odometry_is_unbiased() {
        let drive = DifferentialDrive::new(0.5).unwrap();
        let odometry = WheelOdometry::new(drive, 0.06).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let u = VelocityCommand::new(1.0, 0.0);

        let n = 20_000;
        let total: f64 = (0..n)
            .map(|_| odometry.measure(&u, &mut rng).linear)
            .sum();
        let mean_v = total / n as f64;
        // std of the mean linear speed is 0.06 / sqrt(2) / sqrt(n) ~ 3e-4
        assert_abs_diff_eq!(mean_v, 1.0, epsilon = 3e-3);
    }

    #[test]
    fn test_odometry_rejects_negative_noise() {
        let drive = DifferentialDrive::new(0.5).unwrap();
        assert!(WheelOdometry::new(drive, -0.1).is_err());
    }
}
