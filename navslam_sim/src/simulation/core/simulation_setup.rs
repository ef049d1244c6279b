// navslam_sim/src/simulation/core/simulation_setup.rs

use std::f64::consts::TAU;

use navslam_core::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use tracing::info;

use crate::simulation::config::{ConfigError, ScenarioConfig, WorldConfig};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::state::SimulationState;

/// Picks the start pose: the configured one, or a uniform draw inside the
/// room (keeping `spawn_margin` to the walls) with a uniform heading.
pub fn spawn_pose<R: Rng + ?Sized>(world: &WorldConfig, rng: &mut R) -> Pose2D {
    if let Some(pose) = world.initial_pose {
        return Pose2D::new(pose.x, pose.y, pose.theta);
    }
    let m = world.spawn_margin;
    let x = Uniform::new(m, world.width - m).sample(rng);
    let y = Uniform::new(m, world.height - m).sample(rng);
    let theta = Uniform::new(0.0, TAU).sample(rng);
    Pose2D::new(x, y, theta)
}

/// Builds the initial state of a run. The configuration is validated first,
/// so every model constructor below sees sane values.
pub fn build_simulation_state(
    config: &ScenarioConfig,
    rng: &mut SimulationRng,
) -> Result<SimulationState, ConfigError> {
    config.validate()?;

    let start = spawn_pose(&config.world, rng);
    let landmarks = config.landmark_table();

    // --- 1. Robot & sensors ---
    let drive = DifferentialDrive::new(config.robot.wheel_base)?;
    let odometry = WheelOdometry::new(drive, config.robot.odom_std)?;
    let sensor = RangeBearingSensor::new(
        config.sensor.max_range,
        config.sensor.range_std,
        config.sensor.bearing_std,
    )?;

    // --- 2. Estimation, seeded with the true start pose ---
    let estimator = EkfSlam::new(&config.estimator, Box::new(drive), start, landmarks.len())?;

    // --- 3. Behavior ---
    let controller = GoalController::new(config.goal_points(), config.controller.clone())?;
    let avoidance = ObstacleAvoidance::new(config.avoidance.clone())?;

    info!(
        x = start.x,
        y = start.y,
        theta = start.theta,
        landmarks = landmarks.len(),
        goals = config.goals.len(),
        deterministic = config.simulation.deterministic,
        "Spawned robot"
    );

    Ok(SimulationState {
        tick: 0,
        time: 0.0,
        true_pose: start,
        odometry_pose: start,
        landmarks,
        estimator,
        controller,
        avoidance,
        sensor,
        odometry,
        sensor_rays: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_spawn_stays_inside_margins() {
        let world = WorldConfig::default();
        let mut rng = SimulationRng::new(Some(5));
        for _ in 0..200 {
            let pose = spawn_pose(&world, &mut rng);
            assert!(pose.x >= 0.5 && pose.x <= 9.5);
            assert!(pose.y >= 0.5 && pose.y <= 7.5);
            assert!(pose.theta > -std::f64::consts::PI && pose.theta <= std::f64::consts::PI);
        }
    }

    #[test]
    fn test_fixed_spawn_is_used_and_wrapped() {
        let world = WorldConfig {
            initial_pose: Some(Pose2D {
                x: 1.0,
                y: 2.0,
                theta: 3.0 * std::f64::consts::PI,
            }),
            ..Default::default()
        };
        let pose = spawn_pose(&world, &mut SimulationRng::new(Some(1)));
        assert_eq!((pose.x, pose.y), (1.0, 2.0));
        assert!((pose.theta - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_state_starts_with_all_trajectories_together() {
        let config = ScenarioConfig::default();
        let state = build_simulation_state(&config, &mut SimulationRng::new(Some(9))).unwrap();
        assert_eq!(state.true_pose, state.odometry_pose);
        assert_eq!(state.true_pose, state.estimated_pose());
        assert_eq!(state.landmarks.len(), 5);
        assert_eq!(state.landmarks_seen(), 0);
        assert!(state.sensor_rays.is_empty());
    }
}
