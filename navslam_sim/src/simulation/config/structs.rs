// navslam_sim/src/simulation/config/structs.rs

use navslam_core::prelude::{
    AvoidanceParams, ControllerParams, DriveParams, EstimatorParams, Landmark, LandmarkId, Pose2D,
    SensorParams,
};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file. Every section
/// is optional; missing ones fall back to the reference room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    pub simulation: SimulationSection,
    pub world: WorldConfig,
    // The TOML has `[[landmarks]]`, which becomes a Vec of LandmarkConfig structs.
    pub landmarks: Vec<LandmarkConfig>,
    /// Waypoints visited in order, as `[x, y]` pairs.
    pub goals: Vec<[f64; 2]>,
    pub robot: DriveParams,
    pub sensor: SensorParams,
    pub estimator: EstimatorParams,
    pub controller: ControllerParams,
    pub avoidance: AvoidanceParams,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let landmarks = [
            ("A", [0.0, 0.0]),
            ("B", [10.0, 0.0]),
            ("C", [4.0, 3.0]),
            ("D", [8.0, 5.0]),
            ("E", [2.0, 7.0]),
        ]
        .into_iter()
        .map(|(name, position)| LandmarkConfig {
            name: name.to_string(),
            position,
        })
        .collect();

        Self {
            simulation: SimulationSection::default(),
            world: WorldConfig::default(),
            landmarks,
            goals: vec![[0.0, 2.0], [8.0, 4.0], [9.0, 7.0]],
            robot: DriveParams::default(),
            sensor: SensorParams::default(),
            estimator: EstimatorParams::default(),
            controller: ControllerParams::default(),
            avoidance: AvoidanceParams::default(),
        }
    }
}

impl ScenarioConfig {
    /// The landmark table with ids assigned in file order.
    pub fn landmark_table(&self) -> Vec<Landmark> {
        self.landmarks
            .iter()
            .enumerate()
            .map(|(i, lm)| {
                Landmark::new(
                    LandmarkId(i),
                    lm.name.as_str(),
                    lm.position[0],
                    lm.position[1],
                )
            })
            .collect()
    }

    pub fn goal_points(&self) -> Vec<Vector2<f64>> {
        self.goals.iter().map(|g| Vector2::new(g[0], g[1])).collect()
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / self.simulation.rate_hz
    }

    /// Zeroes every noise source of the simulated robot (odometry and sensor).
    /// The filter's own noise model is left as configured.
    pub fn make_deterministic(&mut self) {
        self.simulation.deterministic = true;
        self.robot.odom_std = 0.0;
        self.sensor.range_std = 0.0;
        self.sensor.bearing_std = 0.0;
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// These map directly to the sections in the scenario.toml file.
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Optional seed for the pseudo-random number generator for determinism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Upper bound on simulated time, in seconds.
    pub duration_seconds: f64,
    /// Fixed tick rate.
    pub rate_hz: f64,
    /// Trajectory points are recorded every this many ticks.
    pub trail_sample_interval: u64,
    /// Number of per-tick position errors kept for inspection.
    pub error_history_len: usize,
    /// Disable odometry and sensor noise.
    pub deterministic: bool,
    /// Emit a progress log line every this many ticks (0 disables it).
    pub log_every: u64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: 120.0,
            rate_hz: 60.0,
            trail_sample_interval: 5,
            error_history_len: 330,
            deterministic: false,
            log_every: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Random start poses keep at least this distance to the room borders.
    pub spawn_margin: f64,
    /// Fixed start pose. When absent the robot spawns at a random pose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_pose: Option<Pose2D>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 8.0,
            spawn_margin: 0.5,
            initial_pose: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LandmarkConfig {
    pub name: String,
    pub position: [f64; 2],
}
