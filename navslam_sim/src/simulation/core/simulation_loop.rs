// navslam_sim/src/simulation/core/simulation_loop.rs

use std::fmt;

use navslam_core::prelude::*;
use tracing::{debug, info};

use crate::simulation::config::{ConfigError, ScenarioConfig};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::simulation_setup::build_simulation_state;
use crate::simulation::core::state::SimulationState;
use crate::simulation::debugging::{EstimationErrorTracker, TrajectoryHistory};

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub time: f64,
    /// The command sent to the wheels.
    pub command: VelocityCommand,
    pub avoidance: AvoidanceCommand,
    /// Number of landmarks inside sensor range this tick.
    pub observations: usize,
    pub update: UpdateReport,
    pub position_error: f64,
    pub status: NavigationStatus,
}

/// End-of-run statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub sim_time: f64,
    pub status: NavigationStatus,
    pub goals_reached: usize,
    pub goals_total: usize,
    pub landmarks_seen: usize,
    pub landmarks_total: usize,
    pub true_pose: Pose2D,
    pub odometry_pose: Pose2D,
    pub estimated_pose: Pose2D,
    pub final_error: f64,
    pub mean_error: f64,
    pub rmse: f64,
    pub max_error: f64,
    /// Distance between the true and the dead-reckoned position.
    pub odometry_drift: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TASK: {} after {:.2}s ({} ticks)", self.status, self.sim_time, self.ticks)?;
        writeln!(f, "GOALS: {}/{}", self.goals_reached, self.goals_total)?;
        writeln!(f, "LANDMARKS MAPPED: {}/{}", self.landmarks_seen, self.landmarks_total)?;
        for (label, pose) in [
            ("TRUE", &self.true_pose),
            ("EST ", &self.estimated_pose),
            ("ODOM", &self.odometry_pose),
        ] {
            writeln!(
                f,
                "{label} x={:.2} y={:.2} θ={:.1}°",
                pose.x,
                pose.y,
                pose.theta.to_degrees()
            )?;
        }
        writeln!(
            f,
            "EKF ERROR (m): final={:.3} mean={:.3} rmse={:.3} max={:.3}",
            self.final_error, self.mean_error, self.rmse, self.max_error
        )?;
        write!(f, "ODOMETRY DRIFT (m): {:.3}", self.odometry_drift)
    }
}

/// A headless, fixed-rate run of the robot in its room.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: ScenarioConfig,
    pub state: SimulationState,
    pub trajectory: TrajectoryHistory,
    pub errors: EstimationErrorTracker,
    rng: SimulationRng,
}

impl Simulation {
    pub fn new(mut config: ScenarioConfig) -> Result<Self, ConfigError> {
        if config.simulation.deterministic {
            config.make_deterministic();
        }
        let mut rng = SimulationRng::new(config.simulation.seed);
        let state = build_simulation_state(&config, &mut rng)?;
        let mut trajectory = TrajectoryHistory::new(config.simulation.trail_sample_interval);
        let estimate = state.estimated_pose();
        trajectory.record(0, &state.true_pose, &state.odometry_pose, &estimate);

        Ok(Self {
            trajectory,
            errors: EstimationErrorTracker::new(config.simulation.error_history_len),
            config,
            state,
            rng,
        })
    }

    /// Runs one tick:
    /// behavior -> actuation (true + odometry) -> predict -> sense -> update.
    pub fn step(&mut self, dt: f64) -> TickReport {
        let s = &mut self.state;

        // --- 1. Behavior, from the estimate of the previous tick ---
        let estimate = s.estimated_pose();
        let avoidance = s.avoidance.steer(&s.true_pose, &s.landmarks, &s.sensor_rays);
        let command = s.controller.compute(&estimate, &avoidance);

        // --- 2. Actuation ---
        let executed = s.odometry.drive.realize(&command);
        s.true_pose = advance_pose(&s.true_pose, &executed, dt);
        let measured = s.odometry.measure(&command, &mut self.rng);
        s.odometry_pose = advance_pose(&s.odometry_pose, &measured, dt);

        // --- 3. Estimation: predict with what the encoders reported ---
        s.estimator.process(&ModuleInput::Odometry {
            command: measured,
            dt,
        });

        // --- 4. Perception from the new true pose, then correction ---
        let observations = s.sensor.sense(&s.true_pose, &s.landmarks, &mut self.rng);
        let update = s.estimator.process(&ModuleInput::Observations {
            observations: &observations,
        });
        for id in &update.initialized {
            if let Some(landmark) = s.landmarks.get(id.0) {
                info!(landmark = %landmark.name, tick = s.tick + 1, "Landmark mapped");
            }
        }
        s.sensor_rays = observations.iter().map(|obs| obs.ray).collect();

        // --- 5. Bookkeeping ---
        s.tick += 1;
        s.time += dt;
        let position_error = s.position_error();
        self.errors.record(position_error);
        let estimate = s.estimated_pose();
        self.trajectory
            .record(s.tick, &s.true_pose, &s.odometry_pose, &estimate);

        TickReport {
            tick: s.tick,
            time: s.time,
            command,
            avoidance,
            observations: observations.len(),
            update,
            position_error,
            status: s.status(),
        }
    }

    /// Steps at the configured rate until every goal is reached or the time
    /// budget is spent.
    pub fn run(&mut self) -> RunSummary {
        let dt = self.config.dt();
        let sim = &self.config.simulation;
        let max_ticks = (sim.duration_seconds * sim.rate_hz).ceil() as u64;
        let log_every = sim.log_every;

        info!(
            rate_hz = sim.rate_hz,
            duration_seconds = sim.duration_seconds,
            "Starting simulation"
        );

        while self.state.tick < max_ticks && !self.state.controller.is_complete() {
            let report = self.step(dt);
            debug!(
                tick = report.tick,
                v = report.command.linear,
                omega = report.command.angular,
                avoidance = report.avoidance.angle,
                observations = report.observations,
                "Tick"
            );
            if log_every > 0 && report.tick % log_every == 0 {
                info!(
                    "t={:.1}s | TASK: {} | Pos Err: {:.3}m | Mean Err: {:.3}m | Rays: {}",
                    report.time,
                    report.status,
                    report.position_error,
                    self.errors.mean(),
                    report.observations
                );
            }
        }

        let summary = self.summary();
        info!(
            status = %summary.status,
            ticks = summary.ticks,
            rmse = summary.rmse,
            "Simulation finished"
        );
        summary
    }

    pub fn summary(&self) -> RunSummary {
        let s = &self.state;
        let estimated_pose = s.estimated_pose();
        RunSummary {
            ticks: s.tick,
            sim_time: s.time,
            status: s.status(),
            goals_reached: s.controller.goal_index(),
            goals_total: s.controller.goals().len(),
            landmarks_seen: s.landmarks_seen(),
            landmarks_total: s.landmarks.len(),
            true_pose: s.true_pose,
            odometry_pose: s.odometry_pose,
            estimated_pose,
            final_error: s.position_error(),
            mean_error: self.errors.mean(),
            rmse: self.errors.rmse(),
            max_error: self.errors.max(),
            odometry_drift: s.true_pose.distance_to(&s.odometry_pose),
        }
    }
}
