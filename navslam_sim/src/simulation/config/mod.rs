// navslam_sim/src/simulation/config/mod.rs

//! This module handles loading and validating all simulation configuration
//! from disk and from the environment.

pub mod structs;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use navslam_core::prelude::SlamError;
use thiserror::Error;
use tracing::info;

// Re-export public types
pub use structs::{LandmarkConfig, ScenarioConfig, SimulationSection, WorldConfig};

/// Environment variables with this prefix override scenario values, using
/// `__` between section and key: `NAVSLAM_SIMULATION__SEED=7`.
pub const ENV_PREFIX: &str = "NAVSLAM_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scenario file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to load or parse scenario: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid scenario value '{field}': {reason}")]
    Invalid { field: String, reason: String },

    #[error(transparent)]
    Model(#[from] SlamError),
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Loads a scenario: built-in defaults, then the TOML file (if any), then
/// `NAVSLAM_*` environment variables. The result is validated.
pub fn load_scenario(path: Option<&Path>) -> Result<ScenarioConfig, ConfigError> {
    let mut figment = Figment::new();
    if let Some(path) = path {
        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        info!("Loading scenario from: {}", path.display());
        figment = figment.merge(Toml::file(path));
    }
    let config: ScenarioConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    finish(config)
}

/// Parses a scenario from an in-memory TOML string. No environment overrides.
pub fn parse_scenario(toml: &str) -> Result<ScenarioConfig, ConfigError> {
    let config: ScenarioConfig = Figment::new().merge(Toml::string(toml)).extract()?;
    finish(config)
}

/// Applies the `deterministic` switch, then validates.
fn finish(mut config: ScenarioConfig) -> Result<ScenarioConfig, ConfigError> {
    if config.simulation.deterministic {
        config.make_deterministic();
    }
    config.validate()?;
    Ok(config)
}

fn require(condition: bool, field: &str, reason: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, reason))
    }
}

impl ScenarioConfig {
    /// Rejects configurations the simulation cannot start from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        require(
            sim.duration_seconds.is_finite() && sim.duration_seconds > 0.0,
            "simulation.duration_seconds",
            "must be finite and > 0",
        )?;
        require(
            sim.rate_hz.is_finite() && sim.rate_hz > 0.0,
            "simulation.rate_hz",
            "must be finite and > 0",
        )?;
        require(
            sim.trail_sample_interval > 0,
            "simulation.trail_sample_interval",
            "must be > 0",
        )?;
        require(
            sim.error_history_len > 0,
            "simulation.error_history_len",
            "must be > 0",
        )?;

        let world = &self.world;
        require(
            world.width.is_finite() && world.width > 0.0,
            "world.width",
            "must be finite and > 0",
        )?;
        require(
            world.height.is_finite() && world.height > 0.0,
            "world.height",
            "must be finite and > 0",
        )?;
        require(
            world.spawn_margin >= 0.0
                && 2.0 * world.spawn_margin < world.width
                && 2.0 * world.spawn_margin < world.height,
            "world.spawn_margin",
            "must be >= 0 and leave room to spawn",
        )?;
        if let Some(pose) = &world.initial_pose {
            require(
                pose.x.is_finite() && pose.y.is_finite() && pose.theta.is_finite(),
                "world.initial_pose",
                "must be finite",
            )?;
        }

        let mut names = HashSet::new();
        for (i, lm) in self.landmarks.iter().enumerate() {
            let field = format!("landmarks[{i}]");
            if lm.name.trim().is_empty() {
                return Err(ConfigError::invalid(field, "name must not be empty"));
            }
            if !names.insert(lm.name.as_str()) {
                return Err(ConfigError::invalid(
                    field,
                    format!("duplicate landmark name '{}'", lm.name),
                ));
            }
            if !lm.position.iter().all(|v| v.is_finite()) {
                return Err(ConfigError::invalid(field, "position must be finite"));
            }
        }
        for (i, goal) in self.goals.iter().enumerate() {
            require(
                goal.iter().all(|v| v.is_finite()),
                &format!("goals[{i}]"),
                "must be finite",
            )?;
        }

        self.robot.validate()?;
        self.sensor.validate()?;
        self.estimator.validate()?;
        self.controller.validate()?;
        self.avoidance.validate()?;
        Ok(())
    }
}
