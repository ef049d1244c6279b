// navslam_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

use crate::simulation::config::ScenarioConfig;

/// navslam: a headless EKF-SLAM waypoint-following robot simulator.
///
/// This struct defines the command-line arguments accepted by the `navslam`
/// binary. Flags override the values loaded from the scenario file.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run. Built-in defaults when omitted.
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,

    /// Seed for the simulation PRNG. Random when neither this nor the scenario sets one.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Upper bound on simulated time, in seconds.
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Disable odometry and sensor noise.
    #[arg(long, default_value_t = false)]
    pub deterministic: bool,

    /// Log a progress line every N ticks (0 disables it).
    #[arg(long)]
    pub log_every: Option<u64>,

    /// Print the effective scenario as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}

impl Cli {
    /// Applies the command-line overrides on top of a loaded scenario.
    pub fn apply_overrides(&self, config: &mut ScenarioConfig) {
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if let Some(duration) = self.duration {
            config.simulation.duration_seconds = duration;
        }
        if let Some(log_every) = self.log_every {
            config.simulation.log_every = log_every;
        }
        if self.deterministic || config.simulation.deterministic {
            config.make_deterministic();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_scenario() {
        let cli = Cli::parse_from([
            "navslam",
            "--seed",
            "7",
            "--duration",
            "12.5",
            "--deterministic",
            "--log-every",
            "0",
        ]);
        let mut config = ScenarioConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.duration_seconds, 12.5);
        assert_eq!(config.simulation.log_every, 0);
        assert_eq!(config.robot.odom_std, 0.0);
        assert!(cli.scenario.is_none());
    }

    #[test]
    fn test_deterministic_flag_in_scenario_is_honored() {
        let cli = Cli::parse_from(["navslam", "-s", "room.toml"]);
        let mut config = ScenarioConfig::default();
        config.simulation.deterministic = true;
        cli.apply_overrides(&mut config);
        assert_eq!(config.sensor.range_std, 0.0);
        assert_eq!(cli.scenario, Some(PathBuf::from("room.toml")));
    }
}
