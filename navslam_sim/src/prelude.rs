// navslam_sim/src/prelude.rs

// Re-export the entire navslam_core prelude so you can easily access
// pure types like `Pose2D`, `EkfSlam`, `GoalController`, etc.
pub use navslam_core::prelude::*;

// Re-export common simulation-specific types for easy access.
pub use crate::simulation::config::{load_scenario, ConfigError, ScenarioConfig};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::core::simulation_loop::{RunSummary, Simulation, TickReport};
pub use crate::simulation::core::state::SimulationState;
pub use crate::simulation::debugging::{EstimationErrorTracker, TrajectoryHistory};
