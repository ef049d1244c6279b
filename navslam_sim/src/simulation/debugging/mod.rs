// navslam_sim/src/simulation/debugging/mod.rs

pub mod state_error;
pub mod trajectory;

pub use state_error::EstimationErrorTracker;
pub use trajectory::TrajectoryHistory;
