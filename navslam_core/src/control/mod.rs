// navslam_core/src/control/mod.rs

pub mod avoidance;
pub mod goal;

pub use avoidance::{AvoidanceCommand, ObstacleAvoidance};
pub use goal::{GoalController, NavigationStatus};
