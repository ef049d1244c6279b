// navslam_core/src/slam/mod.rs

use crate::estimation::StateEstimator;
use crate::mapping::Mapper;

/// A "super-trait" for a unified SLAM algorithm.
/// It acts as a marker for any struct that implements both StateEstimator and Mapper.
pub trait SlamSystem: StateEstimator + Mapper {}
