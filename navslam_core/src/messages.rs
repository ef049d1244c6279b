use nalgebra::Vector2;

use crate::types::{LandmarkId, VelocityCommand};

// =========================================================================
// == Perception-Specific Data Structures ==
// =========================================================================

/// A single range-bearing reading of a landmark, relative to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Observation {
    /// Distance to the landmark in meters (>= 0).
    pub range: f64,
    /// Angle from the robot heading to the landmark, wrapped to (-pi, pi].
    pub bearing: f64,
}

impl Observation {
    pub fn new(range: f64, bearing: f64) -> Self {
        Self { range, bearing }
    }

    pub fn as_vector(&self) -> Vector2<f64> {
        Vector2::new(self.range, self.bearing)
    }
}

/// The world-frame segment from the sensor to a detected landmark.
/// Consumed by obstacle avoidance and by any renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorRay {
    pub start: Vector2<f64>,
    pub end: Vector2<f64>,
}

// =========================================================================
// == Core Message and Data Enums ==
// =========================================================================

/// An observation tagged with the landmark that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkObservation {
    pub landmark_id: LandmarkId,
    pub observation: Observation,
    pub ray: SensorRay,
}

/// The universal input packet for all `StateEstimator` implementations.
pub enum ModuleInput<'a> {
    /// Dead-reckoned velocity over the last `dt` seconds. Drives the prediction.
    Odometry { command: VelocityCommand, dt: f64 },
    /// All landmark observations of one tick, in sensor order.
    Observations {
        observations: &'a [LandmarkObservation],
    },
}
