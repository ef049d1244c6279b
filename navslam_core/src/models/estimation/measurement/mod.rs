// navslam_core/src/models/estimation/measurement/mod.rs

use dyn_clone::DynClone;
use nalgebra::{DMatrix, Matrix2, Vector2};
use std::fmt::Debug;

use crate::error::UpdateError;
use crate::frames::SlamState;
use crate::messages::Observation;
use crate::types::{LandmarkId, Pose2D};

/// Where a landmark lives inside the joint state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkSlot {
    pub id: LandmarkId,
    /// Index of the landmark's x entry; y is at `idx + 1`.
    pub idx: usize,
}

// --- MEASUREMENT MODEL TRAIT ---
// Represents the mathematical model of a landmark sensor. `z = h(x) + v`
pub trait LandmarkMeasurement: DynClone + Debug + Send + Sync {
    /// Returns the measurement noise covariance matrix `R`.
    fn get_r(&self) -> &Matrix2<f64>;

    /// Predicts the ideal measurement `z_pred = h(x)` of one landmark from the
    /// filter's state. Fails when the geometry is too degenerate to linearize.
    fn predict_measurement(
        &self,
        filter_state: &SlamState,
        slot: LandmarkSlot,
    ) -> Result<Vector2<f64>, UpdateError>;

    /// Calculates the `2 x dim` measurement Jacobian `H = ∂h/∂x`.
    fn calculate_jacobian(
        &self,
        filter_state: &SlamState,
        slot: LandmarkSlot,
    ) -> Result<DMatrix<f64>, UpdateError>;

    /// `z - z_pred`, with any angular components re-wrapped.
    fn innovation(&self, z: &Observation, z_pred: &Vector2<f64>) -> Vector2<f64>;

    /// Inverse observation model: where a landmark seen as `z` from `pose` is.
    fn initial_landmark_position(&self, pose: &Pose2D, z: &Observation) -> Vector2<f64>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn LandmarkMeasurement>`.
dyn_clone::clone_trait_object!(LandmarkMeasurement);

pub mod range_bearing;
