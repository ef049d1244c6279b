// navslam_core/src/estimation/mod.rs

use crate::error::UpdateError;
use crate::frames::SlamState;
use crate::messages::ModuleInput;
use crate::types::LandmarkId;

/// What one batch of observations did to the filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Landmarks placed in the map from their first sighting.
    pub initialized: Vec<LandmarkId>,
    /// Landmarks whose observation corrected the joint state.
    pub corrected: Vec<LandmarkId>,
    /// Observations dropped for this tick, with the reason.
    pub skipped: Vec<(LandmarkId, UpdateError)>,
}

impl UpdateReport {
    pub fn is_empty(&self) -> bool {
        self.initialized.is_empty() && self.corrected.is_empty() && self.skipped.is_empty()
    }

    /// Number of observations this report accounts for.
    pub fn processed(&self) -> usize {
        self.initialized.len() + self.corrected.len() + self.skipped.len()
    }
}

/// The contract for any algorithm that performs the "State Estimator" role.
/// Its sole responsibility is to estimate the joint state of the robot and its map.
pub trait StateEstimator: Send + Sync {
    /// The single, unified method for processing all types of input data.
    /// Prediction inputs return an empty report.
    fn process(&mut self, input: &ModuleInput) -> UpdateReport;

    /// Returns a reference to the current best estimate of the state.
    fn get_state(&self) -> &SlamState;
}

pub mod filters;
