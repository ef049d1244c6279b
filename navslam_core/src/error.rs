// navslam_core/src/error.rs

use thiserror::Error;

use crate::types::LandmarkId;

/// Fatal problems detected once, when an estimator or model is constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlamError {
    #[error("state layout has {actual} entries, but {landmarks} landmarks require 3 + 2*{landmarks} = {expected}")]
    DimensionMismatch {
        landmarks: usize,
        expected: usize,
        actual: usize,
    },

    #[error("state layout is missing the robot pose variable at index {0}")]
    MissingPoseSlot(usize),

    #[error("landmark {0} has no contiguous (x, y) slot in the state layout")]
    MissingLandmarkSlot(LandmarkId),

    #[error("parameter '{name}' must be finite and >= 0, got {value}")]
    InvalidNoise { name: &'static str, value: f64 },

    #[error("parameter '{name}' must be finite and > 0, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("measurement noise matrix R must be 2x2 and positive definite")]
    InvalidMeasurementNoise,
}

/// Per-landmark reasons a correction was skipped. These never abort a tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpdateError {
    #[error("landmark {0} is not part of the configured landmark table")]
    UnknownLandmark(LandmarkId),

    #[error("landmark {id} predicted range {range:.3e} m is below the degeneracy floor")]
    DegenerateGeometry { id: LandmarkId, range: f64 },

    #[error("innovation covariance for landmark {0} is not invertible")]
    SingularInnovation(LandmarkId),
}

/// Checks that a standard deviation or variance is usable.
pub(crate) fn check_noise(name: &'static str, value: f64) -> Result<(), SlamError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SlamError::InvalidNoise { name, value })
    }
}

/// Checks that a physical constant (wheel base, range, gain) is strictly positive.
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), SlamError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SlamError::NonPositive { name, value })
    }
}
