// navslam_core/src/models/estimation/measurement/range_bearing.rs

use nalgebra::{DMatrix, Matrix2, Vector2};

use crate::error::{check_noise, SlamError, UpdateError};
use crate::frames::SlamState;
use crate::messages::Observation;
use crate::models::estimation::measurement::{LandmarkMeasurement, LandmarkSlot};
use crate::types::Pose2D;
use crate::utils::angles::{angle_difference, wrap_angle};

/// Predicted ranges below this are treated as "robot sitting on the landmark".
pub const DEFAULT_MIN_PREDICTED_RANGE: f64 = 1e-6;

/// Range-bearing observation model of a point landmark.
#[derive(Debug, Clone)]
pub struct RangeBearingModel {
    /// The 2x2 measurement noise covariance `R` over `[range, bearing]`.
    pub r_matrix: Matrix2<f64>,
    /// Degeneracy floor on the predicted range, in meters.
    pub min_range: f64,
}

/// Relative geometry shared by the prediction and the Jacobian.
struct Geometry {
    dx: f64,
    dy: f64,
    q: f64,
    range: f64,
}

impl RangeBearingModel {
    /// Builds `R = diag(range_std^2, bearing_std^2) * scale`.
    pub fn from_stddevs(range_std: f64, bearing_std: f64, scale: f64) -> Result<Self, SlamError> {
        check_noise("meas_noise.range_std", range_std)?;
        check_noise("meas_noise.bearing_std", bearing_std)?;
        check_noise("meas_noise.scale", scale)?;
        let r_matrix = Matrix2::new(range_std.powi(2), 0.0, 0.0, bearing_std.powi(2)) * scale;
        Self::from_matrix(r_matrix)
    }

    /// Uses an explicit `R`. It must be symmetric positive definite.
    pub fn from_matrix(r_matrix: Matrix2<f64>) -> Result<Self, SlamError> {
        let symmetric = (r_matrix[(0, 1)] - r_matrix[(1, 0)]).abs() <= f64::EPSILON;
        let positive = r_matrix[(0, 0)] > 0.0 && r_matrix.determinant() > 0.0;
        if !(symmetric && positive && r_matrix.iter().all(|v| v.is_finite())) {
            return Err(SlamError::InvalidMeasurementNoise);
        }
        Ok(Self {
            r_matrix,
            min_range: DEFAULT_MIN_PREDICTED_RANGE,
        })
    }

    pub fn with_min_range(mut self, min_range: f64) -> Self {
        self.min_range = min_range;
        self
    }

    fn geometry(
        &self,
        filter_state: &SlamState,
        slot: LandmarkSlot,
    ) -> Result<Geometry, UpdateError> {
        let x = &filter_state.vector;
        let dx = x[slot.idx] - x[0];
        let dy = x[slot.idx + 1] - x[1];
        let q = dx * dx + dy * dy;
        let range = q.sqrt();
        if !(range >= self.min_range) {
            return Err(UpdateError::DegenerateGeometry { id: slot.id, range });
        }
        Ok(Geometry { dx, dy, q, range })
    }
}

impl LandmarkMeasurement for RangeBearingModel {
    fn get_r(&self) -> &Matrix2<f64> {
        &self.r_matrix
    }

    fn predict_measurement(
        &self,
        filter_state: &SlamState,
        slot: LandmarkSlot,
    ) -> Result<Vector2<f64>, UpdateError> {
        let g = self.geometry(filter_state, slot)?;
        let theta = filter_state.vector[2];
        Ok(Vector2::new(g.range, angle_difference(g.dy.atan2(g.dx), theta)))
    }

    fn calculate_jacobian(
        &self,
        filter_state: &SlamState,
        slot: LandmarkSlot,
    ) -> Result<DMatrix<f64>, UpdateError> {
        let Geometry { dx, dy, q, range } = self.geometry(filter_state, slot)?;
        let mut h = DMatrix::zeros(2, filter_state.dim());

        // Robot pose columns.
        h[(0, 0)] = -dx / range;
        h[(0, 1)] = -dy / range;
        h[(0, 2)] = 0.0;
        h[(1, 0)] = dy / q;
        h[(1, 1)] = -dx / q;
        h[(1, 2)] = -1.0;

        // Landmark columns: same magnitudes, opposite sign.
        h[(0, slot.idx)] = dx / range;
        h[(0, slot.idx + 1)] = dy / range;
        h[(1, slot.idx)] = -dy / q;
        h[(1, slot.idx + 1)] = dx / q;

        Ok(h)
    }

    fn innovation(&self, z: &Observation, z_pred: &Vector2<f64>) -> Vector2<f64> {
        // Raw subtraction of bearings near +/-pi jumps by 2pi, so wrap again.
        let mut nu = z.as_vector() - z_pred;
        nu[1] = wrap_angle(nu[1]);
        nu
    }

    fn initial_landmark_position(&self, pose: &Pose2D, z: &Observation) -> Vector2<f64> {
        let angle = pose.theta + z.bearing;
        Vector2::new(
            pose.x + z.range * angle.cos(),
            pose.y + z.range * angle.sin(),
        )
    }
}
