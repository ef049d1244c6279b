// navslam_core/src/estimation/filters/ekf_slam.rs

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use tracing::{debug, warn};

use crate::config::EstimatorParams;
use crate::error::{check_noise, SlamError, UpdateError};
use crate::estimation::{StateEstimator, UpdateReport};
use crate::frames::layout::{slam_state_dim, slam_state_layout};
use crate::frames::{SlamState, StateVariable};
use crate::mapping::{LandmarkEstimate, MapData, Mapper};
use crate::messages::{LandmarkObservation, ModuleInput, Observation};
use crate::models::estimation::dynamics::EstimationDynamics;
use crate::models::estimation::measurement::range_bearing::RangeBearingModel;
use crate::models::estimation::measurement::{LandmarkMeasurement, LandmarkSlot};
use crate::slam::SlamSystem;
use crate::types::{LandmarkId, Pose2D, VelocityCommand};
use crate::utils::angles::wrap_angle;

/// An Extended Kalman Filter over the joint robot-pose + landmark-map state.
#[derive(Debug, Clone)]
pub struct EkfSlam {
    /// The current state of the filter (x, P, seen flags, t).
    state: SlamState,
    /// Process noise `Q`, added to the pose block once per prediction.
    process_noise_q: Matrix3<f64>,

    dynamics: Box<dyn EstimationDynamics>,
    measurement_model: Box<dyn LandmarkMeasurement>,

    /// Landmark id -> state slot, built once at construction.
    landmark_slots: Vec<LandmarkSlot>,
    symmetrize_covariance: bool,
}

impl EkfSlam {
    /// Creates a filter for `landmark_count` landmarks using the standard
    /// layout and a range-bearing measurement model built from `params`.
    pub fn new(
        params: &EstimatorParams,
        dynamics: Box<dyn EstimationDynamics>,
        initial_pose: Pose2D,
        landmark_count: usize,
    ) -> Result<Self, SlamError> {
        params.validate()?;
        let measurement_model = RangeBearingModel::from_stddevs(
            params.meas_noise_std[0],
            params.meas_noise_std[1],
            params.meas_noise_scale,
        )?
        .with_min_range(params.min_predicted_range);

        let state = SlamState::new(
            slam_state_layout(landmark_count),
            initial_pose,
            params.initial_pose_variance,
            params.initial_landmark_variance,
        );
        let mut filter = Self::with_state(
            state,
            Vector3::from(params.motion_noise),
            dynamics,
            Box::new(measurement_model),
        )?;
        filter.symmetrize_covariance = params.symmetrize_covariance;
        Ok(filter)
    }

    /// Creates a filter from an explicit state. The layout must be the
    /// pose `[Px, Py, Yaw]` followed by one contiguous `(x, y)` pair per
    /// landmark, and the vector and covariance must match it.
    pub fn with_state(
        state: SlamState,
        motion_noise: Vector3<f64>,
        dynamics: Box<dyn EstimationDynamics>,
        measurement_model: Box<dyn LandmarkMeasurement>,
    ) -> Result<Self, SlamError> {
        check_noise("motion_noise.x", motion_noise[0])?;
        check_noise("motion_noise.y", motion_noise[1])?;
        check_noise("motion_noise.theta", motion_noise[2])?;

        let landmark_slots = validate_layout(&state)?;

        Ok(Self {
            state,
            process_noise_q: Matrix3::from_diagonal(&motion_noise),
            dynamics,
            measurement_model,
            landmark_slots,
            symmetrize_covariance: true,
        })
    }

    /// The filter's current pose belief.
    pub fn pose(&self) -> Pose2D {
        self.state.pose()
    }

    pub fn landmark_count(&self) -> usize {
        self.landmark_slots.len()
    }

    /// Advances the pose belief by one odometry step.
    ///
    /// `F` is linearized at the heading *before* the step. Landmarks are
    /// static, so only the pose rows and columns of `P` change. `dt <= 0` is a
    /// no-op.
    pub fn predict(&mut self, u: &VelocityCommand, dt: f64) {
        if !(dt > 0.0) {
            if dt < 0.0 || dt.is_nan() {
                warn!(dt, "Ignoring prediction with non-positive time step");
            }
            return;
        }

        let pose = self.state.pose();

        // 1. Linearize the motion at the current heading.
        let f_pose = self.dynamics.calculate_jacobian(&pose, u, dt);

        // 2. Predict the pose.
        let next = self.dynamics.propagate(&pose, u, dt);
        self.state.vector[0] = next.x;
        self.state.vector[1] = next.y;
        self.state.vector[2] = next.theta;

        // 3. Predict the covariance: P = F * P * F^T + Q
        let n = self.state.dim();
        let mut f_jac = DMatrix::<f64>::identity(n, n);
        f_jac.fixed_view_mut::<3, 3>(0, 0).copy_from(&f_pose);
        let mut p_pred = &f_jac * &self.state.covariance * f_jac.transpose();
        let mut pose_block = p_pred.fixed_view_mut::<3, 3>(0, 0);
        pose_block += self.process_noise_q;

        self.state.covariance = p_pred;
        self.state.last_update_timestamp += dt;
    }

    /// Fuses one tick of landmark observations, sequentially and in order.
    ///
    /// A landmark's first sighting only places it in the map. Every later
    /// sighting runs a full EKF correction. Problems with a single observation
    /// are recorded in the report and never abort the batch.
    pub fn update(&mut self, observations: &[LandmarkObservation]) -> UpdateReport {
        let mut report = UpdateReport::default();

        for obs in observations {
            let id = obs.landmark_id;
            let Some(slot) = self.landmark_slots.get(id.0).copied() else {
                warn!(landmark = %id, "Observation of unknown landmark dropped");
                report.skipped.push((id, UpdateError::UnknownLandmark(id)));
                continue;
            };

            if !self.state.landmark_seen[id.0] {
                self.initialize_landmark(slot, &obs.observation);
                report.initialized.push(id);
                continue;
            }

            match self.correct(slot, &obs.observation) {
                Ok(()) => report.corrected.push(id),
                Err(err) => {
                    warn!(landmark = %id, error = %err, "Skipping landmark correction");
                    report.skipped.push((id, err));
                }
            }
        }

        report
    }

    /// Places an unseen landmark at the inverse observation of `z`.
    ///
    /// The covariance is left untouched, so the landmark keeps its large prior
    /// variance and no cross-correlation with the pose. This is a known
    /// approximation of full EKF-SLAM augmentation.
    fn initialize_landmark(&mut self, slot: LandmarkSlot, z: &Observation) {
        let position = self
            .measurement_model
            .initial_landmark_position(&self.state.pose(), z);
        self.state.vector[slot.idx] = position.x;
        self.state.vector[slot.idx + 1] = position.y;
        self.state.landmark_seen[slot.id.0] = true;
        debug!(
            landmark = %slot.id,
            x = position.x,
            y = position.y,
            "Initialized landmark from first sighting"
        );
    }

    /// The standard EKF correction for one already-initialized landmark.
    fn correct(&mut self, slot: LandmarkSlot, z: &Observation) -> Result<(), UpdateError> {
        let model = &self.measurement_model;

        // 1. Predict the measurement from our current state: z_hat = h(x)
        let z_pred = model.predict_measurement(&self.state, slot)?;

        // 2. Calculate the measurement Jacobian H.
        let h_jac = model.calculate_jacobian(&self.state, slot)?;

        // 3. Get the measurement noise covariance R.
        let r_mat = DMatrix::from_column_slice(2, 2, model.get_r().as_slice());

        // 4. Calculate the innovation (y), innovation covariance (S), and Kalman gain (K).
        let innovation = model.innovation(z, &z_pred);
        let y = DVector::from_column_slice(innovation.as_slice());
        let s = &h_jac * &self.state.covariance * h_jac.transpose() + r_mat;

        let s_inv = s
            .try_inverse()
            .ok_or(UpdateError::SingularInnovation(slot.id))?;
        let k_gain = &self.state.covariance * h_jac.transpose() * s_inv;

        // 5. Update the state vector and covariance matrix.
        self.state.vector += &k_gain * y;
        self.state.vector[2] = wrap_angle(self.state.vector[2]);

        let n = self.state.dim();
        let i = DMatrix::<f64>::identity(n, n);
        self.state.covariance = (i - k_gain * h_jac) * &self.state.covariance;
        if self.symmetrize_covariance {
            self.state.covariance =
                (&self.state.covariance + self.state.covariance.transpose()) * 0.5;
        }
        Ok(())
    }
}

/// Checks the layout once and builds the landmark lookup table.
fn validate_layout(state: &SlamState) -> Result<Vec<LandmarkSlot>, SlamError> {
    let pose_vars = [StateVariable::Px, StateVariable::Py, StateVariable::Yaw];
    for (i, var) in pose_vars.iter().enumerate() {
        if state.layout.get(i) != Some(var) {
            return Err(SlamError::MissingPoseSlot(i));
        }
    }

    let landmarks = state.landmark_count();
    let expected = slam_state_dim(landmarks);
    for actual in [
        state.dim(),
        state.vector.len(),
        state.covariance.nrows(),
        state.covariance.ncols(),
    ] {
        if actual != expected {
            return Err(SlamError::DimensionMismatch {
                landmarks,
                expected,
                actual,
            });
        }
    }

    (0..landmarks)
        .map(|i| {
            let id = LandmarkId(i);
            let idx = state
                .landmark_idx(id)
                .ok_or(SlamError::MissingLandmarkSlot(id))?;
            if state.layout.get(idx + 1) != Some(&StateVariable::LandmarkY(id)) {
                return Err(SlamError::MissingLandmarkSlot(id));
            }
            Ok(LandmarkSlot { id, idx })
        })
        .collect()
}

// --- The Public Trait Implementations ---
impl StateEstimator for EkfSlam {
    fn process(&mut self, input: &ModuleInput) -> UpdateReport {
        match input {
            ModuleInput::Odometry { command, dt } => {
                self.predict(command, *dt);
                UpdateReport::default()
            }
            ModuleInput::Observations { observations } => self.update(observations),
        }
    }

    fn get_state(&self) -> &SlamState {
        &self.state
    }
}

impl Mapper for EkfSlam {
    fn get_map(&self) -> MapData {
        let landmarks = self
            .landmark_slots
            .iter()
            .filter(|slot| self.state.is_seen(slot.id))
            .filter_map(|slot| {
                Some(LandmarkEstimate {
                    id: slot.id,
                    mean: self.state.landmark_mean(slot.id)?,
                    covariance: self.state.landmark_covariance(slot.id)?,
                })
            })
            .collect();
        MapData::FeatureMap { landmarks }
    }
}

impl SlamSystem for EkfSlam {}
