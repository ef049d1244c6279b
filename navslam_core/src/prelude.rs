// navslam_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::{StateEstimator, UpdateReport};
pub use crate::mapping::{LandmarkEstimate, MapData, Mapper};
pub use crate::messages::{LandmarkObservation, ModuleInput, Observation, SensorRay};
pub use crate::models::estimation::dynamics::EstimationDynamics;
pub use crate::models::estimation::measurement::LandmarkMeasurement;
pub use crate::slam::SlamSystem;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::error::{SlamError, UpdateError};
pub use crate::frames::{SlamState, StateVariable};
pub use crate::types::{Landmark, LandmarkId, Pose2D, VelocityCommand, WheelSpeeds};

// --- Parameters ---
pub use crate::config::{
    AvoidanceParams, ControllerParams, DriveParams, EstimatorParams, SensorParams,
};

// --- Concrete Implementations ---
pub use crate::control::{AvoidanceCommand, GoalController, NavigationStatus, ObstacleAvoidance};
pub use crate::estimation::filters::EkfSlam;
pub use crate::models::estimation::dynamics::diff_drive::{
    advance_pose, DifferentialDrive, WheelOdometry,
};
pub use crate::models::estimation::measurement::range_bearing::RangeBearingModel;
pub use crate::models::perception::RangeBearingSensor;
pub use crate::utils::angles::{angle_difference, wrap_angle};
