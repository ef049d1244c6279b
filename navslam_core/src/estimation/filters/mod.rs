// navslam_core/src/estimation/filters/mod.rs

pub mod ekf_slam;

pub use ekf_slam::EkfSlam;
