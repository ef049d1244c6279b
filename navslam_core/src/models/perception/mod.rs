// navslam_core/src/models/perception/mod.rs

pub mod range_bearing;

pub use range_bearing::RangeBearingSensor;
