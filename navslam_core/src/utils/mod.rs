// navslam_core/src/utils/mod.rs

pub mod angles;
