// navslam_core/src/models/estimation/mod.rs

pub mod dynamics;
pub mod measurement;
