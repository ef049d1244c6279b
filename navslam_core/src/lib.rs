// navslam_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod control;
pub mod error;
pub mod estimation;
pub mod frames;
pub mod mapping;
pub mod messages;
pub mod models;
pub mod prelude;
pub mod slam;
pub mod types;
pub mod utils;
