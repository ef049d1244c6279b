// navslam_sim/src/simulation/core/mod.rs

pub mod prng;
pub mod simulation_loop;
pub mod simulation_setup;
pub mod state;
