pub mod autopilot;
pub mod constants;
pub mod engine;
pub mod rng;
pub mod types;
pub mod world;
