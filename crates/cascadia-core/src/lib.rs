//! Cascading natural-disaster simulation engine.
//!
//! One seeded stage run samples an earthquake along a fault line, drives
//! seismic shaking and tsunami inundation through a shared damped leapfrog
//! wave solver, cascades landslides off the shaking field, and reduces the
//! final panel store into a damage/score report.
//!
//! The engine is a pure library: it consumes a structured
//! [`config::ScenarioConfig`] and returns a [`pipeline::StageOutcome`];
//! rendering, input, and file formats live in the surrounding binaries.

pub mod config;
pub mod damage;
pub mod error;
pub mod event;
pub mod field;
pub mod landslide;
pub mod panel;
pub mod pipeline;
pub mod score;
pub mod terrain;
pub mod wave;

pub use config::ScenarioConfig;
pub use error::SimError;
pub use pipeline::{run_stage, StageOutcome};
