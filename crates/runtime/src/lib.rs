#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![cfg_attr(test, allow(clippy::float_cmp))]
//! # Vehicle Runtime
//!
//! Headless host for the [`vehicle`] crate. It owns the pieces the vehicle
//! treats as external: the chassis rigid body and its integrator, the ground,
//! the frame/fixed-step scheduler and a scripted driver.

pub mod app;
pub mod scenario;
pub mod watcher;

pub use app::{run, RunOptions, RunSummary, Simulation};
pub use scenario::{ChassisSpec, DriveScript, GroundSpec, Scenario, ScriptSegment};
