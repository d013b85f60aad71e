#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::float_cmp))]
//! # Arcade Raycast Vehicle
//!
//! Force generation for a four-wheel arcade car sitting on a host-owned rigid
//! body. The crate never integrates motion itself: wheels sample the body's
//! velocity field, raycast for the ground through a host-provided caster, and
//! push forces back into the body's accumulator.
//!
//! ## Key Components
//!
//! -   **Wheels:** [`WheelModel`] computes suspension, lateral grip, drive and
//!     brake forces for one corner per fixed step. Tuning lives in
//!     [`WheelConfig`].
//! -   **Controller:** [`VehicleController`] owns the four wheels, maps
//!     [`ControlInput`] to torque and Ackermann steering, and adds downforce
//!     and boost.
//! -   **Host capabilities:** the [`RigidBody`] and [`GroundCaster`] traits in
//!     [`host`] are all the vehicle needs from the surrounding engine.
//!     [`SimpleBody`] and [`GroundPlane`] are small reference hosts.
//! -   **Descriptions:** [`VehicleSpec`] loads a vehicle from JSON.
//!
//! ## Usage
//!
//! ```rust
//! use vehicle::{ControlInput, GroundPlane, SimpleBody, Vec3, VehicleSpec};
//!
//! let mut car = VehicleSpec::default().build()?;
//! let mut body = SimpleBody::solid_box(Vec3::new(0.0, 0.45, 0.0), 50.0, Vec3::new(0.9, 0.3, 1.5));
//! let ground = GroundPlane::default();
//!
//! let fixed_dt = 0.02;
//! car.on_frame(1.0 / 60.0, ControlInput { throttle: 1.0, ..ControlInput::default() });
//! car.on_fixed_step(&mut body, &ground, fixed_dt);
//! body.integrate(fixed_dt, Vec3::new(0.0, -9.81, 0.0));
//! # Ok::<(), vehicle::VehicleError>(())
//! ```

pub mod config;
pub mod controller;
pub mod curve;
pub mod debug;
pub mod error;
pub mod ground;
pub mod host;
pub mod integrator;
pub mod steering;
pub mod wheel;

pub use config::{VehicleSpec, WheelOverrides, WheelSpec};
pub use controller::{ControlInput, ControllerConfig, DriveType, VehicleController};
pub use curve::{Keyframe, ResponseCurve};
pub use debug::{VehicleDebugInfo, WheelDebugInfo};
pub use error::VehicleError;
pub use glam::{Quat, Vec3};
pub use ground::GroundPlane;
pub use host::{GroundCaster, LayerMask, RigidBody};
pub use integrator::SimpleBody;
pub use steering::{ackermann_angles, max_steer_angle, AckermannAngles};
pub use wheel::{WheelConfig, WheelForces, WheelModel, WheelPosition};
