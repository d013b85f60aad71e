//! # Headless Host Loop
//!
//! Plays the part of the engine around the vehicle: it samples the drive
//! script once per rendered frame, runs as many fixed physics steps as the
//! frame time allows, and integrates the chassis after each step.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use anyhow::Result;
use vehicle::{GroundPlane, SimpleBody, Vec3, VehicleController, VehicleSpec};

use crate::scenario::Scenario;

const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);
/// Fixed steps allowed per frame before the accumulator is dropped
const MAX_SUBSTEPS: usize = 8;

#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub frames: usize,
    pub frame_dt: f32,
    pub fixed_dt: f32,
    /// Log progress every this many frames, 0 disables it
    pub log_every: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_dt: 1.0 / 60.0,
            fixed_dt: 0.02,
            log_every: 60,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RunSummary {
    pub frames: usize,
    pub fixed_steps: usize,
    pub reloads: usize,
    pub position: Vec3,
    pub forward_speed: f32,
    pub grounded_wheels: usize,
}

pub struct Simulation {
    scenario: Scenario,
    car: VehicleController,
    body: SimpleBody,
    ground: GroundPlane,
    time: f32,
    accumulator: f32,
    fixed_steps: usize,
}

impl Simulation {
    pub fn new(scenario: Scenario) -> Result<Self> {
        let car = scenario.vehicle.build()?;
        let body = scenario.chassis.spawn_body();
        let ground = scenario.ground.plane();
        Ok(Self {
            scenario,
            car,
            body,
            ground,
            time: 0.0,
            accumulator: 0.0,
            fixed_steps: 0,
        })
    }

    #[must_use]
    pub fn car(&self) -> &VehicleController {
        &self.car
    }

    #[must_use]
    pub fn body(&self) -> &SimpleBody {
        &self.body
    }

    #[must_use]
    pub fn fixed_steps(&self) -> usize {
        self.fixed_steps
    }

    /// Swap in a new vehicle description, keeping the chassis in motion.
    pub fn reload_vehicle(&mut self, spec: VehicleSpec) -> Result<()> {
        self.car = spec.build()?;
        self.scenario.vehicle = spec;
        tracing::info!(
            drive_type = ?self.scenario.vehicle.controller.drive_type,
            "Vehicle reloaded"
        );
        Ok(())
    }

    /// Advance one rendered frame.
    pub fn frame(&mut self, frame_dt: f32, fixed_dt: f32) {
        let input = self.scenario.script.sample(self.time);
        self.car.on_frame(frame_dt, input);

        self.accumulator += frame_dt;
        let mut substeps = 0;
        while self.accumulator >= fixed_dt {
            if substeps == MAX_SUBSTEPS {
                tracing::warn!(
                    dropped = self.accumulator,
                    "Simulation falling behind, dropping accumulated time"
                );
                self.accumulator = 0.0;
                break;
            }
            self.car.on_fixed_step(&mut self.body, &self.ground, fixed_dt);
            self.body.integrate(fixed_dt, GRAVITY);
            self.accumulator -= fixed_dt;
            self.fixed_steps += 1;
            substeps += 1;
        }
        self.time += frame_dt;
    }

    fn summary(&self, frames: usize, reloads: usize) -> RunSummary {
        let info = self.car.debug_info(&self.body);
        RunSummary {
            frames,
            fixed_steps: self.fixed_steps,
            reloads,
            position: self.body.position,
            forward_speed: info.forward_speed,
            grounded_wheels: info.grounded_wheels(),
        }
    }
}

/// Run `scenario` headless for `options.frames` frames.
///
/// When `reloads` is given, every path received on it is re-read as a
/// scenario and its vehicle swapped in between frames. A reload that fails
/// to parse or build is logged and the running vehicle is kept.
///
/// # Errors
///
/// Returns an error if the initial vehicle cannot be built or the step
/// durations are not positive.
pub fn run(
    scenario: Scenario,
    options: &RunOptions,
    reloads: Option<&Receiver<PathBuf>>,
) -> Result<RunSummary> {
    if !(options.frame_dt > 0.0 && options.fixed_dt > 0.0) {
        anyhow::bail!(
            "frame and fixed step durations must be positive (frame_dt = {}, fixed_dt = {})",
            options.frame_dt,
            options.fixed_dt
        );
    }

    tracing::info!("Initializing vehicle simulation...");
    let mut sim = Simulation::new(scenario)?;
    let mut reload_count = 0;

    tracing::info!(
        "Starting simulation loop for {} frames with frame_dt = {}, fixed_dt = {}...",
        options.frames,
        options.frame_dt,
        options.fixed_dt
    );
    for i in 0..options.frames {
        if let Some(rx) = reloads {
            while let Ok(path) = rx.try_recv() {
                match Scenario::from_path(&path).and_then(|s| sim.reload_vehicle(s.vehicle)) {
                    Ok(()) => reload_count += 1,
                    Err(e) => tracing::error!("Failed to reload {}: {e:#}", path.display()),
                }
            }
        }

        sim.frame(options.frame_dt, options.fixed_dt);

        if options.log_every > 0 && (i + 1) % options.log_every == 0 {
            let info = sim.car.debug_info(&sim.body);
            tracing::info!(
                "Frame {} complete. Position: {:?}, forward speed: {:.2}, grounded wheels: {}",
                i + 1,
                sim.body.position,
                info.forward_speed,
                info.grounded_wheels()
            );
        }
    }

    let summary = sim.summary(options.frames, reload_count);
    tracing::info!(
        "Simulation finished after {} frames ({} fixed steps). Final position: {:?}",
        summary.frames,
        summary.fixed_steps,
        summary.position
    );
    Ok(summary)
}
