#![deny(clippy::all, clippy::pedantic)]
//! Entry point for the headless vehicle simulation.
//!
//! Runs a scenario (the built-in one unless `--scenario` is given) for a
//! fixed number of frames. With `--watch` the scenario file is hot-reloaded
//! whenever it changes on disk.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use runtime::{watcher, RunOptions, Scenario};

#[derive(Parser, Debug)]
#[command(name = "vehicle_sim", about = "Headless arcade vehicle simulation")]
struct Args {
    /// Scenario JSON (chassis, ground, vehicle, drive script)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Rendered frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: usize,

    /// Seconds per rendered frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_dt: f32,

    /// Seconds per fixed physics step
    #[arg(long, default_value_t = 0.02)]
    fixed_dt: f32,

    /// Log progress every N frames (0 disables)
    #[arg(long, default_value_t = 60)]
    log_every: usize,

    /// Reload the scenario's vehicle when the file changes
    #[arg(long)]
    watch: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => Scenario::from_path(path)?,
        None => Scenario::builtin()?,
    };

    let scenario_watcher = match (&args.scenario, args.watch) {
        (Some(path), true) => match watcher::start(path) {
            Ok(watcher_instance) => {
                tracing::info!("Scenario watcher started successfully.");
                Some(watcher_instance)
            }
            Err(e) => {
                tracing::error!("Failed to start scenario watcher: {e:?}");
                None
            }
        },
        (None, true) => {
            tracing::warn!("--watch needs --scenario; running without hot reload");
            None
        }
        _ => None,
    };

    let options = RunOptions {
        frames: args.frames,
        frame_dt: args.frame_dt,
        fixed_dt: args.fixed_dt,
        log_every: args.log_every,
    };
    let reloads = scenario_watcher.as_ref().map(|(_, rx)| rx);
    let summary = runtime::run(scenario, &options, reloads)?;

    println!(
        "frames={} fixed_steps={} position={:?} forward_speed={:.2} grounded_wheels={}",
        summary.frames,
        summary.fixed_steps,
        summary.position,
        summary.forward_speed,
        summary.grounded_wheels
    );
    Ok(())
}
