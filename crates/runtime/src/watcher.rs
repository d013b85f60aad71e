//! # Scenario Hot-Reloading
//!
//! Watches the scenario file with [`notify`] so vehicle tuning can be edited
//! while the simulation runs. The watcher thread only forwards the changed
//! path over a channel; the simulation loop picks it up between frames and
//! rebuilds the vehicle, so nothing is mutated off the simulation thread.
//!
//! The caller must keep the returned [`RecommendedWatcher`] alive. Dropping it
//! stops the notifications.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tracing::{error, info};

/// Start watching `path` and return the watcher with the reload channel.
///
/// # Errors
///
/// Fails if the file does not exist or the platform watcher cannot be
/// created.
pub fn start(path: &Path) -> Result<(RecommendedWatcher, Receiver<PathBuf>)> {
    if !path.exists() {
        error!("Scenario file '{}' not found", path.display());
        return Err(anyhow::anyhow!("scenario file not found: {}", path.display()));
    }

    let (tx, rx) = channel();
    let watched = path.to_path_buf();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        handle_file_event(res, &watched, &tx);
    })
    .context("failed to create file watcher")?;

    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", path.display()))?;
    info!("Scenario watcher active - monitoring '{}'", path.display());
    Ok((watcher, rx))
}

fn handle_file_event(result: notify::Result<Event>, watched: &Path, tx: &Sender<PathBuf>) {
    match result {
        Ok(event) => {
            if !is_relevant(&event) {
                return;
            }
            // A closed receiver just means the simulation already finished.
            let _ = tx.send(watched.to_path_buf());
        }
        Err(e) => error!("File watcher error: {e:?}"),
    }
}

fn is_relevant(event: &Event) -> bool {
    event.kind.is_modify() || event.kind.is_create()
}
