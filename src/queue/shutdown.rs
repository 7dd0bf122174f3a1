//! Termination-signal handling.

use tokio::task::JoinHandle;
use tracing::info;

use super::worker::StopHandle;

/// Spawns a task that listens for SIGINT/SIGTERM and requests a worker stop.
///
/// The stop is cooperative: the current poll/processing cycle finishes and
/// nothing in flight is cancelled. Repeated signals are harmless, the stop
/// flag is only ever set.
pub fn listen_for_termination(stop: StopHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to create SIGINT handler");
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to create SIGTERM handler");

        tokio::select! {
            _ = sigint.recv() => info!("Received SIGINT, stopping the worker"),
            _ = sigterm.recv() => info!("Received SIGTERM, stopping the worker"),
        }

        stop.stop();
        info!("Worker stop requested, current cycle will finish before exit");
    })
}
