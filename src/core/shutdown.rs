//! # Shutdown signal handling.
//!
//! Provides [`wait_for_shutdown_signal`], an async helper that completes when
//! the listener itself receives a termination signal. The supervisor sends
//! `SIGTERM` to its children while shutting down, so this is how the loop
//! learns that its parent is going away.
//!
//! ## Signals
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (sent by the supervisor on shutdown)
//! - `SIGQUIT`

use tokio::signal::unix::{signal, SignalKind};

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}
