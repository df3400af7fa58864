// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

/// Start signal handlers and return the shutdown notifier (Unix).
///
/// Spawns a background task that listens for SIGTERM/SIGINT and notifies
/// the server loop to stop accepting connections.
#[cfg(unix)]
pub fn start_signal_handler() -> Arc<Notify> {
    use tokio::signal::unix::{signal, SignalKind};

    let shutdown = Arc::new(Notify::new());
    let notifier = Arc::clone(&shutdown);

    tokio::spawn(async move {
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }

        notifier.notify_waiters();
    });

    shutdown
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler() -> Arc<Notify> {
    let shutdown = Arc::new(Notify::new());
    let notifier = Arc::clone(&shutdown);

    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            notifier.notify_waiters();
        }
    });

    shutdown
}
