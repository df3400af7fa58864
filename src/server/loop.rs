// Server loop module
// Accept loop with graceful shutdown support

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// How long shutdown waits for in-flight connections to finish
const SHUTDOWN_DRAIN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Main server loop: accepts connections until a shutdown signal arrives,
/// then closes the listener and drains in-flight connections.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_shutdown_started();
                break;
            }
        }
    }

    // Stop accepting; in-flight connections keep their spawned tasks
    drop(listener);
    drain_connections(&active_connections).await;
    logger::log_shutdown_complete();

    Ok(())
}

/// Wait for active connections to finish, up to the drain timeout
async fn drain_connections(active_connections: &Arc<AtomicUsize>) {
    let deadline = tokio::time::Instant::now() + SHUTDOWN_DRAIN_TIMEOUT;

    while active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown drain timeout, {} connections still active",
                active_connections.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
}
