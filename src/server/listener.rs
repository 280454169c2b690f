//! TCP Listener
//!
//! Accepts clients and gives each one its own task.

use std::io;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use super::connection::handle_connection;
use super::handlers::AppState;

/// Pause after a failed `accept` before trying again.
pub const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Accepts connections forever, spawning one task per client.
///
/// Accept errors are logged and retried after [`ACCEPT_BACKOFF`]. Callers stop the
/// server by dropping this future, e.g. from a `tokio::select!`.
pub async fn serve(listener: TcpListener, state: AppState) {
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                accept_backoff(&err).await;
                continue;
            }
        };

        let state = state.clone();
        tokio::spawn(async move {
            info!("Client connected: {}", addr);
            match handle_connection(stream, state).await {
                Ok(()) => info!("Client disconnected: {}", addr),
                Err(err) => warn!("Connection {} closed with error: {}", addr, err),
            }
        });
    }
}

/// Logs an accept failure and waits before the next attempt.
///
/// Errors such as EMFILE persist until a descriptor frees up.
async fn accept_backoff(err: &io::Error) {
    warn!(
        "Failed to accept connection: {}, retrying in {:?}",
        err, ACCEPT_BACKOFF
    );
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}
