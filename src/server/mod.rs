// Demo server module
// Binds the listener and serves the toolkit routes over HTTP/1

pub mod connection;
pub mod listener;
pub mod router;

use rust_webtools::{logger, ToolkitConfig};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use connection::handle_connection;
pub use listener::create_reusable_listener;

/// State shared by every connection
pub struct AppState {
    pub config: ToolkitConfig,
}

impl AppState {
    pub const fn new(config: ToolkitConfig) -> Self {
        Self { config }
    }
}

/// Accept connections until Ctrl+C
pub async fn run_server(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        logger::log_debug(&format!("Accepting connection from {peer_addr}"));
                        handle_connection(stream, Arc::clone(&state));
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            result = &mut shutdown => {
                result?;
                logger::log_shutdown();
                return Ok(());
            }
        }
    }
}
