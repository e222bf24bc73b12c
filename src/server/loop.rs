// Server loop module
// Accepts connections until shutdown is requested, then drains them

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// Poll interval while waiting for connections to finish on shutdown
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop of the server.
///
/// Must run inside a `LocalSet`: connections are served by local tasks.
/// Returns once `shutdown` is notified and the active connections have
/// finished, or `performance.shutdown_timeout` has elapsed.
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

            () = shutdown.notified() => break,
        }
    }

    // Stop accepting before waiting on the remaining connections
    drop(listener);
    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now()
        + Duration::from_secs(state.config.performance.shutdown_timeout);
    while active_connections.load(Ordering::SeqCst) > 0
        && tokio::time::Instant::now() < deadline
    {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }

    logger::log_shutdown_complete(active_connections.load(Ordering::SeqCst));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_serves_requests_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("templates")).unwrap();
        std::fs::write(dir.path().join("templates/index.html"), "<html>shop</html>").unwrap();

        let mut cfg = Config::load_from(dir.path().join("absent").to_str().unwrap()).unwrap();
        cfg.resources.root = dir.path().to_str().unwrap().to_string();
        cfg.logging.access_log = false;
        cfg.performance.shutdown_timeout = 1;

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(config::AppState::new(&cfg));
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        let server = local.spawn_local(start_server_loop(
            listener,
            state,
            Arc::new(AtomicUsize::new(0)),
            Arc::clone(&shutdown),
        ));

        let response = local
            .run_until(async move {
                let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).await.unwrap();
                response
            })
            .await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("<html>shop</html>"));

        shutdown.notify_one();
        local.run_until(server).await.unwrap().unwrap();
    }
}
