//! Shared utilities for integration tests.

use std::net::SocketAddr;

use request_normalizer::{HttpServer, NormalizerConfig, Shutdown};
use tokio::net::TcpListener;

/// Start the server on an ephemeral loopback port.
///
/// Returns the bound address and the coordinator that stops it.
pub async fn start_server(config: NormalizerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that never pools or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
