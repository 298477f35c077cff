//! Shared utilities for integration tests.

use std::net::SocketAddr;

use edge_stream_publisher::config::PublisherConfig;
use edge_stream_publisher::{HttpServer, Shutdown};
use tokio::net::TcpListener;

/// Config pointing the stream client at `c8_url`.
pub fn config_for(c8_url: &str) -> PublisherConfig {
    let mut config = PublisherConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.stream.c8_url = c8_url.to_string();
    config.stream.fabric = "edge".into();
    config.stream.origin_name = "integration".into();
    config.stream.app_name = "sms-app".into();
    config.stream.stream_name = "auth".into();
    config
}

/// Spawn the publisher on an ephemeral port.
///
/// The returned `Shutdown` stops the server when triggered.
pub async fn start_publisher(config: PublisherConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Client that never reuses connections or goes through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
