//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use siteguard::config::AppConfig;
use siteguard::lifecycle::{startup, Shutdown};
use siteguard::RequestThrottle;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub throttle: RequestThrottle,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), startup::StartupError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop the server and wait for it to exit.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked");
        assert!(result.is_ok(), "server returned an error: {result:?}");
    }
}

/// Start a server with `config` on 127.0.0.1:0.
pub async fn start_server(config: AppConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let throttle = RequestThrottle::new();
    let shutdown = Shutdown::new();

    let handle = tokio::spawn(startup::serve(
        listener,
        config,
        throttle.clone(),
        shutdown.clone(),
    ));

    TestServer {
        addr,
        throttle,
        shutdown,
        handle,
    }
}

/// A client that never pools or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
