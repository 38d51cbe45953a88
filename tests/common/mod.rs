//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

use arkr::{FileRecordStore, HttpServer, ResolverConfig, Shutdown};

/// Write a data directory with an index and one file per record.
pub fn data_dir(records: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let index: serde_json::Map<String, serde_json::Value> = records
        .iter()
        .map(|(naan, _)| (naan.to_string(), serde_json::json!({})))
        .collect();
    std::fs::write(dir.path().join("index.json"), serde_json::to_string(&index).unwrap()).unwrap();
    for (naan, body) in records {
        std::fs::write(dir.path().join(format!("{naan}.json")), body).unwrap();
    }
    dir
}

/// A resolver running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server over the records in `data_dir`.
pub async fn start_server(data_dir: &Path, mut config: ResolverConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();
    config.store.data_dir = data_dir.to_path_buf();

    let store = Arc::new(FileRecordStore::new(data_dir, config.store.cache_records));
    let server = HttpServer::new(config, store);
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    TestServer { addr, shutdown }
}

/// HTTP client that never follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
