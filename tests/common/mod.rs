//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_provider;

use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::time::Duration;

use promptcanvas::config::{Config, ProviderConfig};
use tempfile::TempDir;

/// Find an available port for testing.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

/// Create a temporary config file pointing at the given provider URL.
pub fn temp_config(base_url: &str, api_key_env: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");

    let content = format!(
        r#"[server]
bind_addr = "127.0.0.1:0"
log_ansi = false

[provider]
base_url = "{base_url}"
model = "gemini-test"
api_key_env = "{api_key_env}"
temperature = 0.2
connect_timeout_seconds = 2
request_timeout_seconds = 5
idle_timeout_seconds = 2
"#
    );

    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Provider settings aimed at a mock server, with short timeouts.
pub fn test_provider(base_url: &str, api_key_env: &str) -> ProviderConfig {
    ProviderConfig {
        base_url: base_url.to_string(),
        model: "gemini-test".to_string(),
        api_key_env: api_key_env.to_string(),
        connect_timeout_seconds: 2,
        request_timeout_seconds: 5,
        idle_timeout_seconds: 2,
        ..ProviderConfig::default()
    }
}

/// Wait for a server to become available.
pub async fn wait_for_server(addr: SocketAddr, timeout: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
