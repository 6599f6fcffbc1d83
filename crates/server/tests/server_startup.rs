//! Server startup tests against the real binary.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Config pointing the store at a port nothing listens on; the server must
/// still come up and serve its API with an empty collection.
fn config_toml(port: u16) -> String {
    format!(
        r#"
[store]
base_url = "http://127.0.0.1:1"
timeout_secs = 1

[server]
host = "127.0.0.1"
port = {}
"#,
        port
    )
}

async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_deskline"))
        .env("DESKLINE_CONFIG", config_path)
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

#[tokio::test]
async fn test_server_starts_without_reachable_store() {
    let port = get_available_port();
    let mut config_file = NamedTempFile::new().unwrap();
    write!(config_file, "{}", config_toml(port)).unwrap();

    let mut server = spawn_server(config_file.path()).await;

    let client = reqwest::Client::new();
    let health_url = format!("http://127.0.0.1:{}/api/v1/health", port);

    let mut healthy = false;
    for _ in 0..50 {
        sleep(Duration::from_millis(200)).await;
        if let Ok(response) = client.get(&health_url).send().await {
            if response.status().is_success() {
                let body: serde_json::Value = response.json().await.unwrap();
                assert_eq!(body["status"], "ok");
                healthy = true;
                break;
            }
        }
    }
    assert!(healthy, "server never became healthy");

    // The sanitized config is served and carries no secrets section.
    let config_url = format!("http://127.0.0.1:{}/api/v1/config", port);
    let response = client.get(&config_url).send().await.unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["server"]["port"], port);
    assert!(body["store"]["api_key"].is_null());

    // An empty collection, not an error, after the failed initial fetch.
    let tickets_url = format!("http://127.0.0.1:{}/api/v1/views/groups", port);
    let response = client.get(&tickets_url).send().await.unwrap();
    assert!(response.status().is_success());

    server.kill().await.ok();
}

#[tokio::test]
async fn test_server_exits_on_missing_config() {
    let mut server = tokio::process::Command::new(env!("CARGO_BIN_EXE_deskline"))
        .env("DESKLINE_CONFIG", "/nonexistent/deskline.toml")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server");

    let status = tokio::time::timeout(Duration::from_secs(10), server.wait())
        .await
        .expect("server should exit promptly")
        .expect("wait failed");
    assert!(!status.success());
}
