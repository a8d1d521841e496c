//! The server over a real socket.

mod common;

use std::time::Duration;

use common::{fixed_registry, RouteTree};
use tokio::net::TcpListener;

use folder_router::config::ServerConfig;
use folder_router::http::X_REQUEST_ID;
use folder_router::{Bootstrap, HttpServer, Shutdown};

#[tokio::test]
async fn test_serves_until_shutdown() {
    let tree = RouteTree::new();
    tree.router("users", "users");

    let mut config = ServerConfig::default();
    config.routes = tree.config();

    let registry = fixed_registry();
    let report = Bootstrap::new(&config.routes, &registry).run().unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, report.table);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let response = client.get(format!("{base}/api/users/")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let request_id = response
        .headers()
        .get(X_REQUEST_ID)
        .expect("request id header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(request_id.len(), 36);
    assert_eq!(response.text().await.unwrap(), "users payload");

    let response = client.get(format!("{base}/api")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let info: serde_json::Value = client.get(&base).send().await.unwrap().json().await.unwrap();
    assert_eq!(info["mounted"], serde_json::json!(["/api/users"]));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_supplied_request_id_is_echoed() {
    let tree = RouteTree::new();
    let mut config = ServerConfig::default();
    config.routes = tree.config();

    let registry = fixed_registry();
    let report = Bootstrap::new(&config.routes, &registry).run().unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(HttpServer::new(config, report.table).run(listener, shutdown.subscribe()));

    let response = reqwest::Client::new()
        .get(format!("{base}/health"))
        .header(X_REQUEST_ID, "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop")
        .unwrap()
        .unwrap();
}
