//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use folder_router::config::RoutesConfig;
use folder_router::{RouterUnit, UnitRegistry};

/// A throwaway routes root.
pub struct RouteTree {
    dir: TempDir,
}

impl RouteTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create `relative` (and its parents) without an entry file.
    pub fn namespace(&self, relative: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Create `relative` with an entry file containing `content`.
    pub fn entry(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.namespace(relative);
        fs::write(path.join("route.toml"), content).unwrap();
        path
    }

    /// Create `relative` whose entry file designates `unit`.
    pub fn router(&self, relative: &str, unit: &str) -> PathBuf {
        self.entry(relative, &format!("router = \"{unit}\"\n"))
    }

    pub fn config(&self) -> RoutesConfig {
        RoutesConfig {
            root: self.dir.path().to_path_buf(),
            ..RoutesConfig::default()
        }
    }
}

/// Units answering `GET /` with a fixed body naming themselves.
pub fn fixed_registry() -> UnitRegistry {
    UnitRegistry::new()
        .with("users", || RouterUnit::new("users").get("/", || async { "users payload" }))
        .with("profile", || {
            RouterUnit::new("profile")
                .get("/", || async { "profile payload" })
                .get("/{user_id}", |axum::extract::Path(id): axum::extract::Path<u32>| async move {
                    format!("profile {id}")
                })
        })
        .with("products", || RouterUnit::new("products").get("/", || async { "products payload" }))
        .with("x", || RouterUnit::new("x").get("/", || async { "x payload" }))
}

/// Send a request through `router` in-process.
pub async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    send(router, Method::GET, uri).await
}
