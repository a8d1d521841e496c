//! Liveness endpoint.
//!
//! # Design Decisions
//! - Registered outside route discovery
//! - Answers as soon as the listener is up, whatever was mounted
//! - Static payload; no dependency checks

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Liveness {
    pub status: &'static str,
}

pub async fn liveness() -> Json<Liveness> {
    Json(Liveness { status: "healthy" })
}

/// Router answering `GET <path>`.
pub fn health_router(path: &str) -> Router {
    Router::new().route(path, get(liveness))
}
