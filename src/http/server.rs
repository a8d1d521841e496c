//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compose the mounted routes with the fixed endpoints (`/`, liveness)
//! - Wire up middleware (request id, tracing, timeout, metrics)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::health::health_router;
use crate::http::request::UuidRequestId;
use crate::lifecycle::shutdown::wait_for_stop;
use crate::observability::metrics;
use crate::routing::MountTable;

/// Payload of `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub title: String,
    pub description: String,
    pub version: &'static str,
    pub message: String,
    pub health: String,
    pub api_base: String,
    pub mounted: Vec<String>,
}

impl ServiceInfo {
    pub fn new(config: &ServerConfig, mounted: Vec<String>) -> Self {
        Self {
            title: config.info.title.clone(),
            description: config.info.description.clone(),
            version: env!("CARGO_PKG_VERSION"),
            message: format!("{} is running", config.info.title),
            health: config.health.path.clone(),
            api_base: format!("/{}", config.routes.base_segment),
            mounted,
        }
    }
}

#[derive(Debug, Serialize)]
struct NotFound {
    detail: &'static str,
}

async fn service_info(State(info): State<Arc<ServiceInfo>>) -> Json<ServiceInfo> {
    Json(info.as_ref().clone())
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(NotFound { detail: "Not Found" }))
}

/// Build the complete application router.
///
/// `config` must have passed validation: the liveness path is assumed not to
/// collide with `/` or with the discovered route base.
#[allow(deprecated)]
pub fn build_app(config: &ServerConfig, table: MountTable) -> Router {
    let info = Arc::new(ServiceInfo::new(config, table.prefixes()));

    let fixed = Router::new()
        .route("/", get(service_info))
        .with_state(info)
        .merge(health_router(&config.health.path));

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(axum::middleware::from_fn(metrics::track_requests));

    table
        .into_router()
        .merge(fixed)
        .fallback(not_found)
        .layer(middleware)
}

/// HTTP server for the composed application.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(config: ServerConfig, table: MountTable) -> Self {
        let router = build_app(&config, table);
        Self { router, config }
    }

    /// The fully layered router, e.g. for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires or a stop signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            health = %self.config.health.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_stop(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
