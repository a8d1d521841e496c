//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum::serve, graceful shutdown)
//!     → request.rs (attach x-request-id)
//!     → mounted routes | `/` service info | liveness | 404 fallback
//! ```

pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{build_app, HttpServer, ServiceInfo};
