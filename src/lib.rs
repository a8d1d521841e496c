//! Folder-routed HTTP service library.
//!
//! Routes are composed at startup from a directory tree: every directory is a
//! URL segment, and a directory whose entry file names a registered router
//! unit has that unit's endpoints mounted under `/<base>/<dir>/<subdir>/...`.

pub mod config;
pub mod demo;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::{Bootstrap, BootstrapError, BootstrapReport, Shutdown};
pub use routing::{RouterUnit, UnitRegistry};
