//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Walk routes root → Load entry files → Mount units → Report
//!
//! Shutdown (shutdown.rs):
//!     Trigger or signal → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config, logging, route composition, then listener
//! - Route composition completes before any request is accepted
//! - A fatal composition error means the listener is never bound

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Bootstrap, BootstrapError, BootstrapReport, BootstrapSummary, DirectoryOutcome, DirectoryStatus};
