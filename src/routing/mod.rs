//! Routing subsystem: folder-convention route composition.
//!
//! # Data Flow
//! ```text
//! Route Composition (at startup):
//!     routes root
//!     → walker.rs (every directory, pre-order, sorted)
//!     → loader.rs (entry file → registered RouterUnit, or NoRouter / LoadError)
//!     → prefix.rs (relative segments → /<base>/<seg>/...)
//!     → registrar.rs (MountTable, conflict checks)
//!     → Freeze as immutable axum::Router
//! ```
//!
//! # Design Decisions
//! - Routes composed at startup, immutable at runtime
//! - Deterministic: the same tree always mounts in the same order
//! - Directory names become URL segments verbatim
//! - One broken directory never blocks the others

pub mod loader;
pub mod prefix;
pub mod registrar;
pub mod unit;
pub mod walker;

pub use loader::{EntryManifest, LoadCause, LoadError, LoadOutcome, LoadedUnit, Loader};
pub use prefix::{PathMapper, UrlPrefix};
pub use registrar::{MountConflict, MountRecord, MountTable};
pub use unit::{Endpoint, RouterUnit, UnitFactory, UnitRegistry};
pub use walker::{CandidateDirectory, DiscoveryError, DiscoveryWalker, WalkError};
