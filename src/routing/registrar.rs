//! Application mount table.
//!
//! # Responsibilities
//! - Attach a router unit's endpoints under its prefix
//! - Refuse a second mount at the same prefix
//! - Refuse endpoints the final router could not hold together
//! - Refuse paths the final router could not parse
//! - Freeze into a single `axum::Router`
//!
//! # Design Decisions
//! - Endpoints are flattened to `prefix + relative path` rather than nested,
//!   so `GET /` under `/api/users` answers exactly `/api/users/`
//! - All conflict checks happen here so building the router never panics;
//!   every new path is dry-run through `matchit`, the matcher axum routes with
//! - Insertion order is kept for diagnostics

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use axum::http::Method;
use axum::routing::MethodRouter;
use axum::Router;
use thiserror::Error;

use crate::routing::prefix::{segment_problem, UrlPrefix};
use crate::routing::unit::RouterUnit;

/// Two mounts collided. Fatal to bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountConflict {
    #[error("prefix {prefix} is already mounted by unit `{existing}`; cannot mount `{incoming}`")]
    DuplicatePrefix {
        prefix: String,
        existing: String,
        incoming: String,
    },

    #[error("{method} {path} is already served by unit `{existing}`; cannot mount `{incoming}`")]
    DuplicateEndpoint {
        method: Method,
        path: String,
        existing: String,
        incoming: String,
    },

    #[error("{path} (unit `{incoming}`) and {existing_path} (unit `{existing}`) differ only in parameter names")]
    AmbiguousEndpoint {
        path: String,
        existing_path: String,
        existing: String,
        incoming: String,
    },

    #[error("{path} (unit `{incoming}`) overlaps {existing_path} (unit `{existing}`)")]
    OverlappingEndpoint {
        path: String,
        existing_path: String,
        existing: String,
        incoming: String,
    },

    #[error("{path} (unit `{unit}`) is not a valid route: {reason}")]
    InvalidPath {
        path: String,
        unit: String,
        reason: String,
    },
}

/// One unit mounted at one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRecord {
    pub prefix: UrlPrefix,
    pub unit: String,
    pub tags: Vec<String>,
    /// `(method, full path)` of every endpoint, in declaration order.
    pub endpoints: Vec<(Method, String)>,
}

struct PathSlot {
    path: String,
    route: MethodRouter,
    // method → owning unit
    owners: BTreeMap<String, String>,
}

/// Prefix → mounted unit, populated once at startup.
#[derive(Default)]
pub struct MountTable {
    records: Vec<MountRecord>,
    by_prefix: HashMap<String, usize>,
    // Keyed by path shape (parameter names erased).
    slots: BTreeMap<String, PathSlot>,
    // Every committed path, as the final router will see them.
    matcher: matchit::Router<()>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `unit` so each endpoint answers at `prefix + endpoint path`.
    ///
    /// Nothing is changed when an error is returned.
    pub fn mount(
        &mut self,
        prefix: UrlPrefix,
        unit: RouterUnit,
        tags: Vec<String>,
    ) -> Result<&MountRecord, MountConflict> {
        let prefix_path = prefix.as_path();
        if let Some(&index) = self.by_prefix.get(&prefix_path) {
            return Err(MountConflict::DuplicatePrefix {
                prefix: prefix_path,
                existing: self.records[index].unit.clone(),
                incoming: unit.name().to_string(),
            });
        }

        let unit_name = unit.name().to_string();
        let endpoints: Vec<(Method, String)> = unit
            .endpoints()
            .iter()
            .map(|e| (e.method().clone(), prefix.join(e.path())))
            .collect();
        self.check_endpoints(&unit_name, &endpoints)?;
        self.matcher = self.check_routable(&prefix, &unit_name, &endpoints)?;

        for ((method, path), endpoint) in endpoints.iter().zip(unit.into_endpoints()) {
            let Some(route) = endpoint.into_route() else {
                continue;
            };
            match self.slots.entry(path_shape(path)) {
                Entry::Occupied(mut slot) => {
                    let slot = slot.get_mut();
                    let existing = std::mem::replace(&mut slot.route, MethodRouter::new());
                    slot.route = existing.merge(route);
                    slot.owners.insert(method.to_string(), unit_name.clone());
                }
                Entry::Vacant(slot) => {
                    let mut owners = BTreeMap::new();
                    owners.insert(method.to_string(), unit_name.clone());
                    slot.insert(PathSlot {
                        path: path.clone(),
                        route,
                        owners,
                    });
                }
            }
        }

        let index = self.records.len();
        self.by_prefix.insert(prefix_path, index);
        self.records.push(MountRecord {
            prefix,
            unit: unit_name,
            tags,
            endpoints,
        });
        Ok(&self.records[index])
    }

    /// Insert the new paths into a copy of the matcher; the copy is returned
    /// only if every insertion succeeds.
    fn check_routable(
        &self,
        prefix: &UrlPrefix,
        incoming: &str,
        endpoints: &[(Method, String)],
    ) -> Result<matchit::Router<()>, MountConflict> {
        let invalid = |path: &str, reason: String| MountConflict::InvalidPath {
            path: path.to_string(),
            unit: incoming.to_string(),
            reason,
        };

        let prefix_segments = std::iter::once(prefix.base()).chain(prefix.segments().iter().map(String::as_str));
        for segment in prefix_segments {
            if let Some(reason) = segment_problem(segment) {
                return Err(invalid(&prefix.as_path(), format!("segment `{segment}`: {reason}")));
            }
        }

        let mut matcher = self.matcher.clone();
        let mut added = HashSet::new();
        for (_, path) in endpoints {
            if path.split('/').any(|segment| segment.starts_with([':', '*'])) {
                return Err(invalid(path, "segments must not start with `:` or `*`".to_string()));
            }
            if self.owner_of(path).is_some() || !added.insert(path.as_str()) {
                continue;
            }
            matcher.insert(path.as_str(), ()).map_err(|e| match e {
                matchit::InsertError::Conflict { with } => MountConflict::OverlappingEndpoint {
                    path: path.clone(),
                    existing: self.owner_of(&with).unwrap_or(incoming).to_string(),
                    existing_path: with,
                    incoming: incoming.to_string(),
                },
                other => invalid(path, other.to_string()),
            })?;
        }
        Ok(matcher)
    }

    /// A unit already serving exactly `path`.
    fn owner_of(&self, path: &str) -> Option<&str> {
        self.slots
            .get(&path_shape(path))
            .filter(|slot| slot.path == path)
            .and_then(|slot| slot.owners.values().next())
            .map(String::as_str)
    }

    fn check_endpoints(&self, incoming: &str, endpoints: &[(Method, String)]) -> Result<(), MountConflict> {
        let mut local: BTreeMap<String, (&str, HashSet<&Method>)> = BTreeMap::new();
        for (method, path) in endpoints {
            let shape = path_shape(path);

            if let Some(slot) = self.slots.get(&shape) {
                if slot.path != *path {
                    return Err(MountConflict::AmbiguousEndpoint {
                        path: path.clone(),
                        existing_path: slot.path.clone(),
                        existing: slot.owners.values().next().cloned().unwrap_or_default(),
                        incoming: incoming.to_string(),
                    });
                }
                if let Some(owner) = slot.owners.get(method.as_str()) {
                    return Err(MountConflict::DuplicateEndpoint {
                        method: method.clone(),
                        path: path.clone(),
                        existing: owner.clone(),
                        incoming: incoming.to_string(),
                    });
                }
            }

            let (existing_path, methods) = local
                .entry(shape)
                .or_insert_with(|| (path.as_str(), HashSet::new()));
            if *existing_path != path.as_str() {
                return Err(MountConflict::AmbiguousEndpoint {
                    path: path.clone(),
                    existing_path: existing_path.to_string(),
                    existing: incoming.to_string(),
                    incoming: incoming.to_string(),
                });
            }
            if !methods.insert(method) {
                return Err(MountConflict::DuplicateEndpoint {
                    method: method.clone(),
                    path: path.clone(),
                    existing: incoming.to_string(),
                    incoming: incoming.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn records(&self) -> &[MountRecord] {
        &self.records
    }

    pub fn get(&self, prefix: &str) -> Option<&MountRecord> {
        self.by_prefix.get(prefix).map(|&index| &self.records[index])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mounted prefixes in mount order.
    pub fn prefixes(&self) -> Vec<String> {
        self.records.iter().map(|r| r.prefix.as_path()).collect()
    }

    /// Freeze the table into a router serving every mounted endpoint.
    pub fn into_router(self) -> Router {
        self.slots
            .into_values()
            .fold(Router::new(), |router, slot| router.route(&slot.path, slot.route))
    }
}

impl fmt::Debug for MountTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountTable")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

/// `/a/{id}/b/{*rest}` → `/a/{}/b/{*}`.
fn path_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with("{*") && segment.ends_with('}') {
                "{*}"
            } else if segment.starts_with('{') && segment.ends_with('}') && !segment.starts_with("{{") {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
