//! Router units and the registry of compiled-in units.
//!
//! A router unit is a named bundle of `(method, relative path, handler)`
//! endpoints. It knows nothing about where it will be mounted. Units are
//! compiled into the binary and registered by name; a directory's entry file
//! names the unit that directory mounts.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{on, MethodFilter, MethodRouter};

/// One endpoint of a router unit.
pub struct Endpoint {
    method: Method,
    path: String,
    route: Option<MethodRouter>,
}

impl Endpoint {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the mount prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn into_route(self) -> Option<MethodRouter> {
        self.route
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// A named collection of endpoint definitions.
#[derive(Debug)]
pub struct RouterUnit {
    name: String,
    endpoints: Vec<Endpoint>,
}

impl RouterUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub(crate) fn into_endpoints(self) -> Vec<Endpoint> {
        self.endpoints
    }

    /// Add an endpoint answering `method` at `path`, relative to the prefix.
    pub fn route<H, T>(mut self, method: Method, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let route = MethodFilter::try_from(method.clone())
            .ok()
            .map(|filter| on(filter, handler));
        self.endpoints.push(Endpoint {
            method,
            path: path.into(),
            route,
        });
        self
    }

    pub fn get<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(Method::GET, path, handler)
    }

    pub fn post<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(Method::POST, path, handler)
    }

    pub fn put<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(Method::PUT, path, handler)
    }

    pub fn delete<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(Method::DELETE, path, handler)
    }

    /// Problems that make this unit unmountable; empty when it is well formed.
    ///
    /// Relative paths must be empty or start with `/`, every method must be
    /// one the router can dispatch, and no method/path pair may repeat.
    pub fn defects(&self) -> Vec<String> {
        let mut defects = Vec::new();
        let mut seen = HashSet::new();

        for endpoint in &self.endpoints {
            if !endpoint.path.is_empty() && !endpoint.path.starts_with('/') {
                defects.push(format!(
                    "{} `{}`: relative path must start with `/`",
                    endpoint.method, endpoint.path
                ));
            }
            if let Some(problem) = path_syntax_problem(&endpoint.path) {
                defects.push(format!("{} `{}`: {problem}", endpoint.method, endpoint.path));
            }
            if endpoint.route.is_none() {
                defects.push(format!(
                    "{} `{}`: unsupported HTTP method",
                    endpoint.method, endpoint.path
                ));
            }
            if !seen.insert((endpoint.method.clone(), endpoint.path.as_str())) {
                defects.push(format!(
                    "{} `{}`: declared more than once",
                    endpoint.method, endpoint.path
                ));
            }
        }

        defects
    }
}

/// Parameters must fill a whole segment: `{name}`, or `{*name}` as the last
/// segment.
fn path_syntax_problem(path: &str) -> Option<&'static str> {
    let segments: Vec<&str> = path.split('/').collect();
    for (index, segment) in segments.iter().enumerate() {
        if segment.starts_with(':') {
            return Some("`:param` segments are not supported, use `{param}`");
        }
        if segment.starts_with('*') {
            return Some("`*rest` segments are not supported, use `{*rest}`");
        }
        let braces = segment.contains('{') || segment.contains('}');
        if !braces {
            continue;
        }
        let inner = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}'));
        let (name, catch_all) = match inner {
            Some(inner) => match inner.strip_prefix('*') {
                Some(name) => (name, true),
                None => (inner, false),
            },
            None => return Some("parameters must span a whole segment, e.g. `{id}`"),
        };
        if name.is_empty() || name.contains(['{', '}', '*']) {
            return Some("parameters must span a whole segment, e.g. `{id}`");
        }
        if catch_all && index + 1 != segments.len() {
            return Some("a `{*rest}` parameter must be the last segment");
        }
    }
    None
}

/// Builds a fresh [`RouterUnit`].
pub type UnitFactory = Arc<dyn Fn() -> RouterUnit + Send + Sync>;

/// Compiled-in router units, keyed by the name entry files refer to.
#[derive(Clone, Default)]
pub struct UnitRegistry {
    factories: BTreeMap<String, UnitFactory>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> RouterUnit + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Arc::new(factory)).is_some() {
            tracing::warn!(unit = %name, "Router unit registered twice; keeping the latest");
        }
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> RouterUnit + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Instantiate the unit registered under `name`.
    pub fn build(&self, name: &str) -> Option<RouterUnit> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}
