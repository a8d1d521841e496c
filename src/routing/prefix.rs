//! Directory path → URL prefix mapping.
//!
//! # Responsibilities
//! - Derive the mount prefix of a directory from its relative segments
//!
//! # Design Decisions
//! - Pure and total: same segments always give the same prefix
//! - Segment names are used verbatim (case preserved, nothing escaped).
//!   Names the router would read as syntax are refused by [`segment_problem`]
//!   before they get here.
//! - Injective by construction: distinct segment lists give distinct prefixes

use std::fmt;

/// URL prefix a router unit is mounted under: `/<base>/<seg1>/.../<segN>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPrefix {
    base: String,
    segments: Vec<String>,
}

impl UrlPrefix {
    /// Segments contributed by the directory path, base excluded.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Number of relative segments; equals the source directory's depth.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Rendered path, e.g. `/api/users/profile`.
    pub fn as_path(&self) -> String {
        let mut path = String::with_capacity(
            1 + self.base.len() + self.segments.iter().map(|s| s.len() + 1).sum::<usize>(),
        );
        path.push('/');
        path.push_str(&self.base);
        for segment in &self.segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }

    /// Full path of an endpoint mounted under this prefix.
    ///
    /// An empty endpoint path addresses the prefix itself; `/` addresses the
    /// prefix with a trailing slash.
    pub fn join(&self, endpoint_path: &str) -> String {
        let mut path = self.as_path();
        path.push_str(endpoint_path);
        path
    }
}

impl fmt::Display for UrlPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_path())
    }
}

/// Maps relative directory segments to URL prefixes under a fixed base.
#[derive(Debug, Clone)]
pub struct PathMapper {
    base: String,
}

impl PathMapper {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Derive the prefix for a directory at `segments` below the routes root.
    pub fn map<S: AsRef<str>>(&self, segments: &[S]) -> UrlPrefix {
        UrlPrefix {
            base: self.base.clone(),
            segments: segments.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

/// Why `segment` cannot be used verbatim as a literal URL path segment.
///
/// Braces would be read as parameters, a leading `:` or `*` is rejected by
/// the router, and `?`, `#` or whitespace can never be matched by a request
/// path.
pub fn segment_problem(segment: &str) -> Option<&'static str> {
    if segment.is_empty() {
        Some("segment is empty")
    } else if segment.contains(['{', '}']) {
        Some("contains `{` or `}`")
    } else if segment.starts_with([':', '*']) {
        Some("starts with `:` or `*`")
    } else if segment.contains(['/', '?', '#']) {
        Some("contains `/`, `?` or `#`")
    } else if segment.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("contains whitespace or control characters")
    } else {
        None
    }
}
