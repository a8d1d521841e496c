//! Entry file resolution.
//!
//! # Responsibilities
//! - Read a directory's entry file (a small TOML manifest)
//! - Resolve the designated router value to a registered [`RouterUnit`]
//! - Classify the outcome: loaded, no router, or load error
//!
//! # Entry file format
//! ```toml
//! router = "users"     # designated router value (`app` is accepted as an alias)
//! tags = ["users"]     # optional; defaults to the directory name
//! ```
//!
//! # Design Decisions
//! - A missing entry file is not an error: the directory is a namespace only
//! - Every other problem is a [`LoadError`] scoped to that one directory
//! - Unknown keys are rejected so typos do not silently mount nothing

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::routing::unit::{RouterUnit, UnitRegistry};
use crate::routing::walker::CandidateDirectory;

/// Why an entry file could not produce a router unit.
#[derive(Debug, Error)]
pub enum LoadCause {
    #[error("cannot read entry file: {0}")]
    Read(#[source] io::Error),

    #[error("malformed entry file: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("entry file does not declare `router`")]
    MissingRouter,

    #[error("entry file declares both `router` (`{router}`) and `app` (`{app}`)")]
    AmbiguousRouter { router: String, app: String },

    #[error("no router unit named `{0}` is registered")]
    UnknownUnit(String),

    #[error("router unit `{unit}` is invalid: {}", .defects.join("; "))]
    InvalidUnit { unit: String, defects: Vec<String> },
}

/// A directory whose entry file exists but is unusable.
#[derive(Debug, Error)]
#[error("{}: {cause}", .directory.display())]
pub struct LoadError {
    pub directory: PathBuf,
    #[source]
    pub cause: LoadCause,
}

/// Parsed entry file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EntryManifest {
    pub router: Option<String>,
    pub app: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl EntryManifest {
    /// The single designated unit name.
    pub fn designated(&self) -> Result<&str, LoadCause> {
        match (&self.router, &self.app) {
            (Some(router), None) => Ok(router),
            (None, Some(app)) => Ok(app),
            (Some(router), Some(app)) => Err(LoadCause::AmbiguousRouter {
                router: router.clone(),
                app: app.clone(),
            }),
            (None, None) => Err(LoadCause::MissingRouter),
        }
    }
}

/// A router unit resolved from a directory.
#[derive(Debug)]
pub struct LoadedUnit {
    pub directory: CandidateDirectory,
    pub unit: RouterUnit,
    pub tags: Vec<String>,
}

/// Result of a successful load attempt.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(LoadedUnit),
    /// No entry file; the directory only groups deeper directories.
    NoRouter(CandidateDirectory),
}

/// Resolves entry files against a unit registry.
#[derive(Debug, Clone, Copy)]
pub struct Loader<'a> {
    entry_file: &'a str,
    base_segment: &'a str,
    registry: &'a UnitRegistry,
}

impl<'a> Loader<'a> {
    pub fn new(entry_file: &'a str, base_segment: &'a str, registry: &'a UnitRegistry) -> Self {
        Self {
            entry_file,
            base_segment,
            registry,
        }
    }

    pub fn entry_path(&self, directory: &CandidateDirectory) -> PathBuf {
        directory.absolute().join(self.entry_file)
    }

    pub fn load(&self, directory: CandidateDirectory) -> Result<LoadOutcome, LoadError> {
        let entry = self.entry_path(&directory);
        let content = match fs::read_to_string(&entry) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(LoadOutcome::NoRouter(directory));
            }
            Err(e) => return Err(fail(directory.absolute(), LoadCause::Read(e))),
        };

        match self.resolve(&directory, &content) {
            Ok((unit, tags)) => Ok(LoadOutcome::Loaded(LoadedUnit {
                directory,
                unit,
                tags,
            })),
            Err(cause) => Err(fail(directory.absolute(), cause)),
        }
    }

    fn resolve(
        &self,
        directory: &CandidateDirectory,
        content: &str,
    ) -> Result<(RouterUnit, Vec<String>), LoadCause> {
        let manifest: EntryManifest = toml::from_str(content).map_err(LoadCause::Parse)?;
        let name = manifest.designated()?;

        let unit = self
            .registry
            .build(name)
            .ok_or_else(|| LoadCause::UnknownUnit(name.to_string()))?;

        let defects = unit.defects();
        if !defects.is_empty() {
            return Err(LoadCause::InvalidUnit {
                unit: name.to_string(),
                defects,
            });
        }

        let tags = manifest
            .tags
            .clone()
            .unwrap_or_else(|| vec![self.default_tag(directory)]);
        Ok((unit, tags))
    }

    fn default_tag(&self, directory: &CandidateDirectory) -> String {
        directory
            .segments()
            .last()
            .cloned()
            .unwrap_or_else(|| self.base_segment.to_string())
    }
}

fn fail(directory: &Path, cause: LoadCause) -> LoadError {
    LoadError {
        directory: directory.to_path_buf(),
        cause,
    }
}
