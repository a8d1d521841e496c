//! Route directory discovery.
//!
//! # Responsibilities
//! - Enumerate every directory below the routes root
//! - Report each as a [`CandidateDirectory`] with its relative segments
//!
//! # Design Decisions
//! - Lazy: a directory is listed only when the iterator reaches it
//! - Pre-order, siblings sorted by file name, so mount order is reproducible
//! - Directories are descended into whether or not they define a router
//! - Symlinks are not followed (no cycles)
//! - A bad root is fatal; a bad subdirectory is reported and its subtree skipped
//! - A directory whose name cannot be a URL segment counts as a bad subdirectory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::routing::prefix::segment_problem;

/// The routes root cannot be walked. Fatal to bootstrap.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("routes root {} does not exist", .0.display())]
    MissingRoot(PathBuf),

    #[error("routes root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("routes root {} cannot be inspected: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A directory below the root that could not be walked.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("cannot list {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory name {} is not valid UTF-8", .0.display())]
    NonUtf8Name(PathBuf),

    #[error("directory name {} cannot be a URL segment: {reason}", .path.display())]
    UnsafeName { path: PathBuf, reason: &'static str },
}

impl WalkError {
    pub fn path(&self) -> &Path {
        match self {
            WalkError::Unreadable { path, .. } => path,
            WalkError::NonUtf8Name(path) => path,
            WalkError::UnsafeName { path, .. } => path,
        }
    }
}

/// A directory found during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDirectory {
    absolute: PathBuf,
    segments: Vec<String>,
}

impl CandidateDirectory {
    pub fn new(absolute: impl Into<PathBuf>, segments: Vec<String>) -> Self {
        Self {
            absolute: absolute.into(),
            segments,
        }
    }

    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Names of the directories between the routes root and this one.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Slash-joined relative path, `.` for the routes root itself.
    pub fn relative_display(&self) -> String {
        if self.segments.is_empty() {
            ".".to_string()
        } else {
            self.segments.join("/")
        }
    }
}

/// Lazy pre-order iterator over the directories under a routes root.
#[derive(Debug)]
pub struct DiscoveryWalker {
    // Stack in reverse visiting order.
    pending: Vec<Pending>,
}

#[derive(Debug)]
enum Pending {
    Dir(CandidateDirectory),
    Failed(WalkError),
}

impl DiscoveryWalker {
    /// Start a walk at `root`, which must be an existing directory.
    pub fn new(root: &Path) -> Result<Self, DiscoveryError> {
        let metadata = match fs::metadata(root) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DiscoveryError::MissingRoot(root.to_path_buf()));
            }
            Err(source) => {
                return Err(DiscoveryError::Io {
                    path: root.to_path_buf(),
                    source,
                });
            }
        };

        if !metadata.is_dir() {
            return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
        }

        Ok(Self {
            pending: vec![Pending::Dir(CandidateDirectory::new(root, Vec::new()))],
        })
    }

    /// Queue the subdirectories of `dir` so they are visited next, in name order.
    fn expand(&mut self, dir: &CandidateDirectory) -> Result<(), WalkError> {
        let unreadable = |source| WalkError::Unreadable {
            path: dir.absolute.clone(),
            source,
        };

        let mut children = Vec::new();
        for entry in fs::read_dir(&dir.absolute).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if !entry.file_type().map_err(unreadable)?.is_dir() {
                continue;
            }
            children.push((entry.file_name(), entry.path()));
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));

        let queued = children.into_iter().rev().map(|(name, path)| match name.into_string() {
            Ok(name) => {
                if let Some(reason) = segment_problem(&name) {
                    return Pending::Failed(WalkError::UnsafeName { path, reason });
                }
                let mut segments = dir.segments.clone();
                segments.push(name);
                Pending::Dir(CandidateDirectory::new(path, segments))
            }
            Err(_) => Pending::Failed(WalkError::NonUtf8Name(path)),
        });
        self.pending.extend(queued);
        Ok(())
    }
}

impl Iterator for DiscoveryWalker {
    type Item = Result<CandidateDirectory, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.pending.pop()? {
            Pending::Failed(e) => Some(Err(e)),
            Pending::Dir(dir) => match self.expand(&dir) {
                Ok(()) => Some(Ok(dir)),
                Err(e) => Some(Err(e)),
            },
        }
    }
}
