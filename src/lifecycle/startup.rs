//! Startup orchestration.
//!
//! # Responsibilities
//! - Walk the routes root, load each directory, derive prefixes, mount units
//! - Record one outcome per directory and log it
//! - Summarize mounted vs skipped directories
//!
//! # Design Decisions
//! - Runs once, synchronously, before the listener is bound
//! - Degraded but available: load errors are collected, not fatal
//! - Fail fast on a bad routes root or a mount conflict

use std::path::PathBuf;

use thiserror::Error;

use crate::config::RoutesConfig;
use crate::observability::metrics;
use crate::routing::{
    CandidateDirectory, DiscoveryError, DiscoveryWalker, LoadOutcome, Loader, MountConflict,
    MountTable, PathMapper, UnitRegistry, WalkError,
};

/// Startup cannot continue.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("routes root misconfigured: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("mount conflict: {0}")]
    Conflict(#[from] MountConflict),
}

/// What happened to one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryStatus {
    Mounted { prefix: String, unit: String },
    NoRouter,
    LoadFailed { cause: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryOutcome {
    pub directory: PathBuf,
    /// Slash-joined path below the routes root, `.` for the root.
    pub relative: String,
    pub status: DirectoryStatus,
}

/// Directory counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub mounted: usize,
    pub no_router: usize,
    pub failed: usize,
}

impl BootstrapSummary {
    pub fn skipped(&self) -> usize {
        self.no_router + self.failed
    }

    pub fn total(&self) -> usize {
        self.mounted + self.skipped()
    }
}

/// Result of a completed bootstrap: the mount table plus diagnostics.
#[derive(Debug)]
pub struct BootstrapReport {
    pub table: MountTable,
    pub outcomes: Vec<DirectoryOutcome>,
}

impl BootstrapReport {
    pub fn summary(&self) -> BootstrapSummary {
        let mut summary = BootstrapSummary::default();
        for outcome in &self.outcomes {
            match outcome.status {
                DirectoryStatus::Mounted { .. } => summary.mounted += 1,
                DirectoryStatus::NoRouter => summary.no_router += 1,
                DirectoryStatus::LoadFailed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    /// Directories skipped because of a load or walk error.
    pub fn failures(&self) -> impl Iterator<Item = &DirectoryOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DirectoryStatus::LoadFailed { .. }))
    }
}

/// Composes the application's routes from a directory tree.
#[derive(Debug)]
pub struct Bootstrap<'a> {
    config: &'a RoutesConfig,
    registry: &'a UnitRegistry,
    mapper: PathMapper,
}

impl<'a> Bootstrap<'a> {
    pub fn new(config: &'a RoutesConfig, registry: &'a UnitRegistry) -> Self {
        Self {
            config,
            registry,
            mapper: PathMapper::new(config.base_segment.clone()),
        }
    }

    /// Walk the configured routes root and mount everything it defines.
    pub fn run(&self) -> Result<BootstrapReport, BootstrapError> {
        tracing::info!(
            root = %self.config.root.display(),
            base = %self.config.base_segment,
            entry_file = %self.config.entry_file,
            units = self.registry.len(),
            "Discovering routes"
        );
        let walker = DiscoveryWalker::new(&self.config.root)?;
        self.run_over(walker)
    }

    /// Mount every candidate in order. Used by [`run`](Self::run) with the
    /// walker; callers may supply their own sequence.
    pub fn run_over<I>(&self, candidates: I) -> Result<BootstrapReport, BootstrapError>
    where
        I: IntoIterator<Item = Result<CandidateDirectory, WalkError>>,
    {
        let loader = Loader::new(&self.config.entry_file, &self.config.base_segment, self.registry);
        let mut table = MountTable::new();
        let mut outcomes = Vec::new();

        for candidate in candidates {
            let outcome = match candidate {
                Ok(directory) => self.visit(&loader, &mut table, directory)?,
                Err(e) => {
                    tracing::warn!(
                        directory = %e.path().display(),
                        error = %e,
                        "Skipped route directory: walk error"
                    );
                    DirectoryOutcome {
                        directory: e.path().to_path_buf(),
                        relative: relative_of(&self.config.root, e.path()),
                        status: DirectoryStatus::LoadFailed { cause: e.to_string() },
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = BootstrapReport { table, outcomes };
        let summary = report.summary();
        tracing::info!(
            mounted = summary.mounted,
            skipped = summary.skipped(),
            no_router = summary.no_router,
            failed = summary.failed,
            "Route discovery complete"
        );
        metrics::record_bootstrap(&summary);
        Ok(report)
    }

    fn visit(
        &self,
        loader: &Loader<'_>,
        table: &mut MountTable,
        directory: CandidateDirectory,
    ) -> Result<DirectoryOutcome, MountConflict> {
        let relative = directory.relative_display();
        let path = directory.absolute().to_path_buf();

        let status = match loader.load(directory) {
            Ok(LoadOutcome::Loaded(loaded)) => {
                let prefix = self.mapper.map(loaded.directory.segments());
                let record = table.mount(prefix, loaded.unit, loaded.tags)?;
                tracing::info!(
                    directory = %relative,
                    prefix = %record.prefix,
                    unit = %record.unit,
                    endpoints = record.endpoints.len(),
                    "Mounted route directory"
                );
                DirectoryStatus::Mounted {
                    prefix: record.prefix.as_path(),
                    unit: record.unit.clone(),
                }
            }
            Ok(LoadOutcome::NoRouter(_)) => {
                tracing::info!(directory = %relative, "Skipped route directory: no router");
                DirectoryStatus::NoRouter
            }
            Err(e) => {
                tracing::warn!(
                    directory = %relative,
                    error = %e.cause,
                    "Skipped route directory: load error"
                );
                DirectoryStatus::LoadFailed {
                    cause: e.cause.to_string(),
                }
            }
        };

        Ok(DirectoryOutcome {
            directory: path,
            relative,
            status,
        })
    }
}

fn relative_of(root: &std::path::Path, path: &std::path::Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouterUnit;
    use std::fs;

    async fn ok() -> &'static str {
        "ok"
    }

    fn registry() -> UnitRegistry {
        UnitRegistry::new()
            .with("users", || RouterUnit::new("users").get("/", ok))
            .with("profile", || RouterUnit::new("profile").get("/{user_id}", ok))
    }

    fn config(root: PathBuf) -> RoutesConfig {
        RoutesConfig {
            root,
            ..RoutesConfig::default()
        }
    }

    #[test]
    fn test_outcomes_follow_walk_order() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("users/profile")).unwrap();
        fs::create_dir_all(tmp.path().join("empty")).unwrap();
        fs::write(tmp.path().join("users/route.toml"), "router = \"users\"").unwrap();
        fs::write(tmp.path().join("users/profile/route.toml"), "router = \"profile\"").unwrap();

        let registry = registry();
        let config = config(tmp.path().to_path_buf());
        let report = Bootstrap::new(&config, &registry).run().unwrap();

        let statuses: Vec<(&str, &DirectoryStatus)> =
            report.outcomes.iter().map(|o| (o.relative.as_str(), &o.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (".", &DirectoryStatus::NoRouter),
                ("empty", &DirectoryStatus::NoRouter),
                (
                    "users",
                    &DirectoryStatus::Mounted {
                        prefix: "/api/users".into(),
                        unit: "users".into()
                    }
                ),
                (
                    "users/profile",
                    &DirectoryStatus::Mounted {
                        prefix: "/api/users/profile".into(),
                        unit: "profile".into()
                    }
                ),
            ]
        );
        assert_eq!(
            report.summary(),
            BootstrapSummary {
                mounted: 2,
                no_router: 2,
                failed: 0
            }
        );
        assert_eq!(report.table.prefixes(), vec!["/api/users", "/api/users/profile"]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_every_directory_is_logged_at_info() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("users")).unwrap();
        fs::create_dir_all(tmp.path().join("empty")).unwrap();
        fs::write(tmp.path().join("users/route.toml"), "router = \"users\"").unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let registry = registry();
        let config = config(tmp.path().to_path_buf());
        tracing::subscriber::with_default(subscriber, || {
            Bootstrap::new(&config, &registry).run().unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("Skipped route directory: no router").count(), 2, "{output}");
        assert_eq!(output.matches("Mounted route directory").count(), 1, "{output}");
    }

    #[test]
    fn test_custom_base_segment() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("users")).unwrap();
        fs::write(tmp.path().join("users/route.toml"), "router = \"users\"").unwrap();

        let registry = registry();
        let config = RoutesConfig {
            base_segment: "v2".into(),
            ..config(tmp.path().to_path_buf())
        };
        let report = Bootstrap::new(&config, &registry).run().unwrap();
        assert_eq!(report.table.prefixes(), vec!["/v2/users"]);
    }

    #[test]
    fn test_walk_errors_are_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = registry();
        let config = config(tmp.path().to_path_buf());

        let unreadable = tmp.path().join("locked");
        let candidates = vec![
            Ok(CandidateDirectory::new(tmp.path(), Vec::new())),
            Err(WalkError::Unreadable {
                path: unreadable.clone(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }),
        ];

        let report = Bootstrap::new(&config, &registry).run_over(candidates).unwrap();
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].directory, unreadable);
        assert_eq!(failures[0].relative, "locked");
    }

    #[test]
    fn test_summary_arithmetic() {
        let summary = BootstrapSummary {
            mounted: 3,
            no_router: 2,
            failed: 1,
        };
        assert_eq!(summary.skipped(), 3);
        assert_eq!(summary.total(), 6);
    }
}
