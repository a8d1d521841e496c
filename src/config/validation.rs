//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Keep the fixed endpoints out of the discovered URL space
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::routing::prefix::segment_problem;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("routes.base_segment must be a single URL-safe path segment, got `{0}`")]
    BaseSegment(String),

    #[error("routes.entry_file must be a plain file name, got `{0}`")]
    EntryFile(String),

    #[error("health.path `{0}` must start with `/` and must not be `/`")]
    HealthPath(String),

    #[error("health.path `{path}` cannot be routed: {reason}")]
    HealthSegment { path: String, reason: &'static str },

    #[error("health.path `{path}` lies under the discovered route base `/{base}`")]
    HealthShadowed { path: String, base: String },

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every violation.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let base = &config.routes.base_segment;
    if segment_problem(base).is_some() {
        errors.push(ValidationError::BaseSegment(base.clone()));
    }

    let entry = &config.routes.entry_file;
    if entry.is_empty() || entry.contains('/') || entry.contains('\\') || entry == "." || entry == ".." {
        errors.push(ValidationError::EntryFile(entry.clone()));
    }

    let health = &config.health.path;
    if !health.starts_with('/') || health == "/" {
        errors.push(ValidationError::HealthPath(health.clone()));
    } else if let Some(reason) = health.split('/').filter(|s| !s.is_empty()).find_map(segment_problem) {
        errors.push(ValidationError::HealthSegment {
            path: health.clone(),
            reason,
        });
    } else if !base.is_empty() && under_base(health, base) {
        errors.push(ValidationError::HealthShadowed {
            path: health.clone(),
            base: base.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn under_base(path: &str, base: &str) -> bool {
    let first = path.trim_start_matches('/').split('/').next().unwrap_or_default();
    first == base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.routes.base_segment = "api/v1".into();
        config.routes.entry_file = "nested/route.toml".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::RequestTimeout));
        assert!(errors.contains(&ValidationError::BaseSegment("api/v1".into())));
    }

    #[test]
    fn test_health_path_rules() {
        let mut config = ServerConfig::default();
        config.health.path = "/".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::HealthPath("/".into())]
        );

        config.health.path = "/api/health".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::HealthShadowed {
                path: "/api/health".into(),
                base: "api".into(),
            }]
        );

        // Sharing a textual prefix with the base is fine.
        config.health.path = "/apix".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_route_syntax_is_refused() {
        let mut config = ServerConfig::default();
        config.routes.base_segment = "{api}".into();
        config.health.path = "/{status}".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BaseSegment("{api}".into()),
                ValidationError::HealthSegment {
                    path: "/{status}".into(),
                    reason: "contains `{` or `}`",
                },
            ]
        );

        config.routes.base_segment = "api".into();
        config.health.path = "/:health".into();
        assert!(matches!(
            validate_config(&config).unwrap_err()[..],
            [ValidationError::HealthSegment { .. }]
        ));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nope".into();
        assert_eq!(validate_config(&config), Ok(()));

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MetricsAddress("nope".into())]
        );
    }
}
