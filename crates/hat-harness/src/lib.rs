//! Automation test harness
//!
//! Ties the pieces together for tests: load definitions from YAML or JSON,
//! validate them up front, replay their actions synchronously against a
//! [`MockRuntime`], and assert on the resulting service calls and states.
//!
//! Everything is per-instance; two harnesses never share state.

use std::path::PathBuf;

use thiserror::Error;

use hat_core::EntityIdError;
use hat_service_registry::ServiceError;
use hat_validation::ValidationError;

mod harness;
mod loader;
mod replay;
mod runtime;
mod tracker;

pub use harness::AutomationHarness;
pub use loader::{definitions_from_file, definitions_from_str};
pub use replay::{ReplayEngine, ReplayOptions, ReplayStep};
pub use runtime::MockRuntime;
pub use tracker::{ServiceTracker, TrackedCall};

/// Failures raised by the harness
///
/// Assertion helpers panic instead, matching how test assertions behave;
/// this enum covers the setup and replay paths.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse definition file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("automation definition did not decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    EntityId(#[from] EntityIdError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("service '{0}' is not in 'domain.service' form")]
    InvalidService(String),

    #[error("delay '{0}' does not resolve to a duration")]
    InvalidDelay(String),

    #[error("cannot replay '{kind}' action")]
    UnsupportedAction { kind: String },

    #[error("no automation named '{0}' is loaded")]
    UnknownAutomation(String),
}
