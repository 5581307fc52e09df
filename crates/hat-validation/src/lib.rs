//! Semantic validator for automation definitions
//!
//! Inspects a raw automation definition (a decoded JSON/YAML mapping) and
//! reports every defect it finds, rather than failing on the first one. The
//! validator is pure and stateless: the same input always yields the same
//! `ValidationResult`, with messages in definition order (triggers before
//! conditions before actions), so it is safe to share across concurrent
//! test workers.
//!
//! Working on the raw value rather than the typed `hat-automation` model is
//! deliberate: typed decoding stops at the first defect, while tests want
//! the complete list in one report.

mod primitives;
mod rules;
mod validator;

pub use rules::{NumericRange, ServiceDataRules};
pub use validator::{
    Validator, VALID_CONDITION_TYPES, VALID_MODES, VALID_TRIGGER_PLATFORMS,
};

use thiserror::Error;

/// The outcome of validating one definition or one batch
///
/// Either every rule was checked and all violations collected, or
/// validation short-circuited with [`ValidationError::NotAMapping`] because
/// no further checking was meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    /// Every defect found, in definition order
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Fatal validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The root of the definition is not a mapping at all; no per-field
    /// checking is possible
    #[error("automation definition must be a mapping, got {found}")]
    NotAMapping { found: &'static str },

    /// Raised by [`assert_valid`] carrying the full defect list
    #[error("invalid automation configuration:\n  - {}", .errors.join("\n  - "))]
    Invalid { errors: Vec<String> },
}

/// Validate a single definition with the default rule set
pub fn validate(config: &serde_json::Value) -> Result<ValidationResult, ValidationError> {
    Validator::default().validate(config)
}

/// Validate a batch of sibling definitions, including id uniqueness
pub fn validate_batch(configs: &[serde_json::Value]) -> Result<ValidationResult, ValidationError> {
    Validator::default().validate_batch(configs)
}

/// Fail-fast wrapper over [`validate`] for call sites that want a raised
/// failure instead of a result value
pub fn assert_valid(config: &serde_json::Value) -> Result<(), ValidationError> {
    Validator::default().assert_valid(config)
}

/// One-line human-readable description of a definition, for diagnostics
pub fn summarize(config: &serde_json::Value) -> String {
    Validator::summarize(config)
}
