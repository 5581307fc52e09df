//! Entity ID type representing a `domain.object_id` pair

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for invalid entity IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityIdError {
    #[error("entity_id '{0}' must contain exactly one '.' separator")]
    MissingSeparator(String),

    #[error("entity_id '{0}' has an empty domain or object_id")]
    EmptyPart(String),

    #[error("entity_id '{0}' contains invalid characters (lowercase alphanumeric and '_' only)")]
    InvalidChars(String),
}

/// A validated entity identifier such as `light.bedroom`
///
/// Stored as the full string with the position of the separator, so
/// `domain()` and `object_id()` are zero-copy slices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    full: String,
    sep: usize,
}

impl EntityId {
    /// Build an EntityId from separate domain and object_id parts
    pub fn new(domain: &str, object_id: &str) -> Result<Self, EntityIdError> {
        format!("{domain}.{object_id}").parse()
    }

    /// The domain part (e.g. "light")
    pub fn domain(&self) -> &str {
        &self.full[..self.sep]
    }

    /// The object_id part (e.g. "bedroom")
    pub fn object_id(&self) -> &str {
        &self.full[self.sep + 1..]
    }

    /// The full `domain.object_id` string
    pub fn as_str(&self) -> &str {
        &self.full
    }

    fn part_is_valid(part: &str) -> bool {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut dots = s.match_indices('.');
        let sep = match (dots.next(), dots.next()) {
            (Some((i, _)), None) => i,
            _ => return Err(EntityIdError::MissingSeparator(s.to_string())),
        };
        let (domain, object_id) = (&s[..sep], &s[sep + 1..]);
        if domain.is_empty() || object_id.is_empty() {
            return Err(EntityIdError::EmptyPart(s.to_string()));
        }
        if !Self::part_is_valid(domain) || !Self::part_is_valid(object_id) {
            return Err(EntityIdError::InvalidChars(s.to_string()));
        }
        Ok(Self {
            full: s.to_string(),
            sep,
        })
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> String {
        id.full
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}
