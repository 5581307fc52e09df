//! Entity state type owned by the mock state store

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{states, Context, EntityId};

/// The state of an entity at a point in time
///
/// Snapshots are immutable: the state store replaces the whole value on
/// every `set`, it never mutates a snapshot a test already holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityState {
    /// The entity this state belongs to
    pub entity_id: EntityId,

    /// The state value (e.g. "on", "off", "21.5")
    pub state: String,

    /// Attributes attached to the state
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,

    /// When this snapshot was written
    pub last_changed: DateTime<Utc>,

    /// Context of the write that produced this snapshot
    pub context: Context,
}

impl EntityState {
    /// Create a new snapshot stamped with the current time
    pub fn new(
        entity_id: EntityId,
        state: impl Into<String>,
        attributes: HashMap<String, serde_json::Value>,
        context: Context,
    ) -> Self {
        Self {
            entity_id,
            state: state.into(),
            attributes,
            last_changed: Utc::now(),
            context,
        }
    }

    /// Get an attribute deserialized to a concrete type
    pub fn attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn is_unavailable(&self) -> bool {
        self.state == states::STATE_UNAVAILABLE
    }

    pub fn is_unknown(&self) -> bool {
        self.state == states::STATE_UNKNOWN
    }
}

impl PartialEq for EntityState {
    fn eq(&self, other: &Self) -> bool {
        // Timestamps and context are not part of state identity
        self.entity_id == other.entity_id
            && self.state == other.state
            && self.attributes == other.attributes
    }
}
