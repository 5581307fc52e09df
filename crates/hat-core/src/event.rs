//! Event types carried on the mock event bus

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Context;

/// Trait for typed event payloads
///
/// Implemented by payload structs so they can be fired and matched by
/// their canonical event type string.
pub trait EventData: Clone + Send + Sync + 'static {
    /// The event type string for this payload type
    fn event_type() -> &'static str;
}

/// Event type identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventType(String);

impl EventType {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self(event_type.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wildcard type that matches every event
    pub fn match_all() -> Self {
        Self("*".to_string())
    }

    pub fn is_match_all(&self) -> bool {
        self.0 == "*"
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event published on the bus
///
/// Payloads are JSON values; typed payloads go through `Event::typed`
/// which serializes an [`EventData`] implementor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// The type of event
    pub event_type: EventType,

    /// The event payload
    pub data: serde_json::Value,

    /// When the event was fired
    pub time_fired: DateTime<Utc>,

    /// Context tracking origin and causality
    pub context: Context,
}

impl Event {
    /// Create a new event stamped with the current time
    pub fn new(event_type: impl Into<EventType>, data: serde_json::Value, context: Context) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            time_fired: Utc::now(),
            context,
        }
    }

    /// Create an event from a typed payload
    pub fn typed<T: EventData + Serialize>(data: &T, context: Context) -> Self {
        let data = serde_json::to_value(data).unwrap_or(serde_json::Value::Null);
        Self::new(T::event_type(), data, context)
    }

    /// Deserialize the payload back into a typed value
    pub fn parse_data<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.data.clone()).ok()
    }
}
