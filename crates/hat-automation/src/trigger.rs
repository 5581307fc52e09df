//! Trigger definitions, tagged by the `platform` field

use serde::{Deserialize, Serialize};

/// A trigger starts evaluation of an automation
///
/// The variant set mirrors the platforms the validator accepts; an unknown
/// platform is a validation error, never a decode panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires when an entity's state changes
    State {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        entity_id: EntityIdSpec,
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<StateMatch>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to: Option<StateMatch>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },

    /// Fires at a fixed time of day (`at` is `HH:MM` or `HH:MM:SS`)
    Time {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        at: String,
    },

    /// Fires on a cron-like pattern
    TimePattern {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        hours: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        minutes: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        seconds: Option<String>,
    },

    /// Fires when a numeric value crosses a threshold
    NumericState {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        entity_id: EntityIdSpec,
        #[serde(skip_serializing_if = "Option::is_none")]
        above: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        below: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },

    /// Fires at sunrise or sunset
    Sun {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        event: SunEvent,
        #[serde(skip_serializing_if = "Option::is_none")]
        offset: Option<String>,
    },

    /// Fires on a bus event with optional payload matching
    Event {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        event_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        event_data: Option<serde_json::Value>,
    },

    /// Fires when a template evaluates to true
    Template {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        value_template: String,
    },

    /// Fires on platform start or shutdown
    Homeassistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        event: String,
    },

    /// Fires on an MQTT message
    Mqtt {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        topic: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<String>,
    },

    /// Fires when an NFC tag is scanned
    Tag {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        tag_id: String,
    },

    /// Fires on a webhook request
    Webhook {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        webhook_id: String,
    },

    /// Fires when an entity enters or leaves a zone
    Zone {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        entity_id: EntityIdSpec,
        zone: String,
        event: ZoneEvent,
    },
}

impl Trigger {
    /// The platform discriminator for this trigger
    pub fn platform(&self) -> &'static str {
        match self {
            Trigger::State { .. } => "state",
            Trigger::Time { .. } => "time",
            Trigger::TimePattern { .. } => "time_pattern",
            Trigger::NumericState { .. } => "numeric_state",
            Trigger::Sun { .. } => "sun",
            Trigger::Event { .. } => "event",
            Trigger::Template { .. } => "template",
            Trigger::Homeassistant { .. } => "homeassistant",
            Trigger::Mqtt { .. } => "mqtt",
            Trigger::Tag { .. } => "tag",
            Trigger::Webhook { .. } => "webhook",
            Trigger::Zone { .. } => "zone",
        }
    }

    /// The trigger's ID if set
    pub fn id(&self) -> Option<&str> {
        match self {
            Trigger::State { id, .. }
            | Trigger::Time { id, .. }
            | Trigger::TimePattern { id, .. }
            | Trigger::NumericState { id, .. }
            | Trigger::Sun { id, .. }
            | Trigger::Event { id, .. }
            | Trigger::Template { id, .. }
            | Trigger::Homeassistant { id, .. }
            | Trigger::Mqtt { id, .. }
            | Trigger::Tag { id, .. }
            | Trigger::Webhook { id, .. }
            | Trigger::Zone { id, .. } => id.as_deref(),
        }
    }
}

/// Entity ID specification: a single ID or a list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityIdSpec {
    Single(String),
    List(Vec<String>),
}

impl EntityIdSpec {
    /// All entity IDs in declaration order
    pub fn ids(&self) -> Vec<&str> {
        match self {
            EntityIdSpec::Single(id) => vec![id.as_str()],
            EntityIdSpec::List(ids) => ids.iter().map(|s| s.as_str()).collect(),
        }
    }
}

/// State match specification: a single value or any of a list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateMatch {
    Single(String),
    List(Vec<String>),
}

impl StateMatch {
    /// Whether a state value matches
    pub fn matches(&self, state: &str) -> bool {
        match self {
            StateMatch::Single(s) => s == state,
            StateMatch::List(list) => list.iter().any(|s| s == state),
        }
    }
}

/// Sun event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunEvent {
    Sunrise,
    Sunset,
}

/// Zone event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneEvent {
    Enter,
    Leave,
}
