//! Action definitions, discriminated by shape

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::string_or_vec;

/// Target specification for service calls
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Target {
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "string_or_vec"
    )]
    pub entity_id: Vec<String>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "string_or_vec"
    )]
    pub device_id: Vec<String>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "string_or_vec"
    )]
    pub area_id: Vec<String>,
}

impl Target {
    pub fn is_empty(&self) -> bool {
        self.entity_id.is_empty() && self.device_id.is_empty() && self.area_id.is_empty()
    }
}

/// An effect to perform when an automation runs
///
/// Actions carry no explicit tag; the discriminating key is the field name
/// (`service`, `delay`, `sequence`, …). Kinds the replay engine does not
/// execute (choose, repeat, wait_template, …) decode into `Other` so a
/// definition as a whole always decodes; replaying an `Other` action is a
/// harness error, not a skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    /// Call a `domain.service` with a data payload
    Service {
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        service: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<Target>,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        data: HashMap<String, serde_json::Value>,
    },

    /// Logical pause; the mock runtime records it without sleeping
    Delay {
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        delay: DelaySpec,
    },

    /// Fire an event on the bus
    Event {
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        event: String,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        event_data: HashMap<String, serde_json::Value>,
    },

    /// Nested list executed in order
    Sequence {
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        sequence: Vec<Action>,
    },

    /// Nested list; the mock replays it in declaration order
    Parallel {
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        parallel: Vec<Action>,
    },

    /// Any other recognized-but-not-replayable action shape
    Other(serde_json::Value),
}

impl Action {
    /// A short name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Service { .. } => "service",
            Action::Delay { .. } => "delay",
            Action::Event { .. } => "event",
            Action::Sequence { .. } => "sequence",
            Action::Parallel { .. } => "parallel",
            Action::Other(_) => "other",
        }
    }
}

/// Delay duration: `HH:MM:SS` text or explicit unit components
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DelaySpec {
    Text(String),
    Components {
        #[serde(default)]
        hours: u64,
        #[serde(default)]
        minutes: u64,
        #[serde(default)]
        seconds: u64,
        #[serde(default)]
        milliseconds: u64,
    },
}

impl DelaySpec {
    /// Resolve to a concrete Duration
    ///
    /// Text form must be `HH:MM:SS` or `MM:SS`; returns None for anything
    /// that does not parse or whose total would overflow.
    pub fn to_duration(&self) -> Option<Duration> {
        match self {
            DelaySpec::Components {
                hours,
                minutes,
                seconds,
                milliseconds,
            } => {
                let millis = hours
                    .checked_mul(60)?
                    .checked_add(*minutes)?
                    .checked_mul(60)?
                    .checked_add(*seconds)?
                    .checked_mul(1000)?
                    .checked_add(*milliseconds)?;
                Some(Duration::from_millis(millis))
            }
            DelaySpec::Text(s) => {
                let parts: Vec<u64> = s.split(':').map(|p| p.parse().ok()).collect::<Option<_>>()?;
                let secs = match parts.as_slice() {
                    [m, s] => m.checked_mul(60)?.checked_add(*s)?,
                    [h, m, s] => h
                        .checked_mul(60)?
                        .checked_add(*m)?
                        .checked_mul(60)?
                        .checked_add(*s)?,
                    _ => return None,
                };
                Some(Duration::from_secs(secs))
            }
        }
    }
}
