//! Automation definition: trigger/condition/action tuple plus metadata

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::condition::Condition;
use crate::one_or_many;
use crate::trigger::Trigger;

/// Execution mode for an automation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Ignore new triggers while running
    #[default]
    Single,
    /// Restart from the beginning on a new trigger
    Restart,
    /// Queue new triggers
    Queued,
    /// Run every trigger simultaneously
    Parallel,
}

/// A decoded automation definition
///
/// Field names accept both the singular form (`trigger`) and the plural
/// (`triggers`), and each list coerces a single bare mapping into a
/// one-element list, matching what definition files actually contain.
/// Definitions are immutable once decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Unique ID within a loaded set (lowercase alphanumeric + underscore)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Triggers that start the automation (must be non-empty to validate)
    #[serde(default, alias = "trigger", deserialize_with = "one_or_many")]
    pub triggers: Vec<Trigger>,

    /// Conditions gating the actions
    #[serde(default, alias = "condition", deserialize_with = "one_or_many")]
    pub conditions: Vec<Condition>,

    /// Actions to execute (must be non-empty to validate)
    #[serde(default, alias = "action", deserialize_with = "one_or_many")]
    pub actions: Vec<Action>,

    #[serde(default)]
    pub mode: Mode,
}

impl AutomationConfig {
    /// Decode from a raw JSON value (typically converted from YAML)
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Display name: alias, then id, then a placeholder
    pub fn display_name(&self) -> &str {
        self.alias
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("unnamed automation")
    }
}
