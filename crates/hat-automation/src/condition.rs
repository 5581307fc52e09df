//! Condition definitions, tagged by the `condition` field

use serde::{Deserialize, Serialize};

use crate::trigger::{EntityIdSpec, StateMatch, SunEvent};

/// A predicate gating whether actions execute once triggered
///
/// Conditions form finite trees: the logical variants own their children,
/// so cycles cannot be constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum Condition {
    /// Entity state equality, or numeric bounds on the state value
    State {
        entity_id: EntityIdSpec,
        #[serde(skip_serializing_if = "Option::is_none")]
        state: Option<StateMatch>,
        #[serde(skip_serializing_if = "Option::is_none")]
        above: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        below: Option<f64>,
    },

    /// Numeric threshold on an entity's state or attribute
    NumericState {
        entity_id: EntityIdSpec,
        #[serde(skip_serializing_if = "Option::is_none")]
        above: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        below: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },

    /// Current time window, optionally restricted to weekdays
    Time {
        #[serde(skip_serializing_if = "Option::is_none")]
        after: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        before: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        weekday: Vec<String>,
    },

    /// Sun position window
    Sun {
        #[serde(skip_serializing_if = "Option::is_none")]
        after: Option<SunEvent>,
        #[serde(skip_serializing_if = "Option::is_none")]
        before: Option<SunEvent>,
    },

    /// Zone membership
    Zone { entity_id: EntityIdSpec, zone: String },

    /// Template that must evaluate to true
    Template { value_template: String },

    /// Which trigger fired
    Trigger { id: String },

    /// Integration-specific device condition
    Device {
        device_id: String,
        domain: String,
        #[serde(flatten)]
        data: serde_json::Value,
    },

    /// All children must hold
    And { conditions: Vec<Condition> },

    /// Any child must hold
    Or { conditions: Vec<Condition> },

    /// No child may hold
    Not { conditions: Vec<Condition> },
}

impl Condition {
    /// The condition type discriminator
    pub fn kind(&self) -> &'static str {
        match self {
            Condition::State { .. } => "state",
            Condition::NumericState { .. } => "numeric_state",
            Condition::Time { .. } => "time",
            Condition::Sun { .. } => "sun",
            Condition::Zone { .. } => "zone",
            Condition::Template { .. } => "template",
            Condition::Trigger { .. } => "trigger",
            Condition::Device { .. } => "device",
            Condition::And { .. } => "and",
            Condition::Or { .. } => "or",
            Condition::Not { .. } => "not",
        }
    }

    /// Children of a logical composite; empty for leaf conditions
    pub fn children(&self) -> &[Condition] {
        match self {
            Condition::And { conditions }
            | Condition::Or { conditions }
            | Condition::Not { conditions } => conditions,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_condition_deserialize() {
        let json = r#"{
            "condition": "state",
            "entity_id": "sun.sun",
            "state": "below_horizon"
        }"#;

        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(condition.kind(), "state");
        assert!(condition.children().is_empty());
    }

    #[test]
    fn test_numeric_state_condition() {
        let json = r#"{
            "condition": "numeric_state",
            "entity_id": "sensor.temperature",
            "above": 19.5,
            "below": 25
        }"#;

        let condition: Condition = serde_json::from_str(json).unwrap();
        if let Condition::NumericState { above, below, .. } = condition {
            assert_eq!(above, Some(19.5));
            assert_eq!(below, Some(25.0));
        } else {
            panic!("Expected numeric_state condition");
        }
    }

    #[test]
    fn test_nested_logical_conditions() {
        let json = r#"{
            "condition": "and",
            "conditions": [
                {"condition": "state", "entity_id": "light.one", "state": "on"},
                {
                    "condition": "or",
                    "conditions": [
                        {"condition": "time", "after": "08:00"},
                        {"condition": "sun", "after": "sunrise"}
                    ]
                }
            ]
        }"#;

        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(condition.kind(), "and");
        assert_eq!(condition.children().len(), 2);
        assert_eq!(condition.children()[1].children().len(), 2);
    }

    #[test]
    fn test_unknown_condition_type_fails_decode() {
        let json = r#"{"condition": "astrology"}"#;
        assert!(serde_json::from_str::<Condition>(json).is_err());
    }
}
