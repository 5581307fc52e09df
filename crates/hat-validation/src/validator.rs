//! The validation engine: structural, identifier, trigger, condition, and
//! action passes, run in a fixed order with full error accumulation

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::primitives::{
    as_number, coerce_sequence, is_valid_slug, is_valid_time, split_service, type_name,
};
use crate::rules::ServiceDataRules;
use crate::{ValidationError, ValidationResult};

/// Trigger platforms accepted by the platform's automation schema
pub const VALID_TRIGGER_PLATFORMS: &[&str] = &[
    "event",
    "homeassistant",
    "mqtt",
    "numeric_state",
    "state",
    "sun",
    "tag",
    "template",
    "time",
    "time_pattern",
    "webhook",
    "zone",
];

/// Condition types accepted by the platform's automation schema
pub const VALID_CONDITION_TYPES: &[&str] = &[
    "and",
    "device",
    "not",
    "numeric_state",
    "or",
    "state",
    "sun",
    "template",
    "time",
    "trigger",
    "zone",
];

/// Accepted execution modes
pub const VALID_MODES: &[&str] = &["single", "restart", "queued", "parallel"];

/// Action-discriminating keys, checked in this order
const ACTION_KEYS: &[&str] = &[
    "service",
    "delay",
    "wait_template",
    "wait_for_trigger",
    "repeat",
    "choose",
    "parallel",
    "if",
    "stop",
    "variables",
    "event",
    "sequence",
];

/// Stateless definition checker
///
/// Holds only the configurable service-data rules; every `validate` call is
/// a pure function of its input.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: ServiceDataRules,
}

impl Validator {
    /// Build a validator with custom service-data rules
    pub fn with_rules(rules: ServiceDataRules) -> Self {
        Self { rules }
    }

    /// The active service-data rules
    pub fn rules(&self) -> &ServiceDataRules {
        &self.rules
    }

    /// Validate a single definition
    ///
    /// Returns `Err` only when the root is not a mapping at all; every
    /// other defect is accumulated into the result, in definition order.
    pub fn validate(&self, config: &Value) -> Result<ValidationResult, ValidationError> {
        let map = config.as_object().ok_or(ValidationError::NotAMapping {
            found: type_name(config),
        })?;

        let mut errors = Vec::new();
        self.check_metadata(map, &mut errors);
        self.check_triggers(map, &mut errors);
        self.check_conditions(map, &mut errors);
        self.check_actions(map, &mut errors);

        debug!(
            defects = errors.len(),
            "Validated automation definition"
        );
        Ok(ValidationResult { errors })
    }

    /// Validate sibling definitions loaded together
    ///
    /// Each definition's own defects are prefixed with its position; `id`
    /// uniqueness across the batch is checked separately afterwards.
    pub fn validate_batch(&self, configs: &[Value]) -> Result<ValidationResult, ValidationError> {
        let mut errors = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for (i, config) in configs.iter().enumerate() {
            let result = self.validate(config)?;
            errors.extend(
                result
                    .errors
                    .into_iter()
                    .map(|e| format!("Automation {i}: {e}")),
            );

            if let Some(id) = config.get("id").and_then(Value::as_str) {
                if let Some(&first) = seen.get(id) {
                    errors.push(format!(
                        "Duplicate automation id '{id}' (automations {first} and {i})"
                    ));
                } else {
                    seen.insert(id, i);
                }
            }
        }

        Ok(ValidationResult { errors })
    }

    /// Fail-fast wrapper: Err carries the same error list `validate` returns
    pub fn assert_valid(&self, config: &Value) -> Result<(), ValidationError> {
        let result = self.validate(config)?;
        if result.is_valid() {
            Ok(())
        } else {
            Err(ValidationError::Invalid {
                errors: result.errors,
            })
        }
    }

    /// One-line description of a definition for diagnostics
    pub fn summarize(config: &Value) -> String {
        let Some(map) = config.as_object() else {
            return format!("not an automation mapping ({})", type_name(config));
        };

        let mut parts = Vec::new();
        if let Some(id) = map.get("id").and_then(Value::as_str) {
            parts.push(format!("ID: {id}"));
        }
        if let Some(alias) = map.get("alias").and_then(Value::as_str) {
            parts.push(format!("Alias: {alias}"));
        }
        if let Some(mode) = map.get("mode").and_then(Value::as_str) {
            parts.push(format!("Mode: {mode}"));
        }

        if let Some(triggers) = lookup(map, "trigger").and_then(coerce_sequence) {
            let kinds = distinct_tags(&triggers, "platform");
            parts.push(format!("Triggers: {} ({})", triggers.len(), kinds.join(", ")));
        }
        if let Some(conditions) = lookup(map, "condition").and_then(coerce_sequence) {
            let kinds = distinct_tags(&conditions, "condition");
            parts.push(format!(
                "Conditions: {} ({})",
                conditions.len(),
                kinds.join(", ")
            ));
        }
        if let Some(actions) = lookup(map, "action").and_then(coerce_sequence) {
            let services: Vec<&str> = actions
                .iter()
                .filter_map(|a| a.get("service").and_then(Value::as_str))
                .collect();
            if services.is_empty() {
                parts.push(format!("Actions: {}", actions.len()));
            } else {
                parts.push(format!(
                    "Actions: {} (services: {})",
                    actions.len(),
                    services.join(", ")
                ));
            }
        }

        parts.join(" | ")
    }

    // --- Identifier and metadata pass ---

    fn check_metadata(&self, map: &Map<String, Value>, errors: &mut Vec<String>) {
        if let Some(id) = map.get("id") {
            match id.as_str() {
                None => errors.push(format!("ID must be a string, got {}", type_name(id))),
                Some("") => errors.push("ID cannot be empty".to_string()),
                Some(id) if !is_valid_slug(id) => errors.push(format!(
                    "ID '{id}' must contain only lowercase letters, digits, and underscores"
                )),
                Some(_) => {}
            }
        }

        if let Some(alias) = map.get("alias") {
            if !alias.is_string() {
                errors.push(format!("Alias must be a string, got {}", type_name(alias)));
            }
        }

        if let Some(mode) = map.get("mode") {
            let known = mode
                .as_str()
                .map(|m| VALID_MODES.contains(&m))
                .unwrap_or(false);
            if !known {
                errors.push(format!(
                    "Invalid mode '{}'. Must be one of: {}",
                    literal(mode),
                    VALID_MODES.join(", ")
                ));
            }
        }
    }

    // --- Trigger pass ---

    fn check_triggers(&self, map: &Map<String, Value>, errors: &mut Vec<String>) {
        let Some(value) = lookup(map, "trigger") else {
            errors.push("Automation must have 'trigger' field".to_string());
            return;
        };
        let Some(triggers) = coerce_sequence(value) else {
            errors.push(format!("Triggers must be a list, got {}", type_name(value)));
            return;
        };
        if triggers.is_empty() {
            errors.push("Automation must have at least one trigger".to_string());
            return;
        }

        for (i, trigger) in triggers.iter().enumerate() {
            let Some(obj) = trigger.as_object() else {
                errors.push(format!(
                    "Trigger {i} must be a mapping, got {}",
                    type_name(trigger)
                ));
                continue;
            };

            let Some(platform) = obj.get("platform") else {
                errors.push(format!("Trigger {i} missing required 'platform' field"));
                continue;
            };
            let known = platform
                .as_str()
                .filter(|p| VALID_TRIGGER_PLATFORMS.contains(p))
                .map(str::to_string);
            let Some(platform) = known else {
                errors.push(format!(
                    "Trigger {i} has invalid platform '{}'",
                    literal(platform)
                ));
                continue;
            };

            match platform.as_str() {
                "time" => match obj.get("at") {
                    None => errors.push(format!("Time trigger {i} missing required 'at' field")),
                    Some(at) if !is_valid_time(at) => errors.push(format!(
                        "Time trigger {i} has invalid time format: {}",
                        literal(at)
                    )),
                    Some(_) => {}
                },
                "state" => {
                    if !obj.contains_key("entity_id") {
                        errors.push(format!(
                            "State trigger {i} missing required 'entity_id' field"
                        ));
                    }
                }
                "numeric_state" => {
                    if !obj.contains_key("entity_id") {
                        errors.push(format!(
                            "Numeric state trigger {i} missing required 'entity_id' field"
                        ));
                    }
                    if !obj.contains_key("above") && !obj.contains_key("below") {
                        errors.push(format!(
                            "Numeric state trigger {i} must have 'above' or 'below'"
                        ));
                    }
                    self.check_bounds(obj, errors, &format!("Numeric state trigger {i}"));
                }
                "sun" => match obj.get("event").and_then(Value::as_str) {
                    None => errors.push(format!("Sun trigger {i} missing required 'event' field")),
                    Some(event) if event != "sunrise" && event != "sunset" => errors.push(
                        format!("Sun trigger {i} event must be 'sunrise' or 'sunset'"),
                    ),
                    Some(_) => {}
                },
                _ => {}
            }
        }
    }

    // --- Condition pass ---

    fn check_conditions(&self, map: &Map<String, Value>, errors: &mut Vec<String>) {
        // Conditions are optional
        let Some(value) = lookup(map, "condition") else {
            return;
        };
        let Some(conditions) = coerce_sequence(value) else {
            errors.push(format!(
                "Conditions must be a list, got {}",
                type_name(value)
            ));
            return;
        };

        for (i, condition) in conditions.iter().enumerate() {
            self.check_condition(i, condition, errors);
        }
    }

    fn check_condition(&self, i: usize, condition: &Value, errors: &mut Vec<String>) {
        let Some(obj) = condition.as_object() else {
            errors.push(format!(
                "Condition {i} must be a mapping, got {}",
                type_name(condition)
            ));
            return;
        };

        let Some(cond_type) = obj.get("condition") else {
            errors.push(format!("Condition {i} missing required 'condition' field"));
            return;
        };
        let known = cond_type
            .as_str()
            .filter(|t| VALID_CONDITION_TYPES.contains(t))
            .map(str::to_string);
        let Some(cond_type) = known else {
            errors.push(format!(
                "Condition {i} has invalid type '{}'",
                literal(cond_type)
            ));
            return;
        };

        match cond_type.as_str() {
            "state" => {
                if !obj.contains_key("entity_id") {
                    errors.push(format!(
                        "State condition {i} missing required 'entity_id' field"
                    ));
                }
                if !obj.contains_key("state")
                    && !obj.contains_key("above")
                    && !obj.contains_key("below")
                {
                    errors.push(format!(
                        "State condition {i} must have 'state', 'above', or 'below'"
                    ));
                }
                self.check_bounds(obj, errors, &format!("State condition {i}"));
            }
            "numeric_state" => {
                if !obj.contains_key("entity_id") {
                    errors.push(format!(
                        "Numeric state condition {i} missing required 'entity_id' field"
                    ));
                }
                if !obj.contains_key("above") && !obj.contains_key("below") {
                    errors.push(format!(
                        "Numeric state condition {i} must have 'above' or 'below'"
                    ));
                }
                self.check_bounds(obj, errors, &format!("Numeric state condition {i}"));
            }
            "time" => {
                let after = obj.get("after");
                let before = obj.get("before");
                if after.is_none() && before.is_none() {
                    errors.push(format!("Time condition {i} must have 'after' or 'before'"));
                }
                if let Some(after) = after {
                    if !is_valid_time(after) {
                        errors.push(format!(
                            "Time condition {i} has invalid 'after' time format"
                        ));
                    }
                }
                if let Some(before) = before {
                    if !is_valid_time(before) {
                        errors.push(format!(
                            "Time condition {i} has invalid 'before' time format"
                        ));
                    }
                }
            }
            "and" | "or" | "not" => {
                let children = obj
                    .get("conditions")
                    .and_then(coerce_sequence)
                    .unwrap_or_default();
                if children.is_empty() {
                    errors.push(format!(
                        "Logical condition {i} ('{cond_type}') must have at least one condition"
                    ));
                } else {
                    let mut child_errors = Vec::new();
                    for (j, child) in children.iter().enumerate() {
                        self.check_condition(j, child, &mut child_errors);
                    }
                    errors.extend(
                        child_errors
                            .into_iter()
                            .map(|e| format!("Condition {i} '{cond_type}': {e}")),
                    );
                }
            }
            _ => {}
        }
    }

    /// `above`/`below` must parse as numbers when present
    fn check_bounds(&self, obj: &Map<String, Value>, errors: &mut Vec<String>, prefix: &str) {
        for key in ["above", "below"] {
            if let Some(value) = obj.get(key) {
                if as_number(value).is_none() {
                    errors.push(format!(
                        "{prefix} '{key}' must be a number, got {}",
                        literal(value)
                    ));
                }
            }
        }
    }

    // --- Action pass ---

    fn check_actions(&self, map: &Map<String, Value>, errors: &mut Vec<String>) {
        let Some(value) = lookup(map, "action") else {
            errors.push("Automation must have 'action' field".to_string());
            return;
        };
        let Some(actions) = coerce_sequence(value) else {
            errors.push(format!("Actions must be a list, got {}", type_name(value)));
            return;
        };
        if actions.is_empty() {
            errors.push("Automation must have at least one action".to_string());
            return;
        }

        for (i, action) in actions.iter().enumerate() {
            self.check_action(i, action, errors);
        }
    }

    fn check_action(&self, i: usize, action: &Value, errors: &mut Vec<String>) {
        let Some(obj) = action.as_object() else {
            errors.push(format!(
                "Action {i} must be a mapping, got {}",
                type_name(action)
            ));
            return;
        };

        let Some(kind) = ACTION_KEYS.iter().find(|k| obj.contains_key(**k)) else {
            errors.push(format!("Action {i} has no recognized action type"));
            return;
        };

        match *kind {
            "service" => self.check_service_action(i, obj, errors),
            "delay" => check_delay_action(i, obj, errors),
            "parallel" | "sequence" => {
                // serde_json::Map indexing is infallible here; the key matched above
                let nested = &obj[*kind];
                match nested.as_array() {
                    None => errors.push(format!(
                        "Action {i} {kind} must be a list, got {}",
                        type_name(nested)
                    )),
                    Some(children) => {
                        let mut child_errors = Vec::new();
                        for (j, child) in children.iter().enumerate() {
                            self.check_action(j, child, &mut child_errors);
                        }
                        errors.extend(
                            child_errors
                                .into_iter()
                                .map(|e| format!("Action {i} {kind}: {e}")),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    fn check_service_action(
        &self,
        i: usize,
        obj: &Map<String, Value>,
        errors: &mut Vec<String>,
    ) {
        let service = &obj["service"];
        match service.as_str() {
            None => errors.push(format!("Action {i} service must be a string")),
            Some(s) => match split_service(s) {
                Some((domain, name)) => {
                    // Advisory payload bounds, layered on top of the
                    // required-field checks; failures here do not suppress
                    // the checks below
                    if let Some(data) = obj.get("data").and_then(Value::as_object) {
                        errors.extend(
                            self.rules
                                .validate_service_data(domain, name, data)
                                .into_iter()
                                .map(|e| format!("Action {i}: {e}")),
                        );
                    }
                }
                None if !s.contains('.') => errors.push(format!(
                    "Action {i} service '{s}' must be in format 'domain.service'"
                )),
                None => errors.push(format!("Action {i} has invalid service format: '{s}'")),
            },
        }

        if let Some(target) = obj.get("target") {
            match target.as_object() {
                None => errors.push(format!(
                    "Action {i} target must be a mapping, got {}",
                    type_name(target)
                )),
                Some(t) => {
                    if !t.contains_key("entity_id")
                        && !t.contains_key("device_id")
                        && !t.contains_key("area_id")
                    {
                        errors.push(format!(
                            "Action {i} target must have entity_id, device_id, or area_id"
                        ));
                    }
                }
            }
        }
    }
}

fn check_delay_action(i: usize, obj: &Map<String, Value>, errors: &mut Vec<String>) {
    const UNIT_KEYS: &[&str] = &["hours", "minutes", "seconds", "milliseconds"];
    let delay = &obj["delay"];
    match delay {
        Value::Object(units) => {
            if !UNIT_KEYS.iter().any(|k| units.contains_key(*k)) {
                errors.push(format!("Action {i} delay must have explicit time units"));
            }
        }
        Value::String(s) => {
            if !is_valid_duration_text(s) {
                errors.push(format!(
                    "Action {i} delay has invalid duration format: '{s}'"
                ));
            }
        }
        // Bare numbers carry no units and are rejected
        other => errors.push(format!(
            "Action {i} delay must be a mapping or string, got {}",
            type_name(other)
        )),
    }
}

/// `MM:SS` or `HH:MM:SS` with purely numeric components, the shapes the
/// replay engine resolves to a duration
fn is_valid_duration_text(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    matches!(parts.len(), 2 | 3) && parts.iter().all(|p| !p.is_empty() && p.parse::<u64>().is_ok())
}

/// Look up a key accepting both singular and plural spellings
fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| map.get(&format!("{key}s")))
}

/// Render a value for an error message: strings bare, everything else JSON
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Distinct tag values in first-seen order, for summaries
fn distinct_tags<'a>(items: &[&'a Value], key: &str) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for item in items {
        let tag = item.get(key).and_then(Value::as_str).unwrap_or("unknown");
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors_of(config: &Value) -> Vec<String> {
        Validator::default().validate(config).unwrap().errors
    }

    fn valid_config() -> Value {
        json!({
            "id": "evening_lights",
            "alias": "Evening lights",
            "mode": "single",
            "trigger": [{"platform": "time", "at": "18:30"}],
            "condition": [{"condition": "state", "entity_id": "person.anna", "state": "home"}],
            "action": [{
                "service": "light.turn_on",
                "target": {"entity_id": "light.living_room"},
                "data": {"brightness": 200}
            }]
        })
    }

    #[test]
    fn test_valid_definition_has_no_errors() {
        let result = Validator::default().validate(&valid_config()).unwrap();
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn test_non_mapping_root_is_fatal() {
        let err = Validator::default()
            .validate(&json!(["not", "a", "mapping"]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotAMapping { found: "a list" }));
    }

    #[test]
    fn test_all_defects_are_accumulated() {
        // Three independent defects: bad mode, unknown platform, missing action
        let config = json!({
            "id": "broken",
            "mode": "sideways",
            "trigger": [{"platform": "telepathy"}]
        });
        let errors = errors_of(&config);
        assert_eq!(errors.len(), 3, "got: {errors:?}");
        assert_eq!(
            errors[0],
            "Invalid mode 'sideways'. Must be one of: single, restart, queued, parallel"
        );
        assert_eq!(errors[1], "Trigger 0 has invalid platform 'telepathy'");
        assert_eq!(errors[2], "Automation must have 'action' field");
    }

    #[test]
    fn test_output_is_deterministic() {
        let config = json!({
            "mode": "bogus",
            "trigger": [{"platform": "time"}, {"platform": "state"}],
            "action": []
        });
        let first = errors_of(&config);
        let second = errors_of(&config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_id_checks() {
        assert!(errors_of(&json!({"id": 42, "trigger": [{"platform": "time", "at": "06:00"}], "action": [{"service": "a.b"}]}))
            .contains(&"ID must be a string, got a number".to_string()));
        assert!(errors_of(&json!({"id": "", "trigger": [{"platform": "time", "at": "06:00"}], "action": [{"service": "a.b"}]}))
            .contains(&"ID cannot be empty".to_string()));
        assert!(errors_of(&json!({"id": "Has Spaces", "trigger": [{"platform": "time", "at": "06:00"}], "action": [{"service": "a.b"}]}))
            .contains(
                &"ID 'Has Spaces' must contain only lowercase letters, digits, and underscores"
                    .to_string()
            ));
    }

    #[test]
    fn test_single_mapping_coerces_to_list() {
        let config = json!({
            "trigger": {"platform": "time", "at": "07:15"},
            "action": {"service": "light.turn_on"}
        });
        assert!(errors_of(&config).is_empty());
    }

    #[test]
    fn test_time_trigger_boundaries() {
        let at = |s: &str| {
            json!({
                "trigger": [{"platform": "time", "at": s}],
                "action": [{"service": "light.turn_on"}]
            })
        };
        assert!(errors_of(&at("23:59:59")).is_empty());
        assert!(errors_of(&at("18:30")).is_empty());
        assert_eq!(
            errors_of(&at("24:00")),
            vec!["Time trigger 0 has invalid time format: 24:00"]
        );
        assert_eq!(
            errors_of(&at("25:00")),
            vec!["Time trigger 0 has invalid time format: 25:00"]
        );
        assert_eq!(
            errors_of(&json!({
                "trigger": [{"platform": "time"}],
                "action": [{"service": "light.turn_on"}]
            })),
            vec!["Time trigger 0 missing required 'at' field"]
        );
    }

    #[test]
    fn test_trigger_requirements_per_platform() {
        let config = json!({
            "trigger": [
                {"platform": "state"},
                {"platform": "numeric_state", "entity_id": "sensor.temp"},
                {"platform": "sun", "event": "noon"}
            ],
            "action": [{"service": "light.turn_on"}]
        });
        let errors = errors_of(&config);
        assert_eq!(
            errors,
            vec![
                "State trigger 0 missing required 'entity_id' field",
                "Numeric state trigger 1 must have 'above' or 'below'",
                "Sun trigger 2 event must be 'sunrise' or 'sunset'",
            ]
        );
    }

    #[test]
    fn test_numeric_bound_must_parse() {
        let config = json!({
            "trigger": [{"platform": "numeric_state", "entity_id": "sensor.temp", "above": "warm"}],
            "action": [{"service": "light.turn_on"}]
        });
        assert_eq!(
            errors_of(&config),
            vec!["Numeric state trigger 0 'above' must be a number, got warm"]
        );

        // Numeric strings are accepted
        let config = json!({
            "trigger": [{"platform": "numeric_state", "entity_id": "sensor.temp", "above": "21.5"}],
            "action": [{"service": "light.turn_on"}]
        });
        assert!(errors_of(&config).is_empty());
    }

    #[test]
    fn test_state_condition_missing_fields_reference_index() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "condition": [{"condition": "state"}],
            "action": [{"service": "light.turn_on"}]
        });
        let errors = errors_of(&config);
        assert_eq!(
            errors,
            vec![
                "State condition 0 missing required 'entity_id' field",
                "State condition 0 must have 'state', 'above', or 'below'",
            ]
        );
    }

    #[test]
    fn test_unknown_condition_type() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "condition": [{"condition": "astrology"}],
            "action": [{"service": "light.turn_on"}]
        });
        assert_eq!(
            errors_of(&config),
            vec!["Condition 0 has invalid type 'astrology'"]
        );
    }

    #[test]
    fn test_nested_logical_conditions() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "condition": [{
                "condition": "or",
                "conditions": [
                    {"condition": "state", "entity_id": "person.anna", "state": "home"},
                    {"condition": "time"}
                ]
            }],
            "action": [{"service": "light.turn_on"}]
        });
        assert_eq!(
            errors_of(&config),
            vec!["Condition 0 'or': Time condition 1 must have 'after' or 'before'"]
        );
    }

    #[test]
    fn test_empty_logical_condition_rejected() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "condition": [{"condition": "not", "conditions": []}],
            "action": [{"service": "light.turn_on"}]
        });
        assert_eq!(
            errors_of(&config),
            vec!["Logical condition 0 ('not') must have at least one condition"]
        );
    }

    #[test]
    fn test_time_condition_format_checks() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "condition": [{"condition": "time", "after": "9am", "before": "23:00"}],
            "action": [{"service": "light.turn_on"}]
        });
        assert_eq!(
            errors_of(&config),
            vec!["Time condition 0 has invalid 'after' time format"]
        );
    }

    #[test]
    fn test_service_syntax() {
        let svc = |s: &str| {
            json!({
                "trigger": [{"platform": "time", "at": "18:30"}],
                "action": [{"service": s}]
            })
        };
        assert!(errors_of(&svc("light.turn_on")).is_empty());
        assert_eq!(
            errors_of(&svc("turn_on")),
            vec!["Action 0 service 'turn_on' must be in format 'domain.service'"]
        );
        assert_eq!(
            errors_of(&svc("light.turn_on.extra")),
            vec!["Action 0 has invalid service format: 'light.turn_on.extra'"]
        );
        assert_eq!(
            errors_of(&svc("light.")),
            vec!["Action 0 has invalid service format: 'light.'"]
        );
    }

    #[test]
    fn test_unrecognized_action() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "action": [{"frobnicate": true}]
        });
        assert_eq!(
            errors_of(&config),
            vec!["Action 0 has no recognized action type"]
        );
    }

    #[test]
    fn test_target_checks() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "action": [
                {"service": "light.turn_on", "target": "light.living_room"},
                {"service": "light.turn_on", "target": {"floor": 2}}
            ]
        });
        assert_eq!(
            errors_of(&config),
            vec![
                "Action 0 target must be a mapping, got a string",
                "Action 1 target must have entity_id, device_id, or area_id",
            ]
        );
    }

    #[test]
    fn test_service_data_rules_do_not_suppress_other_errors() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "action": [
                {"service": "light.turn_on", "data": {"brightness": 300}},
                {"service": "turn_off"}
            ]
        });
        assert_eq!(
            errors_of(&config),
            vec![
                "Action 0: brightness must be 0-255, got 300",
                "Action 1 service 'turn_off' must be in format 'domain.service'",
            ]
        );
    }

    #[test]
    fn test_delay_action_checks() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "action": [
                {"delay": {"minutes": 5}},
                {"delay": "00:00:30"},
                {"delay": {"furlongs": 3}},
                {"delay": 30},
                {"delay": "banana"}
            ]
        });
        assert_eq!(
            errors_of(&config),
            vec![
                "Action 2 delay must have explicit time units",
                "Action 3 delay must be a mapping or string, got a number",
                "Action 4 delay has invalid duration format: 'banana'",
            ]
        );
    }

    #[test]
    fn test_nested_action_blocks() {
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "action": [{
                "parallel": [
                    {"service": "light.turn_on"},
                    {"service": "nodot"}
                ]
            }]
        });
        assert_eq!(
            errors_of(&config),
            vec!["Action 0 parallel: Action 1 service 'nodot' must be in format 'domain.service'"]
        );
    }

    #[test]
    fn test_batch_prefixes_and_duplicate_ids() {
        let configs = vec![
            valid_config(),
            json!({"id": "evening_lights", "trigger": [{"platform": "time"}], "action": [{"service": "a.b"}]}),
        ];
        let result = Validator::default().validate_batch(&configs).unwrap();
        assert_eq!(
            result.errors,
            vec![
                "Automation 1: Time trigger 0 missing required 'at' field",
                "Duplicate automation id 'evening_lights' (automations 0 and 1)",
            ]
        );
    }

    #[test]
    fn test_assert_valid_carries_error_list() {
        let config = json!({"trigger": [{"platform": "time", "at": "24:00"}], "action": []});
        let err = Validator::default().assert_valid(&config).unwrap_err();
        match err {
            ValidationError::Invalid { errors } => {
                assert_eq!(errors.len(), 2);
                let rendered = format!("{}", ValidationError::Invalid { errors });
                assert!(rendered.contains("  - Time trigger 0 has invalid time format: 24:00"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_rules_are_applied() {
        use crate::rules::NumericRange;

        let rules = ServiceDataRules {
            brightness: NumericRange::new(0.0, 100.0),
            ..ServiceDataRules::default()
        };
        let config = json!({
            "trigger": [{"platform": "time", "at": "18:30"}],
            "action": [{"service": "light.turn_on", "data": {"brightness": 200}}]
        });
        let result = Validator::with_rules(rules).validate(&config).unwrap();
        assert_eq!(result.errors, vec!["Action 0: brightness must be 0-100, got 200"]);
    }

    #[test]
    fn test_summarize() {
        let summary = Validator::summarize(&valid_config());
        assert_eq!(
            summary,
            "ID: evening_lights | Alias: Evening lights | Mode: single | \
             Triggers: 1 (time) | Conditions: 1 (state) | \
             Actions: 1 (services: light.turn_on)"
        );
    }
}
