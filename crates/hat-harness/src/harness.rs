//! The top-level harness: load, validate, replay, assert

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use hat_automation::AutomationConfig;
use hat_validation::Validator;

use crate::loader;
use crate::replay::{ReplayEngine, ReplayOptions, ReplayStep};
use crate::runtime::MockRuntime;
use crate::HarnessError;

struct LoadedAutomation {
    config: AutomationConfig,
}

impl LoadedAutomation {
    fn matches(&self, name: &str) -> bool {
        self.config.id.as_deref() == Some(name) || self.config.alias.as_deref() == Some(name)
    }
}

/// Owns a mock runtime and a set of validated automations
///
/// Loading validates first and refuses the whole batch when any definition
/// has defects, so a test never runs against a half-broken set. Triggering
/// replays an automation's actions synchronously; triggers and conditions
/// are data the test controls, not something the mock evaluates on a
/// clock.
pub struct AutomationHarness {
    runtime: MockRuntime,
    validator: Validator,
    options: ReplayOptions,
    automations: Vec<LoadedAutomation>,
}

impl AutomationHarness {
    pub fn new() -> Self {
        Self::with_options(ReplayOptions::default())
    }

    pub fn with_options(options: ReplayOptions) -> Self {
        Self {
            runtime: MockRuntime::new(),
            validator: Validator::default(),
            options,
            automations: Vec::new(),
        }
    }

    /// Swap in a validator with non-default service-data rules
    pub fn set_validator(&mut self, validator: Validator) {
        self.validator = validator;
    }

    pub fn runtime(&self) -> &MockRuntime {
        &self.runtime
    }

    /// Number of loaded automations
    pub fn automation_count(&self) -> usize {
        self.automations.len()
    }

    /// Load definitions from YAML or JSON text
    ///
    /// Returns how many automations were added. Validation runs over the
    /// whole batch first, including id uniqueness against nothing but the
    /// batch itself; any defect rejects the entire load.
    pub fn load_str(&mut self, text: &str) -> Result<usize, HarnessError> {
        let definitions = loader::definitions_from_str(text)?;
        self.load_definitions(&definitions)
    }

    /// Load definitions from a file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, HarnessError> {
        let definitions = loader::definitions_from_file(path)?;
        self.load_definitions(&definitions)
    }

    fn load_definitions(&mut self, definitions: &[Value]) -> Result<usize, HarnessError> {
        let result = self.validator.validate_batch(definitions)?;
        if !result.is_valid() {
            return Err(hat_validation::ValidationError::Invalid {
                errors: result.errors,
            }
            .into());
        }

        for definition in definitions {
            let config = AutomationConfig::from_value(definition)?;
            debug!(automation = %config.display_name(), "Loaded automation");
            self.automations.push(LoadedAutomation { config });
        }
        info!(count = definitions.len(), "Loaded automation batch");
        Ok(definitions.len())
    }

    /// The decoded definition for an id or alias
    pub fn automation(&self, name: &str) -> Option<&AutomationConfig> {
        self.automations
            .iter()
            .find(|a| a.matches(name))
            .map(|a| &a.config)
    }

    /// Replay one automation's actions by id or alias
    pub fn trigger(&self, name: &str) -> Result<Vec<ReplayStep>, HarnessError> {
        let automation = self
            .automations
            .iter()
            .find(|a| a.matches(name))
            .ok_or_else(|| HarnessError::UnknownAutomation(name.to_string()))?;
        ReplayEngine::with_options(&self.runtime, self.options).run(&automation.config)
    }

    /// Replay every loaded automation, in load order
    pub fn trigger_all(&self) -> Result<Vec<ReplayStep>, HarnessError> {
        let engine = ReplayEngine::with_options(&self.runtime, self.options);
        let mut steps = Vec::new();
        for automation in &self.automations {
            steps.extend(engine.run(&automation.config)?);
        }
        Ok(steps)
    }

    // --- Assertions over the runtime's call log ---

    /// Assert the nth issued call (0-based) and a subset of its payload
    pub fn assert_service_called(&self, index: usize, service_id: &str, expected_data: &Value) {
        let Some(record) = self.runtime.services().nth_call(index) else {
            panic!(
                "expected call {index} to '{service_id}', but only {} calls were issued",
                self.runtime.services().call_count()
            );
        };
        assert_eq!(
            record.service_id(),
            service_id,
            "call {index} was '{}', expected '{service_id}'",
            record.service_id()
        );
        if let Some(expected) = expected_data.as_object() {
            for (key, value) in expected {
                assert_eq!(
                    record.data.get(key),
                    Some(value),
                    "call {index} to '{service_id}': key '{key}' expected {value}, payload was {}",
                    record.data
                );
            }
        }
    }

    /// Assert the exact order of every issued call by `domain.service` id
    pub fn assert_called_in_order(&self, expected: &[&str]) {
        let observed: Vec<String> = self
            .runtime
            .services()
            .all_calls()
            .iter()
            .map(|r| r.service_id())
            .collect();
        assert_eq!(
            observed, expected,
            "service calls out of order: observed {observed:?}, expected {expected:?}"
        );
    }
}

impl Default for AutomationHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EVENING: &str = r#"
- id: evening_lights
  alias: Evening lights
  trigger:
    platform: time
    at: "18:30"
  action:
    - service: light.turn_on
      target:
        entity_id: light.living_room
      data:
        brightness: 200
"#;

    #[test]
    fn test_load_and_lookup() {
        let mut harness = AutomationHarness::new();
        assert_eq!(harness.load_str(EVENING).unwrap(), 1);
        assert_eq!(harness.automation_count(), 1);
        assert!(harness.automation("evening_lights").is_some());
        assert!(harness.automation("Evening lights").is_some());
        assert!(harness.automation("missing").is_none());
    }

    #[test]
    fn test_invalid_batch_is_rejected_whole() {
        let mut harness = AutomationHarness::new();
        let err = harness
            .load_str("- id: ok\n  trigger: {platform: time, at: \"07:00\"}\n  action: {service: light.turn_on}\n- id: bad\n  trigger: {platform: time, at: \"24:00\"}\n  action: {service: light.turn_on}\n")
            .unwrap_err();

        assert!(err
            .to_string()
            .contains("Automation 1: Time trigger 0 has invalid time format: 24:00"));
        // Even the valid sibling is refused
        assert_eq!(harness.automation_count(), 0);
    }

    #[test]
    fn test_trigger_unknown_name() {
        let harness = AutomationHarness::new();
        assert!(matches!(
            harness.trigger("ghost"),
            Err(HarnessError::UnknownAutomation(_))
        ));
    }

    #[test]
    fn test_trigger_issues_calls() {
        let mut harness = AutomationHarness::new();
        harness.load_str(EVENING).unwrap();
        harness.trigger("evening_lights").unwrap();

        assert!(harness.runtime().services().has_calls("light", "turn_on"));
        harness.assert_service_called(
            0,
            "light.turn_on",
            &json!({"entity_id": "light.living_room", "brightness": 200}),
        );
    }
}
