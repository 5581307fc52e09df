//! Synchronous action replay against the mock runtime
//!
//! The engine walks an automation's actions strictly in declaration order.
//! Nested `sequence` and `parallel` blocks are flattened depth-first; the
//! mock has no scheduler, so "parallel" branches run one after another.
//! Delays never sleep, they are recorded as steps.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use hat_automation::{Action, AutomationConfig, DelaySpec, Target};
use hat_core::{Context, Event};

use crate::{HarnessError, MockRuntime};

/// Replay behavior knobs
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Drop delay actions from the step log entirely
    pub skip_delays: bool,
}

/// One observed step of a replay, in execution order
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayStep {
    ServiceCall {
        domain: String,
        service: String,
        data: Value,
    },
    /// A delay that was recorded, not waited for
    Delay { duration: Duration },
    Event { event_type: String },
}

/// Walks actions and drives the runtime
pub struct ReplayEngine<'rt> {
    runtime: &'rt MockRuntime,
    options: ReplayOptions,
}

impl<'rt> ReplayEngine<'rt> {
    pub fn new(runtime: &'rt MockRuntime) -> Self {
        Self::with_options(runtime, ReplayOptions::default())
    }

    pub fn with_options(runtime: &'rt MockRuntime, options: ReplayOptions) -> Self {
        Self { runtime, options }
    }

    /// Replay every action of a definition, returning the step log
    ///
    /// Stops at the first failing action; steps recorded before the
    /// failure are lost with the error, but the runtime's own call log
    /// still holds the calls that were issued.
    pub fn run(&self, config: &AutomationConfig) -> Result<Vec<ReplayStep>, HarnessError> {
        debug!(automation = %config.display_name(), "Replaying actions");
        let context = Context::new();
        let mut steps = Vec::new();
        for action in &config.actions {
            self.run_action(action, &context, &mut steps)?;
        }
        Ok(steps)
    }

    fn run_action(
        &self,
        action: &Action,
        context: &Context,
        steps: &mut Vec<ReplayStep>,
    ) -> Result<(), HarnessError> {
        trace!(kind = action.kind(), "Replaying action");
        match action {
            Action::Service {
                service,
                target,
                data,
                ..
            } => {
                let (domain, name) = service
                    .split_once('.')
                    .ok_or_else(|| HarnessError::InvalidService(service.clone()))?;
                let call_data = build_call_data(data, target.as_ref())?;
                steps.push(ReplayStep::ServiceCall {
                    domain: domain.to_string(),
                    service: name.to_string(),
                    data: call_data.clone(),
                });
                self.runtime
                    .services()
                    .call(domain, name, call_data, true, context.child())?;
            }

            Action::Delay { delay, .. } => {
                let duration = delay
                    .to_duration()
                    .ok_or_else(|| HarnessError::InvalidDelay(describe_delay(delay)))?;
                if !self.options.skip_delays {
                    steps.push(ReplayStep::Delay { duration });
                }
            }

            Action::Event {
                event, event_data, ..
            } => {
                steps.push(ReplayStep::Event {
                    event_type: event.clone(),
                });
                let data = serde_json::to_value(event_data)?;
                self.runtime
                    .event_bus()
                    .fire(Event::new(event.as_str(), data, context.child()));
            }

            Action::Sequence { sequence, .. } => {
                for nested in sequence {
                    self.run_action(nested, context, steps)?;
                }
            }

            Action::Parallel { parallel, .. } => {
                for nested in parallel {
                    self.run_action(nested, context, steps)?;
                }
            }

            Action::Other(value) => {
                return Err(HarnessError::UnsupportedAction {
                    kind: other_kind(value).to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Merge a target into the service data payload
///
/// Single-element target lists collapse to a bare string, matching what
/// hand-written payloads contain; multi-element lists stay lists. Inline
/// data wins on key collision.
fn build_call_data(
    data: &std::collections::HashMap<String, Value>,
    target: Option<&Target>,
) -> Result<Value, HarnessError> {
    let mut payload = Map::new();
    if let Some(target) = target {
        for (key, ids) in [
            ("entity_id", &target.entity_id),
            ("device_id", &target.device_id),
            ("area_id", &target.area_id),
        ] {
            match ids.as_slice() {
                [] => {}
                [single] => {
                    payload.insert(key.to_string(), Value::String(single.clone()));
                }
                many => {
                    payload.insert(
                        key.to_string(),
                        Value::Array(many.iter().cloned().map(Value::String).collect()),
                    );
                }
            }
        }
    }
    for (key, value) in data {
        payload.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(payload))
}

fn describe_delay(delay: &DelaySpec) -> String {
    match delay {
        DelaySpec::Text(s) => s.clone(),
        DelaySpec::Components { .. } => "component delay".to_string(),
    }
}

/// Best-effort name for an action shape the engine does not execute
fn other_kind(value: &Value) -> &str {
    const KNOWN: &[&str] = &[
        "choose",
        "repeat",
        "wait_template",
        "wait_for_trigger",
        "if",
        "stop",
        "variables",
    ];
    let Some(obj) = value.as_object() else {
        return "unknown";
    };
    KNOWN
        .iter()
        .copied()
        .find(|k| obj.contains_key(*k))
        .or_else(|| obj.keys().next().map(String::as_str))
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(json: Value) -> AutomationConfig {
        AutomationConfig::from_value(&json).unwrap()
    }

    #[test]
    fn test_service_actions_run_in_order() {
        let runtime = MockRuntime::new();
        let engine = ReplayEngine::new(&runtime);
        let steps = engine
            .run(&config(json!({
                "action": [
                    {"service": "light.turn_on", "data": {"brightness": 200}},
                    {"service": "light.turn_off"}
                ]
            })))
            .unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(
            steps[0],
            ReplayStep::ServiceCall {
                domain: "light".into(),
                service: "turn_on".into(),
                data: json!({"brightness": 200}),
            }
        );
        assert_eq!(runtime.services().nth_call(1).unwrap().service, "turn_off");
    }

    #[test]
    fn test_target_merges_into_payload() {
        let runtime = MockRuntime::new();
        let steps = ReplayEngine::new(&runtime)
            .run(&config(json!({
                "action": [{
                    "service": "light.turn_on",
                    "target": {"entity_id": ["light.one", "light.two"], "area_id": "kitchen"},
                    "data": {"brightness": 128}
                }]
            })))
            .unwrap();

        let ReplayStep::ServiceCall { data, .. } = &steps[0] else {
            panic!("expected a service call step");
        };
        assert_eq!(data["entity_id"], json!(["light.one", "light.two"]));
        assert_eq!(data["area_id"], "kitchen");
        assert_eq!(data["brightness"], 128);
    }

    #[test]
    fn test_inline_data_wins_over_target() {
        let runtime = MockRuntime::new();
        let steps = ReplayEngine::new(&runtime)
            .run(&config(json!({
                "action": [{
                    "service": "light.turn_on",
                    "target": {"entity_id": "light.from_target"},
                    "data": {"entity_id": "light.from_data"}
                }]
            })))
            .unwrap();

        let ReplayStep::ServiceCall { data, .. } = &steps[0] else {
            panic!("expected a service call step");
        };
        assert_eq!(data["entity_id"], "light.from_data");
    }

    #[test]
    fn test_nested_blocks_flatten_depth_first() {
        let runtime = MockRuntime::new();
        let steps = ReplayEngine::new(&runtime)
            .run(&config(json!({
                "action": [{
                    "sequence": [
                        {"service": "a.first"},
                        {"parallel": [{"service": "b.second"}, {"service": "c.third"}]},
                        {"service": "d.fourth"}
                    ]
                }]
            })))
            .unwrap();

        let services: Vec<&str> = steps
            .iter()
            .filter_map(|s| match s {
                ReplayStep::ServiceCall { service, .. } => Some(service.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(services, ["first", "second", "third", "fourth"]);
    }

    #[test]
    fn test_delay_recorded_without_sleeping() {
        let runtime = MockRuntime::new();
        let started = std::time::Instant::now();
        let steps = ReplayEngine::new(&runtime)
            .run(&config(json!({
                "action": [{"delay": {"minutes": 5}}, {"service": "light.turn_on"}]
            })))
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(
            steps[0],
            ReplayStep::Delay {
                duration: Duration::from_secs(300)
            }
        );
    }

    #[test]
    fn test_oversized_delay_is_a_replay_error() {
        let runtime = MockRuntime::new();
        let err = ReplayEngine::new(&runtime)
            .run(&config(json!({
                "action": [{"delay": {"hours": u64::MAX}}]
            })))
            .unwrap_err();

        assert!(matches!(err, HarnessError::InvalidDelay(_)));
    }

    #[test]
    fn test_skip_delays_drops_delay_steps() {
        let runtime = MockRuntime::new();
        let steps = ReplayEngine::with_options(&runtime, ReplayOptions { skip_delays: true })
            .run(&config(json!({
                "action": [{"delay": "00:00:30"}, {"service": "light.turn_on"}]
            })))
            .unwrap();

        assert_eq!(steps.len(), 1);
        assert!(matches!(steps[0], ReplayStep::ServiceCall { .. }));
    }

    #[test]
    fn test_event_action_fires_on_bus() {
        use std::sync::{Arc, Mutex};

        let runtime = MockRuntime::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_listener = Arc::clone(&seen);
        runtime.event_bus().subscribe("custom_event", move |event| {
            seen_in_listener.lock().unwrap().push(event.data.clone());
        });

        ReplayEngine::new(&runtime)
            .run(&config(json!({
                "action": [{"event": "custom_event", "event_data": {"reason": "test"}}]
            })))
            .unwrap();

        assert_eq!(seen.lock().unwrap().as_slice(), [json!({"reason": "test"})]);
    }

    #[test]
    fn test_unreplayable_action_is_an_error() {
        let runtime = MockRuntime::new();
        let err = ReplayEngine::new(&runtime)
            .run(&config(json!({
                "action": [{"choose": [{"conditions": [], "sequence": []}]}]
            })))
            .unwrap_err();

        match err {
            HarnessError::UnsupportedAction { kind } => assert_eq!(kind, "choose"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_handler_failure_aborts_replay() {
        use hat_service_registry::ServiceError;

        let runtime = MockRuntime::new();
        runtime.services().register("light", "turn_on", |_| {
            Err(ServiceError::CallFailed("bulb offline".into()))
        });

        let err = ReplayEngine::new(&runtime)
            .run(&config(json!({
                "action": [{"service": "light.turn_on"}, {"service": "light.turn_off"}]
            })))
            .unwrap_err();

        assert!(matches!(err, HarnessError::Service(_)));
        // First call recorded even though its handler failed; second never issued
        assert_eq!(runtime.services().call_count(), 1);
    }
}
