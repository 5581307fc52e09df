//! Service tracking: a recording handler plus ordered assertions
//!
//! The registry already keeps its own call log; the tracker exists for the
//! pairs a test explicitly cares about, and can enforce payload rules at
//! call time so a bad payload fails the replay instead of a later assert.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;

use hat_service_registry::{ServiceError, ServiceRegistry};
use hat_validation::ServiceDataRules;

/// One call observed by a tracker
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedCall {
    pub domain: String,
    pub service: String,
    pub data: Value,
}

impl TrackedCall {
    pub fn service_id(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }
}

/// Records calls to the services it is attached to
///
/// Clone-cheap: clones share the same log, so a test can keep one handle
/// while the registry holds the other inside its handlers.
#[derive(Clone, Default)]
pub struct ServiceTracker {
    calls: Arc<Mutex<Vec<TrackedCall>>>,
}

impl ServiceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recording handler for a `domain.service` pair
    pub fn attach(&self, registry: &ServiceRegistry, domain: &str, service: &str) {
        let calls = Arc::clone(&self.calls);
        debug!(domain = %domain, service = %service, "Attaching service tracker");
        registry.register(domain, service, move |call| {
            calls.lock().expect("tracker lock poisoned").push(TrackedCall {
                domain: call.domain.clone(),
                service: call.service.clone(),
                data: call.data.clone(),
            });
            Ok(())
        });
    }

    /// Register a handler that records and validates each payload
    ///
    /// A payload the rules reject fails the call with `InvalidData`; the
    /// call is still recorded by the tracker first.
    pub fn attach_validating(
        &self,
        registry: &ServiceRegistry,
        domain: &str,
        service: &str,
        rules: ServiceDataRules,
    ) {
        let calls = Arc::clone(&self.calls);
        registry.register(domain, service, move |call| {
            calls.lock().expect("tracker lock poisoned").push(TrackedCall {
                domain: call.domain.clone(),
                service: call.service.clone(),
                data: call.data.clone(),
            });

            let empty = serde_json::Map::new();
            let data = call.data.as_object().unwrap_or(&empty);
            let violations = rules.validate_service_data(&call.domain, &call.service, data);
            if violations.is_empty() {
                Ok(())
            } else {
                Err(ServiceError::InvalidData(violations.join("; ")))
            }
        });
    }

    pub fn calls(&self) -> Vec<TrackedCall> {
        self.calls.lock().expect("tracker lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("tracker lock poisoned").len()
    }

    pub fn calls_for(&self, domain: &str, service: &str) -> Vec<TrackedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.domain == domain && c.service == service)
            .collect()
    }

    // --- Assertions; panic with a readable message, as test helpers do ---

    /// Assert that a `domain.service` was called at least once
    pub fn assert_called(&self, service_id: &str) {
        let calls = self.calls();
        assert!(
            calls.iter().any(|c| c.service_id() == service_id),
            "expected a call to '{service_id}', observed: {:?}",
            calls.iter().map(TrackedCall::service_id).collect::<Vec<_>>()
        );
    }

    /// Assert the nth observed call (0-based) and a subset of its payload
    ///
    /// Every key in `expected_data` must be present in the actual payload
    /// with an equal value; extra actual keys are ignored.
    pub fn assert_called_with(&self, index: usize, service_id: &str, expected_data: &Value) {
        let calls = self.calls();
        let Some(call) = calls.get(index) else {
            panic!(
                "expected call {index} to '{service_id}', but only {} calls were observed",
                calls.len()
            );
        };
        assert_eq!(
            call.service_id(),
            service_id,
            "call {index} was '{}', expected '{service_id}'",
            call.service_id()
        );
        if let Some(expected) = expected_data.as_object() {
            for (key, value) in expected {
                assert_eq!(
                    call.data.get(key),
                    Some(value),
                    "call {index} to '{service_id}': key '{key}' expected {value}, payload was {}",
                    call.data
                );
            }
        }
    }

    /// Assert the exact order of all observed calls by `domain.service` id
    pub fn assert_called_in_order(&self, expected: &[&str]) {
        let observed: Vec<String> = self.calls().iter().map(TrackedCall::service_id).collect();
        assert_eq!(
            observed, expected,
            "service calls out of order: observed {observed:?}, expected {expected:?}"
        );
    }
}
