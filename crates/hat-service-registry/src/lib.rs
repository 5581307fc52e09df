//! Service handler registry and call log for the mock runtime
//!
//! The ServiceRegistry binds handlers to `domain.service` pairs and records
//! every invocation in an append-only log. A call with no bound handler is
//! still recorded: tests routinely assert on call records for services whose
//! behavior is never wired up. Handler errors propagate to the caller of
//! `call` so a broken handler surfaces as a test failure instead of a
//! silently missing effect.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use hat_core::events::CallServiceData;
use hat_core::{Context, ServiceCall};
use hat_event_bus::EventBus;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by service handlers
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service call failed: {0}")]
    CallFailed(String),

    #[error("invalid service data: {0}")]
    InvalidData(String),
}

/// Result type returned by service handlers
pub type HandlerResult = Result<(), ServiceError>;

/// Handler invoked for each matching service call
pub type ServiceHandler = Arc<dyn Fn(&ServiceCall) -> HandlerResult + Send + Sync>;

/// One entry in the append-only call log
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceCallRecord {
    pub domain: String,
    pub service: String,
    pub data: serde_json::Value,
    pub blocking: bool,
    pub timestamp: DateTime<Utc>,
    pub context: Context,
}

impl ServiceCallRecord {
    /// The full `domain.service` identifier
    pub fn service_id(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }

    fn matches(&self, domain: &str, service: &str) -> bool {
        self.domain == domain && self.service == service
    }
}

/// Binds service handlers and records every call
pub struct ServiceRegistry {
    /// Handlers per "domain.service" key, invoked in registration order
    handlers: DashMap<String, Vec<ServiceHandler>>,
    /// Append-only invocation log, insertion order significant
    calls: Mutex<Vec<ServiceCallRecord>>,
    /// Bus for call_service events
    event_bus: Arc<EventBus>,
}

impl ServiceRegistry {
    /// Create a new registry wired to the given event bus
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            handlers: DashMap::new(),
            calls: Mutex::new(Vec::new()),
            event_bus,
        }
    }

    /// Register a handler for a `domain.service` pair
    ///
    /// Multiple handlers may be bound to the same pair; they run in
    /// registration order on every call.
    pub fn register<F>(&self, domain: impl Into<String>, service: impl Into<String>, handler: F)
    where
        F: Fn(&ServiceCall) -> HandlerResult + Send + Sync + 'static,
    {
        let domain = domain.into();
        let service = service.into();
        debug!(domain = %domain, service = %service, "Registering service handler");

        self.handlers
            .entry(format!("{domain}.{service}"))
            .or_default()
            .push(Arc::new(handler));
    }

    /// Call a service
    ///
    /// The call is appended to the log and a CALL_SERVICE event is fired
    /// before any handler runs, so the record exists even when a handler
    /// fails or none is bound. Handlers run synchronously on the calling
    /// thread regardless of `blocking`; the flag is kept on the record for
    /// assertions. The first handler error aborts the call and propagates.
    pub fn call(
        &self,
        domain: &str,
        service: &str,
        data: serde_json::Value,
        blocking: bool,
        context: Context,
    ) -> HandlerResult {
        let key = format!("{domain}.{service}");
        debug!(domain = %domain, service = %service, blocking, "Calling service");

        self.calls
            .lock()
            .expect("call log lock poisoned")
            .push(ServiceCallRecord {
                domain: domain.to_string(),
                service: service.to_string(),
                data: data.clone(),
                blocking,
                timestamp: Utc::now(),
                context: context.clone(),
            });

        self.event_bus.fire_typed(
            &CallServiceData {
                domain: domain.to_string(),
                service: service.to_string(),
                service_data: data.clone(),
            },
            context.clone(),
        );

        let bound: Vec<ServiceHandler> = self
            .handlers
            .get(&key)
            .map(|h| h.clone())
            .unwrap_or_default();
        if bound.is_empty() {
            warn!(domain = %domain, service = %service, "No handler bound, call recorded only");
            return Ok(());
        }

        let call = ServiceCall::new(domain, service, data, context);
        for handler in bound {
            handler(&call)?;
        }
        Ok(())
    }

    /// Check whether any handler is bound for a pair
    pub fn has_service(&self, domain: &str, service: &str) -> bool {
        self.handlers
            .get(&format!("{domain}.{service}"))
            .map(|h| !h.is_empty())
            .unwrap_or(false)
    }

    /// Remove all handlers for a pair; returns false if none were bound
    pub fn unregister(&self, domain: &str, service: &str) -> bool {
        let removed = self
            .handlers
            .remove(&format!("{domain}.{service}"))
            .is_some();
        if removed {
            debug!(domain = %domain, service = %service, "Unregistered service handlers");
        }
        removed
    }

    /// Number of pairs with at least one bound handler
    pub fn service_count(&self) -> usize {
        self.handlers.iter().filter(|e| !e.value().is_empty()).count()
    }

    // --- Read-only views over the call log ---

    /// Whether a pair was ever called
    pub fn has_calls(&self, domain: &str, service: &str) -> bool {
        self.calls
            .lock()
            .expect("call log lock poisoned")
            .iter()
            .any(|r| r.matches(domain, service))
    }

    /// All calls for a pair, in issue order
    pub fn calls_for(&self, domain: &str, service: &str) -> Vec<ServiceCallRecord> {
        self.calls
            .lock()
            .expect("call log lock poisoned")
            .iter()
            .filter(|r| r.matches(domain, service))
            .cloned()
            .collect()
    }

    /// The whole log, in issue order
    pub fn all_calls(&self) -> Vec<ServiceCallRecord> {
        self.calls.lock().expect("call log lock poisoned").clone()
    }

    /// The nth call overall (0-based)
    pub fn nth_call(&self, index: usize) -> Option<ServiceCallRecord> {
        self.calls
            .lock()
            .expect("call log lock poisoned")
            .get(index)
            .cloned()
    }

    /// The most recent call overall
    pub fn last_call(&self) -> Option<ServiceCallRecord> {
        self.calls
            .lock()
            .expect("call log lock poisoned")
            .last()
            .cloned()
    }

    /// Total number of recorded calls
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("call log lock poisoned").len()
    }
}

/// Thread-safe wrapper for ServiceRegistry
pub type SharedServiceRegistry = Arc<ServiceRegistry>;
