//! The mock runtime facade: one bus, one state store, one service registry

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use hat_core::{Context, EntityState, Event, EventType};
use hat_event_bus::{EventBus, SharedEventBus};
use hat_service_registry::{HandlerResult, ServiceRegistry, SharedServiceRegistry};
use hat_state_store::{SharedStateStore, StateStore};

use crate::HarnessError;

/// An isolated in-memory runtime for one test
///
/// Construction wires a fresh event bus into a fresh state store and
/// service registry; nothing is global, so parallel tests cannot observe
/// each other. All operations are synchronous and complete before
/// returning.
pub struct MockRuntime {
    event_bus: SharedEventBus,
    states: SharedStateStore,
    services: SharedServiceRegistry,
}

impl MockRuntime {
    pub fn new() -> Self {
        let event_bus = Arc::new(EventBus::new());
        let states = Arc::new(StateStore::new(Arc::clone(&event_bus)));
        let services = Arc::new(ServiceRegistry::new(Arc::clone(&event_bus)));
        debug!("Created mock runtime");
        Self {
            event_bus,
            states,
            services,
        }
    }

    pub fn event_bus(&self) -> &SharedEventBus {
        &self.event_bus
    }

    pub fn states(&self) -> &SharedStateStore {
        &self.states
    }

    pub fn services(&self) -> &SharedServiceRegistry {
        &self.services
    }

    // --- Shorthand for the common test moves ---

    /// Set an entity's state with no attributes
    pub fn set_state(&self, entity_id: &str, state: &str) -> Result<EntityState, HarnessError> {
        self.set_state_with_attrs(entity_id, state, HashMap::new())
    }

    /// Set an entity's state with attributes
    pub fn set_state_with_attrs(
        &self,
        entity_id: &str,
        state: &str,
        attributes: HashMap<String, serde_json::Value>,
    ) -> Result<EntityState, HarnessError> {
        let entity_id = entity_id.parse()?;
        Ok(self.states.set(entity_id, state, attributes, Context::new()))
    }

    pub fn get_state(&self, entity_id: &str) -> Option<String> {
        self.states.get_state(entity_id)
    }

    pub fn is_state(&self, entity_id: &str, state: &str) -> bool {
        self.states.is_state(entity_id, state)
    }

    /// Issue a blocking service call with a fresh context
    pub fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: serde_json::Value,
    ) -> HandlerResult {
        self.services.call(domain, service, data, true, Context::new())
    }

    /// Fire an arbitrary event on the bus
    pub fn fire_event(&self, event_type: impl Into<EventType>, data: serde_json::Value) {
        self.event_bus.fire(Event::new(event_type, data, Context::new()));
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}
