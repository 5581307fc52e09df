//! In-memory entity state store for the mock runtime
//!
//! The StateStore tracks the current state of every entity a test touches.
//! Writes are synchronous: a `set` is visible to the next `get` with no
//! flushing or awaiting, and a `state_changed` event carrying the old and
//! new snapshots is fired on the bus before `set` returns.

use dashmap::DashMap;
use hat_core::events::StateChangedData;
use hat_core::{Context, EntityId, EntityState};
use hat_event_bus::EventBus;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Tracks entity states and fires state_changed events
pub struct StateStore {
    /// Current snapshot per entity, keyed by the full entity_id string
    states: DashMap<String, EntityState>,
    /// Bus for state_changed events
    event_bus: Arc<EventBus>,
}

impl StateStore {
    /// Create a new store wired to the given event bus
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            states: DashMap::new(),
            event_bus,
        }
    }

    /// Set the state of an entity, replacing any previous snapshot
    ///
    /// `last_changed` is always refreshed, even if the value is unchanged.
    /// Fires STATE_CHANGED with the old snapshot (absent on first set) and
    /// the new one.
    pub fn set(
        &self,
        entity_id: EntityId,
        state: impl Into<String>,
        attributes: HashMap<String, serde_json::Value>,
        context: Context,
    ) -> EntityState {
        let new_state = EntityState::new(entity_id.clone(), state, attributes, context.clone());
        debug!(entity_id = %entity_id, state = %new_state.state, "Setting entity state");

        let old_state = self
            .states
            .insert(entity_id.to_string(), new_state.clone());

        self.event_bus.fire_typed(
            &StateChangedData {
                entity_id,
                old_state,
                new_state: Some(new_state.clone()),
            },
            context,
        );

        new_state
    }

    /// Get the current snapshot of an entity; None for unknown entities
    pub fn get(&self, entity_id: &str) -> Option<EntityState> {
        self.states.get(entity_id).map(|s| s.clone())
    }

    /// Get just the state value of an entity
    pub fn get_state(&self, entity_id: &str) -> Option<String> {
        self.states.get(entity_id).map(|s| s.state.clone())
    }

    /// Check whether an entity is currently in a specific state
    pub fn is_state(&self, entity_id: &str, state: &str) -> bool {
        self.get_state(entity_id).as_deref() == Some(state)
    }

    /// All current snapshots
    pub fn all(&self) -> Vec<EntityState> {
        self.states.iter().map(|r| r.value().clone()).collect()
    }

    /// Remove an entity's state
    ///
    /// Fires STATE_CHANGED with the old snapshot and no new one.
    pub fn remove(&self, entity_id: &EntityId, context: Context) -> Option<EntityState> {
        let old_state = self.states.remove(entity_id.as_str()).map(|(_, s)| s);

        if let Some(ref state) = old_state {
            trace!(entity_id = %entity_id, "Removing entity state");
            self.event_bus.fire_typed(
                &StateChangedData {
                    entity_id: entity_id.clone(),
                    old_state: Some(state.clone()),
                    new_state: None,
                },
                context,
            );
        }

        old_state
    }

    /// Number of entities with a state
    pub fn entity_count(&self) -> usize {
        self.states.len()
    }
}

/// Thread-safe wrapper for StateStore
pub type SharedStateStore = Arc<StateStore>;
