//! Core types for the Home Assistant automation test toolkit
//!
//! This crate provides the value types shared by the mock runtime and the
//! configuration validator: EntityId, EntityState, Context, ServiceCall,
//! and the event types carried on the mock event bus.

mod context;
mod entity_id;
mod event;
mod service_call;
mod state;

pub use context::Context;
pub use entity_id::{EntityId, EntityIdError};
pub use event::{Event, EventData, EventType};
pub use service_call::ServiceCall;
pub use state::EntityState;

/// Well-known state values used by automation tests
pub mod states {
    pub const STATE_ON: &str = "on";
    pub const STATE_OFF: &str = "off";
    pub const STATE_HOME: &str = "home";
    pub const STATE_NOT_HOME: &str = "not_home";
    pub const STATE_UNKNOWN: &str = "unknown";
    pub const STATE_UNAVAILABLE: &str = "unavailable";
}

/// Standard event types fired by the mock runtime
pub mod events {
    use super::*;

    /// Fired by the state store on every `set` and `remove`
    pub const STATE_CHANGED: &str = "state_changed";

    /// Fired by the service registry on every call, bound or not
    pub const CALL_SERVICE: &str = "call_service";

    /// Payload of STATE_CHANGED events
    ///
    /// `old_state` is absent on the first-ever set of an entity;
    /// `new_state` is absent when the entity was removed.
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct StateChangedData {
        pub entity_id: EntityId,
        pub old_state: Option<EntityState>,
        pub new_state: Option<EntityState>,
    }

    impl EventData for StateChangedData {
        fn event_type() -> &'static str {
            STATE_CHANGED
        }
    }

    /// Payload of CALL_SERVICE events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct CallServiceData {
        pub domain: String,
        pub service: String,
        pub service_data: serde_json::Value,
    }

    impl EventData for CallServiceData {
        fn event_type() -> &'static str {
            CALL_SERVICE
        }
    }
}
