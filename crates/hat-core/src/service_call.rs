//! Service call type passed to registered handlers

use crate::Context;
use serde::{Deserialize, Serialize};

/// A single invocation of a `domain.service` operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCall {
    /// The domain the service belongs to (e.g. "light")
    pub domain: String,

    /// The service name (e.g. "turn_on")
    pub service: String,

    /// Free-form data payload (e.g. entity_id, brightness)
    pub data: serde_json::Value,

    /// Context tracking who initiated this call
    pub context: Context,
}

impl ServiceCall {
    /// Create a new service call
    pub fn new(
        domain: impl Into<String>,
        service: impl Into<String>,
        data: serde_json::Value,
        context: Context,
    ) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            data,
            context,
        }
    }

    /// The full `domain.service` identifier
    pub fn service_id(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }

    /// Get a value from the data payload, deserialized to a concrete type
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Entity IDs targeted by this call, handling string and list forms
    pub fn entity_ids(&self) -> Vec<String> {
        match self.data.get("entity_id") {
            Some(serde_json::Value::String(s)) => vec![s.clone()],
            Some(serde_json::Value::Array(arr)) => arr
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => vec![],
        }
    }
}
