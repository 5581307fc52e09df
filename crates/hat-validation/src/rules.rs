//! Domain-specific service-data rules
//!
//! Advisory bounds layered on top of the required-field checks. The ranges
//! are configurable because the platform documents them loosely; the
//! defaults below mirror what the platform's own schemas accept
//! (brightness 0-255, brightness percentage 0-100, plausible indoor
//! temperatures).

use serde_json::{Map, Value};

use crate::primitives::as_number;

/// An inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Configurable bounds applied to well-known service payload fields
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDataRules {
    /// `light.turn_on` brightness
    pub brightness: NumericRange,
    /// `light.turn_on` brightness_pct
    pub brightness_pct: NumericRange,
    /// `climate.set_temperature` target temperature
    pub temperature: NumericRange,
}

impl Default for ServiceDataRules {
    fn default() -> Self {
        Self {
            brightness: NumericRange::new(0.0, 255.0),
            brightness_pct: NumericRange::new(0.0, 100.0),
            temperature: NumericRange::new(-50.0, 50.0),
        }
    }
}

impl ServiceDataRules {
    /// Check a service-call payload against the rules for its domain
    ///
    /// Returns one message per violation; an empty list means no rule
    /// applied or all applied rules passed.
    pub fn validate_service_data(
        &self,
        domain: &str,
        service: &str,
        data: &Map<String, Value>,
    ) -> Vec<String> {
        let mut errors = Vec::new();

        match (domain, service) {
            ("light", "turn_on") => {
                self.check_range(data, "brightness", self.brightness, &mut errors);
                self.check_range(data, "brightness_pct", self.brightness_pct, &mut errors);
                self.check_non_negative(data, "color_temp", &mut errors);
                self.check_non_negative(data, "transition", &mut errors);
            }
            ("climate", "set_temperature") => match data.get("temperature") {
                None => errors.push(
                    "climate.set_temperature requires 'temperature' field".to_string(),
                ),
                Some(value) => match as_number(value) {
                    Some(n) if self.temperature.contains(n) => {}
                    _ => errors.push(format!("temperature seems unrealistic: {value}")),
                },
            },
            ("notify", _) => {
                if !data.contains_key("message") {
                    errors.push("notify services require 'message' field".to_string());
                }
            }
            _ => {}
        }

        errors
    }

    fn check_range(
        &self,
        data: &Map<String, Value>,
        key: &str,
        range: NumericRange,
        errors: &mut Vec<String>,
    ) {
        if let Some(value) = data.get(key) {
            match as_number(value) {
                Some(n) if range.contains(n) => {}
                _ => errors.push(format!(
                    "{key} must be {}-{}, got {value}",
                    range.min, range.max
                )),
            }
        }
    }

    fn check_non_negative(&self, data: &Map<String, Value>, key: &str, errors: &mut Vec<String>) {
        if let Some(value) = data.get(key) {
            match as_number(value) {
                Some(n) if n >= 0.0 => {}
                _ => errors.push(format!("{key} must be non-negative, got {value}")),
            }
        }
    }
}
