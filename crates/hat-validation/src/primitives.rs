//! Shared value-level checks used by every validation pass

use serde_json::Value;

/// Human-readable name of a JSON value's type, for error messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Check a `HH:MM` or `HH:MM:SS` time-of-day string
///
/// Stricter than generic range checking: rejects hour > 23, minute > 59,
/// second > 59, so `25:00` and `24:00` are both invalid.
pub(crate) fn is_valid_time(value: &Value) -> bool {
    let Some(text) = value.as_str() else {
        return false;
    };
    let parts: Vec<&str> = text.split(':').collect();
    if !(parts.len() == 2 || parts.len() == 3) {
        return false;
    }
    let mut fields = parts.iter().map(|p| p.parse::<u32>());
    let (Some(Ok(hours)), Some(Ok(minutes))) = (fields.next(), fields.next()) else {
        return false;
    };
    let seconds = match fields.next() {
        None => 0,
        Some(Ok(s)) => s,
        Some(Err(_)) => return false,
    };
    hours <= 23 && minutes <= 59 && seconds <= 59
}

/// Check an identifier slug: lowercase letters, digits, underscores only
pub(crate) fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Split a `domain.service` string into its two non-empty halves
///
/// Returns None when the separator count is not exactly one or either half
/// is empty, so `turn_on` and `light.turn_on.extra` are both rejected.
pub(crate) fn split_service(s: &str) -> Option<(&str, &str)> {
    let mut dots = s.match_indices('.');
    let sep = match (dots.next(), dots.next()) {
        (Some((i, _)), None) => i,
        _ => return None,
    };
    let (domain, service) = (&s[..sep], &s[sep + 1..]);
    if domain.is_empty() || service.is_empty() {
        None
    } else {
        Some((domain, service))
    }
}

/// Read a value as a number, accepting numeric strings like `"21.5"`
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a value into an ordered sequence of items
///
/// A single mapping counts as a one-element sequence, matching how
/// definition files supply a lone trigger or action. Returns None for
/// scalars, which callers report as a shape error.
pub(crate) fn coerce_sequence(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(_) => Some(vec![value]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_time_boundaries() {
        assert!(is_valid_time(&json!("18:30")));
        assert!(is_valid_time(&json!("23:59:59")));
        assert!(is_valid_time(&json!("00:00")));
        assert!(!is_valid_time(&json!("24:00")));
        assert!(!is_valid_time(&json!("25:00")));
        assert!(!is_valid_time(&json!("18:60")));
        assert!(!is_valid_time(&json!("18:30:60")));
        assert!(!is_valid_time(&json!("18")));
        assert!(!is_valid_time(&json!("18:30:00:00")));
        assert!(!is_valid_time(&json!("six thirty")));
        assert!(!is_valid_time(&json!(1830)));
        assert!(!is_valid_time(&json!("-1:30")));
    }

    #[test]
    fn test_slug() {
        assert!(is_valid_slug("evening_lights_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Evening"));
        assert!(!is_valid_slug("evening-lights"));
    }

    #[test]
    fn test_split_service() {
        assert_eq!(split_service("light.turn_on"), Some(("light", "turn_on")));
        assert_eq!(split_service("turn_on"), None);
        assert_eq!(split_service("light.turn_on.extra"), None);
        assert_eq!(split_service(".turn_on"), None);
        assert_eq!(split_service("light."), None);
    }

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(21.5)), Some(21.5));
        assert_eq!(as_number(&json!("21.5")), Some(21.5));
        assert_eq!(as_number(&json!(" 7 ")), Some(7.0));
        assert_eq!(as_number(&json!("warm")), None);
        assert_eq!(as_number(&json!(true)), None);
    }

    #[test]
    fn test_coerce_sequence() {
        assert_eq!(coerce_sequence(&json!([1, 2])).unwrap().len(), 2);
        assert_eq!(coerce_sequence(&json!({"platform": "time"})).unwrap().len(), 1);
        assert!(coerce_sequence(&json!("scalar")).is_none());
    }
}
