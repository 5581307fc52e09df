//! Typed automation configuration model
//!
//! An automation is a trigger/condition/action tuple decoded from YAML or
//! JSON. Triggers are tagged by their `platform` field, conditions by their
//! `condition` field, and actions by shape (presence of `service`, `delay`,
//! and so on). The raw-value validator in `hat-validation` checks the same
//! shapes before this typed model is decoded, so decoding a validated
//! definition does not fail for the action kinds the harness replays.

mod action;
mod automation;
mod condition;
mod trigger;

pub use action::{Action, DelaySpec, Target};
pub use automation::{AutomationConfig, Mode};
pub use condition::Condition;
pub use trigger::{EntityIdSpec, StateMatch, SunEvent, Trigger, ZoneEvent};

use serde::{Deserialize, Deserializer};

/// Deserialize a field that accepts either one item or a list of items
///
/// Definition files routinely supply a single trigger/condition/action as a
/// bare mapping; this coerces both shapes to a Vec.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(v) => v,
        OneOrMany::One(t) => vec![t],
    })
}

/// Deserialize a field that accepts either one string or a list of strings
pub(crate) fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    one_or_many(deserializer)
}
