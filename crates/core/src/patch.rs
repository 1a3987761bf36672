//! Field diffing between successive module snapshots.
//!
//! Only three fields are watched: `name`, `price`, and `repetition`. A
//! field is included in a patch when its value changed and the new value
//! is truthy (non-empty name, non-zero price, non-zero repetition).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::module::{Module, ModuleView};

/// A module field whose edits are pushed to the backend automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchedField {
    Name,
    Price,
    Repetition,
}

impl WatchedField {
    /// Evaluation order when diffing a snapshot.
    pub const ORDER: [WatchedField; 3] = [Self::Name, Self::Price, Self::Repetition];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Repetition => "repetition",
        }
    }

    /// Notice shown when the remote update for this field fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Name => "Could not update module name.",
            Self::Price => "Could not update task price.",
            Self::Repetition => "Could not update number of workers per task.",
        }
    }

    /// The field's new JSON value, if it changed and is truthy.
    fn changed_value(self, old: &Module, new: &Module) -> Option<Value> {
        match self {
            Self::Name => (new.name != old.name && !new.name.is_empty())
                .then(|| Value::String(new.name.clone())),
            Self::Price => match new.price {
                Some(p) if new.price != old.price && p != 0.0 && !p.is_nan() => {
                    serde_json::Number::from_f64(p).map(Value::Number)
                }
                _ => None,
            },
            Self::Repetition => match new.repetition {
                Some(r) if new.repetition != old.repetition && r != 0 => Some(Value::from(r)),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for WatchedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial update computed from one snapshot transition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPatch {
    /// Changed fields and their new values.
    pub fields: Map<String, Value>,
    /// Debounce key: the last changed field in [`WatchedField::ORDER`].
    ///
    /// When several fields change in one transition they all travel in
    /// `fields`, but only this key's pending update is superseded.
    pub key: WatchedField,
}

/// Diff two module snapshots. Returns `None` when no watched field qualifies.
pub fn compute_patch(old: &Module, new: &Module) -> Option<FieldPatch> {
    let mut fields = Map::new();
    let mut key = None;

    for field in WatchedField::ORDER {
        if let Some(value) = field.changed_value(old, new) {
            fields.insert(field.as_str().to_string(), value);
            key = Some(field);
        }
    }

    key.map(|key| FieldPatch { fields, key })
}

/// Decide whether a view transition is a user edit worth diffing.
///
/// Returns the (old, new) module pair when the views differ, the new module
/// has an id, and the previous view was already loaded. The initial
/// `Pending -> Loaded` transition is skipped.
pub fn edit_transition<'a>(
    prev: &'a ModuleView,
    next: &'a ModuleView,
) -> Option<(&'a Module, &'a Module)> {
    if prev == next {
        return None;
    }
    let old = prev.as_loaded()?;
    let new = next.as_loaded()?;
    new.id?;
    Some((old, new))
}
