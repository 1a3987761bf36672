//! Editable template items and the component-to-item factory.

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentType, Role};
use crate::types::ItemId;

/// Prefix of every generated item identifier.
pub const ITEM_ID_PREFIX: &str = "item";

/// Component fields that are never copied onto an item.
pub const EXCLUDED_FIELDS: &[&str] = &["description"];

/// An editable instance of a [`Component`] placed into a template.
///
/// Selection is tracked by the editor, not on the item. A legacy
/// `isSelected` key in cached data is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id_string: ItemId,
    /// Field name in submitted answers; always equal to `id_string`.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub label: String,
    pub values: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub data_source: Option<String>,
    /// Runtime-entered answer. Checkbox answers are comma-joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

fn default_role() -> Role {
    Role::Input
}

/// Format the identifier for counter value `n`.
pub fn item_id(n: u64) -> ItemId {
    format!("{ITEM_ID_PREFIX}{n}")
}

/// Derive a new item from `component`.
///
/// Every component field is carried over except those in
/// [`EXCLUDED_FIELDS`]; `id_string` and `name` are both set to `id`.
pub fn instantiate(component: &Component, id: ItemId) -> Item {
    Item {
        name: id.clone(),
        id_string: id,
        kind: component.kind,
        label: component.label.clone(),
        values: component.values.clone(),
        icon: component.icon.clone(),
        layout: component.layout.clone(),
        role: component.role,
        data_source: component.data_source.clone(),
        answer: None,
    }
}

impl Item {
    /// The comma-separated entries of `values`.
    pub fn options(&self) -> Vec<&str> {
        self.values.split(',').collect()
    }

    /// Options currently contained in the answer.
    pub fn chosen_options(&self) -> Vec<&str> {
        match self.answer.as_deref() {
            Some("") | None => Vec::new(),
            Some(answer) => answer.split(',').collect(),
        }
    }

    /// Toggle `option` in a comma-joined answer set.
    ///
    /// Removes the option when present, appends it otherwise. An answer that
    /// becomes empty is stored as the empty string.
    pub fn toggle_option(&mut self, option: &str) {
        let mut chosen: Vec<String> = self.chosen_options().into_iter().map(String::from).collect();
        match chosen.iter().position(|o| o == option) {
            Some(index) => {
                chosen.remove(index);
            }
            None => chosen.push(option.to_string()),
        }
        self.answer = Some(chosen.join(","));
    }
}
