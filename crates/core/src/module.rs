//! Module model, status codes, and publish readiness rules.
//!
//! A module is owned by the backend; this crate only mirrors the fields
//! the authoring layer reads or edits. Unknown backend fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};

use crate::item::Item;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Wire code of a draft module.
pub const STATUS_DRAFT: i16 = 1;

/// Wire code of a published module.
pub const STATUS_PUBLISHED: i16 = 2;

/// Lifecycle status of a module, carried on the wire as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i16", into = "i16")]
pub enum ModuleStatus {
    #[default]
    Draft,
    Published,
    /// Any other backend code, preserved as-is.
    Other(i16),
}

impl From<i16> for ModuleStatus {
    fn from(code: i16) -> Self {
        match code {
            STATUS_DRAFT => Self::Draft,
            STATUS_PUBLISHED => Self::Published,
            other => Self::Other(other),
        }
    }
}

impl From<ModuleStatus> for i16 {
    fn from(status: ModuleStatus) -> Self {
        match status {
            ModuleStatus::Draft => STATUS_DRAFT,
            ModuleStatus::Published => STATUS_PUBLISHED,
            ModuleStatus::Other(code) => code,
        }
    }
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// A named collection of items attached to a module.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub template_items: Vec<Item>,
}

/// An uploaded spreadsheet attached to a module as task input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFile {
    pub id: DbId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// A unit of work within a project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project: Option<DbId>,
    #[serde(default)]
    pub status: ModuleStatus,
    /// Payment per task. The backend may send a decimal string.
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<f64>,
    /// Number of workers per task.
    #[serde(default)]
    pub repetition: Option<i64>,
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default, alias = "templates")]
    pub template: Vec<ModuleTemplate>,
    #[serde(default)]
    pub batch_files: Vec<BatchFile>,
    #[serde(default)]
    pub has_data_set: Option<bool>,
    #[serde(default)]
    pub is_micro: Option<bool>,
    #[serde(default)]
    pub is_prototype: Option<bool>,
    #[serde(default)]
    pub task_time: Option<f64>,
    #[serde(default)]
    pub allow_feedback: Option<bool>,
    #[serde(default)]
    pub total_tasks: Option<i64>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub created_timestamp: Option<Timestamp>,
    #[serde(default)]
    pub last_updated: Option<Timestamp>,
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!(
            "price must be a number or decimal string, got {other}"
        ))),
    }
}

impl Module {
    /// Items of the first template, or none when the module has no template.
    pub fn template_items(&self) -> &[Item] {
        self.template
            .first()
            .map(|t| t.template_items.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_published(&self) -> bool {
        self.status == ModuleStatus::Published
    }
}

/// The object observed by an authoring session.
///
/// Before the first load only the route's primary key is known; the first
/// transition to `Loaded` is never treated as a user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleView {
    Pending { pk: DbId },
    Loaded(Module),
}

impl ModuleView {
    pub fn as_loaded(&self) -> Option<&Module> {
        match self {
            Self::Loaded(module) => Some(module),
            Self::Pending { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Publish readiness
// ---------------------------------------------------------------------------

/// A condition that prevents a module from being published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishBlocker {
    MissingPrice,
    MissingRepetition,
    EmptyTemplate,
}

impl PublishBlocker {
    /// User-facing explanation of the blocker.
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingPrice => "Please enter task price ($/task).",
            Self::MissingRepetition => "Please enter number of workers per task.",
            Self::EmptyTemplate => "Please add at least one item to the template.",
        }
    }
}

impl std::fmt::Display for PublishBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Every unmet publish condition, in check order. Empty means publishable.
///
/// A module is publishable when its price is set and non-zero, its
/// repetition is greater than zero, and its first template has at least
/// one item.
pub fn publish_blockers(module: &Module) -> Vec<PublishBlocker> {
    let mut blockers = Vec::new();
    if !matches!(module.price, Some(p) if p != 0.0 && !p.is_nan()) {
        blockers.push(PublishBlocker::MissingPrice);
    }
    if !matches!(module.repetition, Some(r) if r > 0) {
        blockers.push(PublishBlocker::MissingRepetition);
    }
    if module.template_items().is_empty() {
        blockers.push(PublishBlocker::EmptyTemplate);
    }
    blockers
}
