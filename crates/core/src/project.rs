//! The locally cached project draft and the creation payloads built from it.
//!
//! The draft mirrors what the authoring screens collect before a project
//! exists on the backend. Keys the authoring layer does not model are kept
//! in [`ProjectDraft::extra`] so a cache round-trip never loses data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::LocalCache;
use crate::error::CoreError;
use crate::item::Item;
use crate::module::ModuleTemplate;
use crate::types::DbId;

/// Cache key under which the draft is stored.
pub const PROJECT_CACHE_KEY: &str = "project";

/// Module name used for the first module of a new project.
pub const PROTOTYPE_MODULE_NAME: &str = "Prototype Task";

/// The template currently being edited.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Payment settings entered on the project form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub wage_per_hit: Option<f64>,
    #[serde(default)]
    pub number_of_hits: Option<i64>,
}

/// Column information of an uploaded dataset.
///
/// `column_headers` hold placeholders as they appear in item text, e.g.
/// `"{city}"`; `first` is the first data row keyed by bare column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(default)]
    pub column_headers: Vec<String>,
    #[serde(default)]
    pub first: Map<String, Value>,
}

/// A project being authored locally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DatasetMetadata>,
    /// `"micro"` for micro-tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tasks: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectDraft {
    /// An empty draft with a single task.
    pub fn blank() -> Self {
        Self {
            total_tasks: Some(1),
            ..Default::default()
        }
    }

    /// Load the cached draft, or a blank one when nothing is cached.
    pub fn load(cache: &dyn LocalCache) -> Result<Self, CoreError> {
        match cache.get(PROJECT_CACHE_KEY)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Self::blank()),
        }
    }

    /// Store this draft in the cache.
    pub fn save(&self, cache: &dyn LocalCache) -> Result<(), CoreError> {
        cache.set(PROJECT_CACHE_KEY, serde_json::to_value(self)?)
    }

    /// Replace the cached draft with a blank one.
    pub fn clean(cache: &dyn LocalCache) -> Result<(), CoreError> {
        Self::blank().save(cache)
    }

    fn templates(&self) -> Vec<ModuleTemplate> {
        self.template
            .iter()
            .map(|t| ModuleTemplate {
                name: t.name.clone(),
                template_items: t.items.clone(),
            })
            .collect()
    }

    fn module_request(&self, name: String, project: Option<DbId>, is_prototype: Option<bool>) -> NewModule {
        let payment = self.payment.clone().unwrap_or_default();
        NewModule {
            name,
            description: self.task_description.clone(),
            project,
            template: self.templates(),
            price: payment.wage_per_hit,
            repetition: payment.number_of_hits.filter(|&n| n != 0).unwrap_or(1),
            number_of_hits: payment.number_of_hits,
            has_data_set: self.metadata.is_some(),
            is_micro: self.micro_flag.as_deref() == Some("micro"),
            is_prototype,
            file_id: self.metadata.as_ref().and_then(|m| m.id),
            task_time: self.task_time,
        }
    }

    /// Body of the create-project request: the project plus its prototype module.
    pub fn new_project_request(&self) -> NewProject {
        NewProject {
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone(),
            categories: self.categories.clone(),
            modules: vec![self.module_request(PROTOTYPE_MODULE_NAME.into(), None, Some(true))],
        }
    }

    /// Body of the add-module request for an existing project.
    pub fn new_milestone_request(&self, project_id: DbId) -> NewModule {
        self.module_request(
            self.module_name.clone().unwrap_or_default(),
            Some(project_id),
            None,
        )
    }
}

/// Create-project request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub categories: Vec<DbId>,
    pub modules: Vec<NewModule>,
}

/// Create-module request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewModule {
    pub name: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<DbId>,
    pub template: Vec<ModuleTemplate>,
    pub price: Option<f64>,
    pub repetition: i64,
    pub number_of_hits: Option<i64>,
    pub has_data_set: bool,
    pub is_micro: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_prototype: Option<bool>,
    pub file_id: Option<DbId>,
    pub task_time: Option<f64>,
}
