//! Template item editor.
//!
//! [`TemplateEditor`] owns the ordered item list of one editing session
//! and writes it back into the session's [`ProjectDraft`] after every
//! structural change. Selection is a single optional item id held by the
//! editor, so at most one item can ever be selected.
//!
//! Item ids come from a session counter: it is incremented before each use
//! and never reused. When a cached template is reopened the counter
//! resumes after the highest restored `item<N>` id.

use crate::cache::LocalCache;
use crate::component::{catalog, find_component, Component, ComponentType};
use crate::error::CoreError;
use crate::item::{instantiate, item_id, Item, ITEM_ID_PREFIX};
use crate::naming::random_template_name;
use crate::preview::substitute_placeholders;
use crate::project::{ProjectDraft, TemplateDraft};
use crate::types::ItemId;

/// Editing session for the template of a project draft.
#[derive(Debug)]
pub struct TemplateEditor {
    catalog: Vec<Component>,
    project: ProjectDraft,
    template_name: String,
    items: Vec<Item>,
    selected: Option<ItemId>,
    selected_tab: usize,
    id_counter: u64,
}

impl TemplateEditor {
    /// Start editing `project` with the built-in catalog.
    pub fn new(project: ProjectDraft) -> Self {
        Self::with_catalog(project, catalog())
    }

    /// Start editing `project` with a custom catalog.
    ///
    /// Reuses the draft's template name and items when present; otherwise
    /// a random name is generated and the list starts empty.
    pub fn with_catalog(project: ProjectDraft, catalog: Vec<Component>) -> Self {
        let (template_name, items) = match &project.template {
            Some(template) => {
                let name = if template.name.is_empty() {
                    random_template_name()
                } else {
                    template.name.clone()
                };
                (name, template.items.clone())
            }
            None => (random_template_name(), Vec::new()),
        };

        let id_counter = items
            .iter()
            .filter_map(|item| item.id_string.strip_prefix(ITEM_ID_PREFIX)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            catalog,
            project,
            template_name,
            items,
            selected: None,
            selected_tab: 0,
            id_counter,
        }
    }

    /// Open an editor on the draft stored in `cache`.
    pub fn open(cache: &dyn LocalCache) -> Result<Self, CoreError> {
        Ok(Self::new(ProjectDraft::load(cache)?))
    }

    // ---- accessors ----

    pub fn catalog(&self) -> &[Component] {
        &self.catalog
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id_string == id)
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn project(&self) -> &ProjectDraft {
        &self.project
    }

    pub fn selected(&self) -> Option<&Item> {
        self.selected.as_deref().and_then(|id| self.item(id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Index of the active property-panel tab.
    pub fn selected_tab(&self) -> usize {
        self.selected_tab
    }

    pub fn set_selected_tab(&mut self, tab: usize) {
        self.selected_tab = tab;
    }

    // ---- structural edits ----

    fn next_item_id(&mut self) -> ItemId {
        self.id_counter += 1;
        item_id(self.id_counter)
    }

    fn index_of(&self, id: &str) -> Result<usize, CoreError> {
        self.items
            .iter()
            .position(|item| item.id_string == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))
    }

    /// Append a new item derived from `component` and return its id.
    ///
    /// Clears the current selection first.
    pub fn add_component(&mut self, component: &Component) -> ItemId {
        self.selected = None;

        let id = self.next_item_id();
        self.items.push(instantiate(component, id.clone()));
        self.sync();
        id
    }

    /// Append a new item of the given catalog type.
    pub fn add_from_catalog(&mut self, kind: ComponentType) -> Result<ItemId, CoreError> {
        let component = find_component(&self.catalog, kind)
            .cloned()
            .ok_or_else(|| CoreError::Validation(format!("No catalog component of type '{kind}'")))?;
        Ok(self.add_component(&component))
    }

    /// Duplicate an item and return the new item's id.
    ///
    /// The copy is instantiated from the catalog component of the same type,
    /// then takes the source item's label and values. Answers are not copied.
    pub fn copy(&mut self, id: &str) -> Result<ItemId, CoreError> {
        let source = &self.items[self.index_of(id)?];
        let (kind, label, values) = (source.kind, source.label.clone(), source.values.clone());

        let component = find_component(&self.catalog, kind)
            .cloned()
            .ok_or_else(|| CoreError::Validation(format!("No catalog component of type '{kind}'")))?;

        self.deselect(id);

        let new_id = self.next_item_id();
        let mut field = instantiate(&component, new_id.clone());
        field.label = label;
        field.values = values;

        self.items.push(field);
        self.sync();
        Ok(new_id)
    }

    /// Remove an item. Always clears the selection and resets the tab.
    pub fn remove_item(&mut self, id: &str) -> Option<Item> {
        let removed = self
            .index_of(id)
            .ok()
            .map(|index| self.items.remove(index));

        self.selected = None;
        self.selected_tab = 0;
        self.sync();
        removed
    }

    /// Select an item, replacing any previous selection.
    pub fn select(&mut self, id: &str) -> Result<(), CoreError> {
        self.index_of(id)?;
        self.selected = Some(id.to_string());
        Ok(())
    }

    /// Clear the selection if `id` is the selected item.
    pub fn deselect(&mut self, id: &str) {
        if self.is_selected(id) {
            self.selected = None;
        }
    }

    // ---- field edits ----

    /// Change an item's label and/or values.
    pub fn update_item(
        &mut self,
        id: &str,
        label: Option<String>,
        values: Option<String>,
    ) -> Result<(), CoreError> {
        let index = self.index_of(id)?;
        let item = &mut self.items[index];
        if let Some(label) = label {
            item.label = label;
        }
        if let Some(values) = values {
            item.values = values;
        }
        self.sync();
        Ok(())
    }

    pub fn set_answer(&mut self, id: &str, answer: Option<String>) -> Result<(), CoreError> {
        let index = self.index_of(id)?;
        self.items[index].answer = answer;
        self.sync();
        Ok(())
    }

    /// Toggle a checkbox option in an item's answer.
    pub fn toggle_option(&mut self, id: &str, option: &str) -> Result<(), CoreError> {
        let index = self.index_of(id)?;
        self.items[index].toggle_option(option);
        self.sync();
        Ok(())
    }

    // ---- output ----

    /// Write the current template into the project draft.
    pub fn sync(&mut self) {
        self.project.template = Some(TemplateDraft {
            name: self.template_name.clone(),
            items: self.items.clone(),
        });
    }

    /// Items with dataset placeholders substituted. The live list is untouched.
    pub fn preview(&self) -> Vec<Item> {
        substitute_placeholders(&self.items, self.project.metadata.as_ref())
    }

    /// End the session: sync, store the draft in `cache`, and return it.
    pub fn close(mut self, cache: &dyn LocalCache) -> Result<ProjectDraft, CoreError> {
        self.sync();
        self.project.save(cache)?;
        Ok(self.project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::project::{DatasetMetadata, PROJECT_CACHE_KEY};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn editor() -> TemplateEditor {
        TemplateEditor::new(ProjectDraft::blank())
    }

    fn synced_ids(editor: &TemplateEditor) -> Vec<String> {
        editor
            .project()
            .template
            .as_ref()
            .unwrap()
            .items
            .iter()
            .map(|i| i.id_string.clone())
            .collect()
    }

    #[test]
    fn fresh_editor_generates_name() {
        let editor = editor();
        assert!(editor.template_name().starts_with("template_"));
        assert!(editor.items().is_empty());
        assert!(editor.project().template.is_none());
    }

    #[test]
    fn ids_strictly_increase_across_add_and_copy() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Label).unwrap();
        let b = editor.add_from_catalog(ComponentType::Checkbox).unwrap();
        let c = editor.copy(&a).unwrap();
        let d = editor.copy(&c).unwrap();
        assert_eq!(vec![a, b, c, d], vec!["item1", "item2", "item3", "item4"]);
        for item in editor.items() {
            assert_eq!(item.name, item.id_string);
        }
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Image).unwrap();
        editor.remove_item(&a);
        let b = editor.add_from_catalog(ComponentType::Image).unwrap();
        assert_eq!(b, "item2");
    }

    #[test]
    fn every_mutation_syncs_into_project() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Radio).unwrap();
        assert_eq!(synced_ids(&editor), vec!["item1"]);
        editor.copy(&a).unwrap();
        assert_eq!(synced_ids(&editor), vec!["item1", "item2"]);
        editor.remove_item(&a);
        assert_eq!(synced_ids(&editor), vec!["item2"]);
        let template = editor.project().template.as_ref().unwrap();
        assert_eq!(template.name, editor.template_name());
    }

    #[test]
    fn copy_reapplies_label_and_values_from_source() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Select).unwrap();
        editor
            .update_item(&a, Some("Pick a colour".into()), Some("red,green".into()))
            .unwrap();
        editor.set_answer(&a, Some("red".into())).unwrap();

        let b = editor.copy(&a).unwrap();
        let copy = editor.item(&b).unwrap();
        assert_eq!(copy.kind, ComponentType::Select);
        assert_eq!(copy.label, "Pick a colour");
        assert_eq!(copy.values, "red,green");
        assert_eq!(copy.icon, "list");
        assert!(copy.answer.is_none());
    }

    #[test]
    fn copy_deselects_the_source() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Label).unwrap();
        editor.select(&a).unwrap();
        editor.copy(&a).unwrap();
        assert!(editor.selected().is_none());
    }

    #[test]
    fn copy_without_catalog_entry_fails_cleanly() {
        let catalog = crate::component::catalog();
        let label = find_component(&catalog, ComponentType::Label).unwrap().clone();
        let mut editor = TemplateEditor::with_catalog(ProjectDraft::blank(), vec![label.clone()]);
        let mut foreign = label.clone();
        foreign.kind = ComponentType::Audio;
        let a = editor.add_component(&foreign);
        editor.select(&a).unwrap();

        assert_matches!(editor.copy(&a), Err(CoreError::Validation(_)));
        assert_eq!(editor.items().len(), 1);
        assert!(editor.is_selected(&a));
        assert_eq!(editor.add_component(&label), "item2");
    }

    #[test]
    fn single_selection() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Label).unwrap();
        let b = editor.add_from_catalog(ComponentType::Label).unwrap();
        editor.select(&a).unwrap();
        editor.select(&b).unwrap();
        assert!(!editor.is_selected(&a));
        assert!(editor.is_selected(&b));
        assert_eq!(editor.selected().unwrap().id_string, b);
    }

    #[test]
    fn deselect_only_clears_the_selected_item() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Label).unwrap();
        let b = editor.add_from_catalog(ComponentType::Label).unwrap();
        editor.select(&a).unwrap();
        editor.deselect(&b);
        assert!(editor.is_selected(&a));
        editor.deselect(&a);
        assert!(editor.selected().is_none());
    }

    #[test]
    fn add_clears_selection() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Label).unwrap();
        editor.select(&a).unwrap();
        editor.add_from_catalog(ComponentType::Label).unwrap();
        assert!(editor.selected().is_none());
    }

    #[test]
    fn select_unknown_item_fails() {
        let mut editor = editor();
        assert_matches!(editor.select("item9"), Err(CoreError::ItemNotFound(id)) if id == "item9");
    }

    #[test]
    fn remove_drops_exactly_one_and_clears_selection() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Label).unwrap();
        let b = editor.add_from_catalog(ComponentType::Label).unwrap();
        editor.select(&b).unwrap();
        editor.set_selected_tab(2);

        let removed = editor.remove_item(&a).unwrap();
        assert_eq!(removed.id_string, a);
        assert_eq!(editor.items().len(), 1);
        assert!(editor.selected().is_none());
        assert_eq!(editor.selected_tab(), 0);
    }

    #[test]
    fn removing_unknown_item_keeps_list() {
        let mut editor = editor();
        editor.add_from_catalog(ComponentType::Label).unwrap();
        assert!(editor.remove_item("item42").is_none());
        assert_eq!(editor.items().len(), 1);
    }

    #[test]
    fn toggle_option_through_editor() {
        let mut editor = editor();
        let a = editor.add_from_catalog(ComponentType::Checkbox).unwrap();
        editor.toggle_option(&a, "Option 1").unwrap();
        editor.toggle_option(&a, "Option 3").unwrap();
        assert_eq!(editor.item(&a).unwrap().answer.as_deref(), Some("Option 1,Option 3"));
    }

    #[test]
    fn preview_substitutes_dataset_values() {
        let draft = ProjectDraft {
            metadata: Some(DatasetMetadata {
                id: Some(1),
                column_headers: vec!["{species}".into()],
                first: serde_json::from_value(json!({"species": "Heron"})).unwrap(),
            }),
            ..ProjectDraft::blank()
        };
        let mut editor = TemplateEditor::new(draft);
        let a = editor.add_from_catalog(ComponentType::Label).unwrap();
        editor.update_item(&a, Some("Is this a {species}?".into()), None).unwrap();

        assert_eq!(editor.preview()[0].label, "Is this a Heron?");
        assert_eq!(editor.item(&a).unwrap().label, "Is this a {species}?");
    }

    #[test]
    fn close_writes_draft_to_cache_and_reopen_restores() {
        let cache = MemoryCache::new();
        let mut editor = TemplateEditor::open(&cache).unwrap();
        let name = editor.template_name().to_string();
        let a = editor.add_from_catalog(ComponentType::TextArea).unwrap();
        editor.add_from_catalog(ComponentType::Audio).unwrap();
        editor.select(&a).unwrap();
        editor.close(&cache).unwrap();

        let cached = cache.get(PROJECT_CACHE_KEY).unwrap().unwrap();
        assert_eq!(cached["template"]["name"], name.as_str());
        assert_eq!(cached["template"]["items"].as_array().unwrap().len(), 2);

        let mut reopened = TemplateEditor::open(&cache).unwrap();
        assert_eq!(reopened.template_name(), name);
        assert_eq!(reopened.items().len(), 2);
        assert!(reopened.selected().is_none());
        assert_eq!(reopened.add_from_catalog(ComponentType::Label).unwrap(), "item3");
    }

    #[test]
    fn reopening_cached_items_with_selection_flag() {
        let cache = MemoryCache::new();
        cache
            .set(
                PROJECT_CACHE_KEY,
                json!({
                    "template": {
                        "name": "",
                        "items": [{
                            "id_string": "item7", "name": "item7", "type": "label",
                            "label": "Read this", "values": "dummy", "isSelected": true
                        }]
                    }
                }),
            )
            .unwrap();
        let mut editor = TemplateEditor::open(&cache).unwrap();
        assert!(editor.template_name().starts_with("template_"));
        assert!(editor.selected().is_none());
        assert_eq!(editor.copy("item7").unwrap(), "item8");
    }
}
