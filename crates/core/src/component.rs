//! Template component catalog and render strategies.
//!
//! A [`Component`] is an immutable catalog entry describing one form-field
//! type. Editor items are instantiated from these entries (see
//! [`crate::item::instantiate`]). Rendering is a pair of pure functions
//! keyed by [`ComponentType`]: [`display_fragment`] produces the markup a
//! worker sees, [`editor_fragment`] produces the markup of the property
//! panel the author edits.
//!
//! This module has **zero I/O**. The fragments are plain strings; nothing
//! in this workspace interprets them.

use serde::{Deserialize, Serialize};

use crate::item::Item;

// ---------------------------------------------------------------------------
// Component type and role enums
// ---------------------------------------------------------------------------

/// The closed set of form-field types a template may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Label,
    Checkbox,
    Radio,
    Select,
    TextField,
    TextArea,
    Image,
    Audio,
}

impl ComponentType {
    /// All component types in catalog order.
    pub const ALL: [ComponentType; 8] = [
        Self::Label,
        Self::Checkbox,
        Self::Radio,
        Self::Select,
        Self::TextField,
        Self::TextArea,
        Self::Image,
        Self::Audio,
    ];

    /// Wire tag of the type, e.g. `"text_field"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::TextField => "text_field",
            Self::TextArea => "text_area",
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }

    /// Whether `values` holds a comma-separated option list.
    pub fn has_options(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio | Self::Select)
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a component only shows content or collects an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Display,
    Input,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A catalog entry: the template from which editor items are copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Form-field type tag.
    #[serde(rename = "type")]
    pub kind: ComponentType,
    /// Display name shown in the component palette.
    pub name: String,
    /// Material icon id.
    pub icon: String,
    /// Palette help text. Never copied onto items.
    pub description: String,
    /// Layout hint (`"column"` for every built-in component).
    pub layout: String,
    pub role: Role,
    pub data_source: Option<String>,
    /// Default label.
    pub label: String,
    /// Default values: options, a URL, or placeholder text depending on type.
    pub values: String,
}

const DEFAULT_OPTIONS: &str = "Option 1,Option 2,Option 3";
const QUESTION_LABEL: &str = "Add question here";

fn entry(
    kind: ComponentType,
    name: &str,
    icon: &str,
    description: &str,
    role: Role,
    label: &str,
    values: &str,
) -> Component {
    Component {
        kind,
        name: name.into(),
        icon: icon.into(),
        description: description.into(),
        layout: "column".into(),
        role,
        data_source: None,
        label: label.into(),
        values: values.into(),
    }
}

/// Return the built-in component catalog in palette order.
pub fn catalog() -> Vec<Component> {
    use ComponentType as T;

    vec![
        entry(
            T::Label,
            "Instructions",
            "format_size",
            "Use for static text: labels, headings, paragraphs",
            Role::Display,
            "Add instruction here",
            "dummy",
        ),
        entry(
            T::Checkbox,
            "Checkbox",
            "check_box",
            "Use for selecting multiple options",
            Role::Input,
            QUESTION_LABEL,
            DEFAULT_OPTIONS,
        ),
        entry(
            T::Radio,
            "Radio Button",
            "radio_button_checked",
            "Use when only one option needs to be selected",
            Role::Input,
            QUESTION_LABEL,
            DEFAULT_OPTIONS,
        ),
        entry(
            T::Select,
            "Select List",
            "list",
            "Use for selecting multiple options from a larger set",
            Role::Input,
            QUESTION_LABEL,
            DEFAULT_OPTIONS,
        ),
        entry(
            T::TextField,
            "Text Input",
            "text_format",
            "Use for short text input",
            Role::Input,
            QUESTION_LABEL,
            "Enter text here",
        ),
        entry(
            T::TextArea,
            "Text Area",
            "subject",
            "Use for longer text input",
            Role::Input,
            QUESTION_LABEL,
            "Enter text here",
        ),
        entry(
            T::Image,
            "Image",
            "photo",
            "A placeholder for the image",
            Role::Display,
            "Heading",
            "http://placehold.it/300x300?text=Image",
        ),
        entry(
            T::Audio,
            "Audio",
            "music_note",
            "A placeholder for the audio player",
            Role::Display,
            "Heading",
            "http://www.noiseaddicts.com/samples_1w72b820/3724.mp3",
        ),
    ]
}

/// Find the first catalog component of the given type.
pub fn find_component(catalog: &[Component], kind: ComponentType) -> Option<&Component> {
    catalog.iter().find(|c| c.kind == kind)
}

// ---------------------------------------------------------------------------
// Render strategies
// ---------------------------------------------------------------------------

/// Escape text for inclusion in markup content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn heading(label: &str) -> String {
    format!(r#"<h1 class="md-subhead">{}</h1>"#, escape(label))
}

/// Markup shown to a worker for `item`.
///
/// Option-bearing types expand `values` split on commas. Checkbox options
/// contained in the item's answer render as checked.
pub fn display_fragment(item: &Item) -> String {
    match item.kind {
        ComponentType::Label => heading(&item.label),
        ComponentType::Checkbox => {
            let chosen = item.chosen_options();
            let boxes: String = item
                .options()
                .iter()
                .map(|option| {
                    let opt = escape(option);
                    let checked = if chosen.contains(option) { " checked" } else { "" };
                    format!(
                        r#"<md-checkbox name="{opt}" tabindex="0" value="{opt}" aria-label="{opt}"{checked}><span>{opt}</span></md-checkbox>"#
                    )
                })
                .collect();
            format!(
                r#"{}<div layout="row" layout-wrap>{boxes}</div>"#,
                heading(&item.label)
            )
        }
        ComponentType::Radio => {
            let buttons: String = item
                .options()
                .iter()
                .map(|option| {
                    let opt = escape(option);
                    format!(
                        r#"<md-radio-button tabindex="0" role="radio" value="{opt}" aria-label="{opt}">{opt}</md-radio-button>"#
                    )
                })
                .collect();
            format!(
                r#"{}<md-radio-group tabindex="0" role="radiogroup" layout="row" layout-wrap>{buttons}</md-radio-group>"#,
                heading(&item.label)
            )
        }
        ComponentType::Select => {
            let options: String = item
                .options()
                .iter()
                .map(|option| {
                    let opt = escape(option);
                    format!(
                        r#"<md-option tabindex="0" value="{opt}" aria-label="{opt}">{opt}</md-option>"#
                    )
                })
                .collect();
            format!(
                r#"{}<div layout="row" layout-wrap flex><md-select aria-label="{}" flex>{options}</md-select></div>"#,
                heading(&item.label),
                escape(&item.label)
            )
        }
        ComponentType::TextField => format!(
            r#"<md-input-container md-no-float>{}<input type="text" tabindex="0" required aria-label="{}" placeholder="{}"></md-input-container>"#,
            heading(&item.label),
            escape(&item.label),
            escape(&item.values)
        ),
        ComponentType::TextArea => format!(
            r#"<md-input-container>{}<textarea tabindex="0" required aria-label="{}"></textarea></md-input-container>"#,
            heading(&item.label),
            escape(&item.label)
        ),
        ComponentType::Image => format!(
            r#"{}<img class="image-container" src="{}">"#,
            heading(&item.label),
            escape(&item.values)
        ),
        ComponentType::Audio => format!(
            r#"{}<audio class="audio-container" src="{}" controls style="margin-bottom:8px;"><p>Your browser does not support the <code>audio</code> element.</p></audio>"#,
            heading(&item.label),
            escape(&item.values)
        ),
    }
}

fn input_container(caption: &str, field: &str, value: &str, required: bool) -> String {
    let required = if required { " required" } else { "" };
    format!(
        r#"<md-input-container><label>{caption}</label><input name="{field}" value="{}"{required}></md-input-container>"#,
        escape(value)
    )
}

/// Markup of the property panel used to edit `item`.
pub fn editor_fragment(item: &Item) -> String {
    match item.kind {
        ComponentType::Label => format!(
            r#"<md-input-container><label>Instruction</label><textarea name="label">{}</textarea></md-input-container>"#,
            escape(&item.label)
        ),
        ComponentType::Checkbox | ComponentType::Radio | ComponentType::Select => {
            input_container("Question", "label", &item.label, false)
                + &input_container("Options (separated by comma)", "values", &item.values, true)
        }
        ComponentType::TextField | ComponentType::TextArea => {
            input_container("Question", "label", &item.label, true)
                + &input_container("Placeholder", "values", &item.values, false)
        }
        ComponentType::Image => {
            input_container("Heading", "label", &item.label, false)
                + &input_container("Image URL", "values", &item.values, true)
        }
        ComponentType::Audio => {
            input_container("Heading", "label", &item.label, false)
                + &input_container("Audio URL", "values", &item.values, true)
        }
    }
}

/// Compact single-element markup used for inline task listings.
pub fn compact_html(item: &Item, tab_index: u32) -> String {
    let layout = escape(&item.layout);
    let options = || item.options().into_iter().map(escape);
    match item.kind {
        ComponentType::Label => format!(
            r#"<p style="word-wrap:break-word">{}</p>"#,
            escape(&item.values)
        ),
        ComponentType::Image => format!(
            r#"<img class="image-container" src="{}"></img>"#,
            escape(&item.values)
        ),
        ComponentType::Radio => {
            let buttons: String = options()
                .map(|o| {
                    format!(r#"<md-radio-button tabindex="{tab_index}" value="{o}">{o}</md-radio-button>"#)
                })
                .collect();
            format!(r#"<md-radio-group class="template-item" layout="{layout}">{buttons}</md-radio-group>"#)
        }
        ComponentType::Checkbox => {
            let boxes: String = options()
                .map(|o| {
                    format!(r#"<div class="template-item"><md-checkbox tabindex="{tab_index}"> {o}</md-checkbox></div>"#)
                })
                .collect();
            format!(r#"<div layout="{layout}" layout-wrap>{boxes}</div>"#)
        }
        ComponentType::TextArea => format!(
            r#"<md-input-container><label>{}</label><textarea class="template-item" layout="{layout}" tabindex="{tab_index}"></textarea></md-input-container>"#,
            escape(&item.values)
        ),
        ComponentType::TextField => format!(
            r#"<md-input-container><label>{}</label><input type="text" class="template-item" layout="{layout}" tabindex="{tab_index}"/></md-input-container>"#,
            escape(&item.values)
        ),
        ComponentType::Select => {
            let opts: String = options()
                .map(|o| format!(r#"<md-option tabindex="{tab_index}" value="{o}">{o}</md-option>"#))
                .collect();
            format!(r#"<md-select class="template-item" layout="{layout}">{opts}</md-select>"#)
        }
        ComponentType::Audio => format!(
            r#"<audio src="{}" controls><p>Your browser does not support the <code>audio</code> element.</p></audio>"#,
            escape(&item.values)
        ),
    }
}
