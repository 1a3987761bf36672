//! Task preview with dataset placeholders filled in.
//!
//! Item labels and values may reference dataset columns with placeholders
//! such as `{city}`. A preview replaces every placeholder with the value
//! from the dataset's first row so the author sees a realistic task.

use serde_json::Value;

use crate::item::Item;
use crate::project::DatasetMetadata;

/// Column name inside a placeholder: the header without its first and last character.
fn column_name(header: &str) -> &str {
    let mut chars = header.char_indices();
    let start = chars.next().map(|(i, c)| i + c.len_utf8()).unwrap_or(0);
    let end = header.char_indices().last().map(|(i, _)| i).unwrap_or(0);
    if start >= end {
        ""
    } else {
        &header[start..end]
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Copy `items` with every dataset placeholder substituted.
///
/// Without metadata the copy is returned unchanged. Empty headers are
/// skipped.
pub fn substitute_placeholders(items: &[Item], metadata: Option<&DatasetMetadata>) -> Vec<Item> {
    let mut preview = items.to_vec();
    let Some(metadata) = metadata else {
        return preview;
    };

    for item in &mut preview {
        for header in metadata.column_headers.iter().filter(|h| !h.is_empty()) {
            let replacement = cell_text(metadata.first.get(column_name(header)));
            item.label = item.label.replace(header.as_str(), &replacement);
            item.values = item.values.replace(header.as_str(), &replacement);
        }
    }
    preview
}
