//! Navigation helpers for the `website.sidebar` block of a generated site document.

use serde_yaml::{Mapping, Number, Value};

use crate::document::Document;

pub const WEBSITE_KEY: &str = "website";
pub const SIDEBAR_KEY: &str = "sidebar";
pub const CONTENTS_KEY: &str = "contents";
pub const SECTION_KEY: &str = "section";
pub const COLLAPSE_LEVEL_KEY: &str = "collapse-level";
pub const TEXT_KEY: &str = "text";
pub const HREF_KEY: &str = "href";

/// Expansion depth written by both hooks.
pub const COLLAPSE_LEVEL: u64 = 3;

pub const TOP_LABEL: &str = "トップ";
pub const TOP_HREF: &str = "index.qmd";

pub const JAPANESE_SECTION_TITLE: &str = "ハイパーグルーヴ理論";
pub const ENGLISH_SECTION_TITLE: &str = "Hypergroove Theory";

pub const DEFAULT_LANG_ID: &str = "ja";

/// Walk `website` -> `sidebar`, yielding `None` unless both are mappings.
pub fn sidebar_mut(document: &mut Document) -> Option<&mut Mapping> {
    document
        .get_mut(WEBSITE_KEY)?
        .as_mapping_mut()?
        .get_mut(SIDEBAR_KEY)?
        .as_mapping_mut()
}

pub fn sidebar(document: &Document) -> Option<&Mapping> {
    document
        .get(WEBSITE_KEY)?
        .as_mapping()?
        .get(SIDEBAR_KEY)?
        .as_mapping()
}

pub fn contents(sidebar: &Mapping) -> Option<&Vec<Value>> {
    sidebar.get(CONTENTS_KEY)?.as_sequence()
}

pub fn set_collapse_level(sidebar: &mut Mapping) {
    sidebar.insert(
        Value::from(COLLAPSE_LEVEL_KEY),
        Value::Number(Number::from(COLLAPSE_LEVEL)),
    );
}

/// Whether `entry` is the link back to the site home page.
pub fn is_top_link(entry: &Value) -> bool {
    let Some(fields) = entry.as_mapping() else {
        return false;
    };
    if field_text(fields, TEXT_KEY).contains(TOP_LABEL) {
        return true;
    }
    field_text(fields, HREF_KEY).contains(TOP_HREF)
}

pub fn section_title_for(lang_id: &str) -> &'static str {
    if lang_id.to_lowercase().starts_with("ja") {
        JAPANESE_SECTION_TITLE
    } else {
        ENGLISH_SECTION_TITLE
    }
}

pub fn section_wrapper(title: &str, entries: Vec<Value>) -> Value {
    let mut wrapper = Mapping::new();
    wrapper.insert(Value::from(SECTION_KEY), Value::from(title));
    wrapper.insert(Value::from(CONTENTS_KEY), Value::Sequence(entries));
    Value::Mapping(wrapper)
}

// Scalars are coerced to text. Nested values contribute every key and scalar they hold.
fn field_text(fields: &Mapping, key: &str) -> String {
    let mut text = String::new();
    if let Some(value) = fields.get(key) {
        push_scalar_text(value, &mut text);
    }
    text
}

fn push_scalar_text(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::String(text) => out.push_str(text),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Sequence(items) => {
            for item in items {
                push_scalar_text(item, out);
                out.push(' ');
            }
        }
        Value::Mapping(entries) => {
            for (entry_key, entry_value) in entries {
                push_scalar_text(entry_key, out);
                out.push(' ');
                push_scalar_text(entry_value, out);
                out.push(' ');
            }
        }
        Value::Tagged(tagged) => push_scalar_text(&tagged.value, out),
    }
}
