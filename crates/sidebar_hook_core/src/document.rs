use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};

/// A parsed site document. The root is always a mapping after loading.
pub type Document = Value;

pub fn empty_document() -> Document {
    Value::Mapping(Mapping::new())
}

/// Null roots (blank files, `~`) become an empty mapping so lookups stay safe.
pub fn normalize_root(document: Document) -> Document {
    match document {
        Value::Null => empty_document(),
        other => other,
    }
}

pub fn parse_yaml(content: &str) -> Result<Document> {
    if content.trim().is_empty() {
        return Ok(empty_document());
    }
    let parsed: Value = serde_yaml::from_str(content).context("invalid YAML document")?;
    Ok(normalize_root(parsed))
}

pub fn render_yaml(document: &Document) -> Result<String> {
    serde_yaml::to_string(document).context("failed to serialize YAML document")
}

/// Convert interchange JSON into a document, keeping object key order.
pub fn from_json(value: serde_json::Value) -> Result<Document> {
    if value.is_null() {
        return Ok(empty_document());
    }
    let converted = serde_yaml::to_value(value).context("failed to convert JSON document")?;
    Ok(normalize_root(converted))
}

pub fn render_json(document: &Document) -> Result<String> {
    serde_json::to_string_pretty(document).context("failed to serialize JSON document")
}
