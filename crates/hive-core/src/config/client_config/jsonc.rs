//! In-place edits of JSON-with-comments files.
//!
//! The VS Code family keeps user settings next to the MCP servers map, so an
//! insert goes through a concrete syntax tree instead of a parse/serialize
//! round trip. Comments, key order and indentation outside the new entry are
//! left as the user wrote them.

use anyhow::Result;
use jsonc_parser::ParseOptions;
use jsonc_parser::cst::{CstInputValue, CstRootNode};
use serde_json::Value;

/// Insert `name: entry` into the object at `servers_path` of `content`.
///
/// Missing or `null` objects along the path are created. Callers check the
/// path's shape and the absence of `name` beforehand.
pub(crate) fn insert_entry(
    content: &str,
    servers_path: &[&str],
    name: &str,
    entry: &Value,
) -> Result<String> {
    let source = if content.trim().is_empty() {
        "{}\n"
    } else {
        content
    };
    let root = CstRootNode::parse(source, &ParseOptions::default())
        .map_err(|err| anyhow::anyhow!("Failed to parse JSONC config: {err}"))?;

    let mut object = root.object_value_or_set();
    for segment in servers_path {
        object = object.object_value_or_set(segment);
    }
    object.append(name, to_input(entry));

    Ok(root.to_string())
}

fn to_input(value: &Value) -> CstInputValue {
    match value {
        Value::Null => CstInputValue::Null,
        Value::Bool(b) => CstInputValue::Bool(*b),
        Value::Number(n) => CstInputValue::Number(n.to_string()),
        Value::String(s) => CstInputValue::String(s.clone()),
        Value::Array(items) => CstInputValue::Array(items.iter().map(to_input).collect()),
        Value::Object(map) => CstInputValue::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), to_input(value)))
                .collect(),
        ),
    }
}
