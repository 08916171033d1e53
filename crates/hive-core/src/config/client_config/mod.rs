//! Reading and writing third-party client configuration files.
//!
//! Client files are read as `serde_json::Map<String, Value>`. The MCP
//! servers map sits at a layout-specific nested path; everything outside it
//! is carried through a write untouched. Comment-tolerant files are edited
//! in place so user comments survive.

mod json;
mod jsonc;
mod upsert;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::client::ClientConfigFile;

pub use json::JsonSerializer;
pub use upsert::{ConfigUpserter, UpsertStatus};

/// Serializer matching a located file's layout.
pub fn serializer_for(file: &ClientConfigFile) -> JsonSerializer {
    if file.layout.jsonc {
        JsonSerializer::jsonc()
    } else {
        JsonSerializer::new()
    }
}

/// Extract a nested map from a root map at the given path.
pub(crate) fn extract_map_at_path(
    root: &Map<String, Value>,
    path: &[&str],
) -> Result<Map<String, Value>> {
    if path.is_empty() {
        anyhow::bail!("Path for reading entries cannot be empty");
    }
    let mut current = root;
    for (idx, segment) in path.iter().enumerate() {
        let value = match current.get(*segment) {
            Some(value) => value,
            None => return Ok(Map::new()),
        };
        match value {
            Value::Object(map) if idx == path.len() - 1 => return Ok(map.clone()),
            Value::Object(map) => current = map,
            Value::Null => return Ok(Map::new()),
            _ => anyhow::bail!("Expected '{}' to be an object", segment),
        }
    }
    Ok(Map::new())
}

/// Set a map at a nested path within a root map, creating parents as needed.
pub(crate) fn set_map_at_path(
    root: &mut Map<String, Value>,
    path: &[&str],
    map: Map<String, Value>,
) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        anyhow::bail!("Path for writing entries cannot be empty");
    };
    let mut current = root;
    for segment in parents {
        let next = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if next.is_null() {
            *next = Value::Object(Map::new());
        }
        match next {
            Value::Object(m) => current = m,
            _ => anyhow::bail!("Expected '{}' to be an object", segment),
        }
    }
    current.insert(last.to_string(), Value::Object(map));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn extract_missing_section_is_empty() {
        let root = obj(json!({ "theme": "dark" }));
        assert!(extract_map_at_path(&root, &["mcp", "servers"]).unwrap().is_empty());
    }

    #[test]
    fn extract_null_section_is_empty() {
        let root = obj(json!({ "mcpServers": null }));
        assert!(extract_map_at_path(&root, &["mcpServers"]).unwrap().is_empty());
    }

    #[test]
    fn extract_nested_section() {
        let root = obj(json!({ "mcp": { "servers": { "a": { "url": "u" } } } }));
        let servers = extract_map_at_path(&root, &["mcp", "servers"]).unwrap();
        assert_eq!(servers["a"], json!({ "url": "u" }));
    }

    #[test]
    fn extract_rejects_non_object_section() {
        let root = obj(json!({ "mcpServers": [1] }));
        let err = extract_map_at_path(&root, &["mcpServers"]).unwrap_err();
        assert!(err.to_string().contains("'mcpServers'"));
    }

    #[test]
    fn set_creates_parents_and_keeps_siblings() {
        let mut root = obj(json!({ "editor.fontSize": 14, "mcp": { "inputs": [] } }));
        let servers = obj(json!({ "a": { "url": "u" } }));

        set_map_at_path(&mut root, &["mcp", "servers"], servers).unwrap();

        assert_eq!(
            Value::Object(root),
            json!({
                "editor.fontSize": 14,
                "mcp": { "inputs": [], "servers": { "a": { "url": "u" } } }
            })
        );
    }

    #[test]
    fn set_rejects_scalar_parent() {
        let mut root = obj(json!({ "mcp": "off" }));
        assert!(set_map_at_path(&mut root, &["mcp", "servers"], Map::new()).is_err());
    }

    #[test]
    fn servers_from_jsonc_settings() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(
            &path,
            "{\n  // servers\n  \"mcp\": { \"servers\": { \"a\": { \"url\": \"u\" }, } },\n}\n",
        )
        .unwrap();
        let file = ClientConfigFile::new(
            crate::client::ClientType::VSCode,
            path,
            crate::client::ConfigLayout::VSCODE_SETTINGS,
        );

        let root = serializer_for(&file).load(&file.path).unwrap();
        let servers = extract_map_at_path(&root, file.layout.servers_path).unwrap();
        assert_eq!(servers.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn empty_paths_are_rejected() {
        let mut root = Map::new();
        assert!(extract_map_at_path(&root, &[]).is_err());
        assert!(set_map_at_path(&mut root, &[], Map::new()).is_err());
    }
}
