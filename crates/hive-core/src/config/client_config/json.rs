//! JSON serializer for client configuration files.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::fs::atomic_write;

/// JSON configuration file serializer.
///
/// With `tolerate_comments`, `//` and `/* */` comments and trailing commas are
/// accepted on load. [`JsonSerializer::save`] drops them, so comment-tolerant
/// files are edited through `jsonc::insert_entry` instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer {
    tolerate_comments: bool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer for JSON-with-comments files (VS Code family).
    pub fn jsonc() -> Self {
        Self {
            tolerate_comments: true,
        }
    }

    /// Load a configuration file as a JSON object.
    ///
    /// A missing or blank file yields an empty map.
    pub fn load(&self, path: &Path) -> Result<Map<String, Value>> {
        let content = self.read(path)?;
        self.parse(&content)
            .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
    }

    /// Raw file contents; a missing file reads as empty.
    pub fn read(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Ok(String::new());
        }
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))
    }

    pub fn tolerates_comments(&self) -> bool {
        self.tolerate_comments
    }

    pub fn parse(&self, content: &str) -> Result<Map<String, Value>> {
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        let value: Value = if self.tolerate_comments {
            serde_json::from_str(&strip_jsonc(content))?
        } else {
            serde_json::from_str(content)?
        };
        match value {
            Value::Object(map) => Ok(map),
            _ => anyhow::bail!("Expected JSON object at root"),
        }
    }

    /// Atomically replace `path` with the pretty-printed map.
    pub fn save(&self, path: &Path, map: &Map<String, Value>) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(map).context("Failed to serialize JSON config")?;
        bytes.push(b'\n');
        atomic_write(path, &bytes)
    }
}

/// Remove comments and trailing commas, leaving string literals untouched.
fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    remove_trailing_commas(&out)
}

fn remove_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for (idx, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[idx + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}
