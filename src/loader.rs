use anyhow::Result;
use indexmap::IndexMap;
use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::registry::Registry;
use crate::types::{Definition, Value};

/// Load plain values from definition files (.toml or .json).
///
/// Each top-level key becomes an identifier whose value is the entry
/// converted to a `serde_json::Value`.
pub fn load_values(
    definition_files: &[PathBuf], // .toml and .json files
) -> Result<IndexMap<String, Value>> {
    let mut values = IndexMap::new();

    for path in definition_files {
        for (name, value) in parse_definition_file(path)? {
            // Collision detection - ensure unique names across all files
            if values.contains_key(&name) {
                return Err(anyhow::anyhow!("Duplicate definition name: '{name}'"));
            }
            let value: Value = Arc::new(value);
            values.insert(name, value);
        }
    }
    Ok(values)
}

fn parse_definition_file(path: &Path) -> Result<serde_json::Map<String, serde_json::Value>> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("File without extension: {}", path.display()))?;

    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {e}", path.display()))?;

    match extension {
        "toml" => parse_toml(&content, path),
        "json" => parse_json(&content, path),
        _ => Err(anyhow::anyhow!("Unsupported file type: {}", path.display())),
    }
}

fn parse_toml(content: &str, path: &Path) -> Result<serde_json::Map<String, serde_json::Value>> {
    let table: toml::Table = toml::from_str(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse '{}': {e}", path.display()))?;
    Ok(convert_toml_table_to_json_map(&table))
}

fn parse_json(content: &str, path: &Path) -> Result<serde_json::Map<String, serde_json::Value>> {
    let doc: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse '{}': {e}", path.display()))?;
    match doc {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(anyhow::anyhow!(
            "JSON file must contain an object at root level: {}",
            path.display()
        )),
    }
}

fn convert_toml_table_to_json_map(
    table: &toml::map::Map<String, toml::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    table
        .iter()
        .map(|(key, value)| (key.clone(), convert_toml_value_to_json(value)))
        .collect()
}

fn convert_toml_value_to_json(value: &toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(i) => serde_json::Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(convert_toml_value_to_json).collect())
        }
        toml::Value::Table(table) => {
            serde_json::Value::Object(convert_toml_table_to_json_map(table))
        }
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
    }
}

/// Builder for constructing a Registry
pub struct RegistryBuilder {
    paths: Vec<PathBuf>,
    definitions: Vec<(String, Definition)>,
}

impl RegistryBuilder {
    pub(crate) fn new() -> Self {
        Self {
            paths: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// Load plain values from a file (.toml or .json)
    pub fn load_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Add a plain value, applied after all loaded files
    pub fn with_value<T: Any + Send + Sync>(self, id: impl Into<String>, value: T) -> Self {
        self.with_definition(id, Definition::plain(value))
    }

    /// Add a definition, applied after all loaded files
    pub fn with_definition(mut self, id: impl Into<String>, definition: Definition) -> Self {
        self.definitions.push((id.into(), definition));
        self
    }

    /// Build the Registry from all loaded files and added definitions
    pub fn build(self) -> Result<Registry> {
        let values = load_values(&self.paths)?;
        tracing::debug!(
            files = self.paths.len(),
            values = values.len(),
            "loaded definition files"
        );
        let mut registry = Registry::with_values(values);
        for (id, definition) in self.definitions {
            registry.set(id, definition);
        }
        Ok(registry)
    }
}
