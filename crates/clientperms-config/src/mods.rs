use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

/// File name of the supported-mods document inside a data directory.
pub const MODS_FILE_NAME: &str = "mods.yml";

/// Supported-mods document stored in `mods.yml`.
///
/// ```yaml
/// mods:
///   - worldeditcui
///   - minimap
/// versions:
///   minimap: 2.5
/// ```
///
/// Keys other than `mods` and `versions` are carried through untouched so a
/// rewrite does not discard anything an operator added by hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModsFile {
    /// Supported mod identifiers in insertion order.
    #[serde(default, deserialize_with = "lenient_mods")]
    pub mods: Vec<String>,
    /// Minimum client version per mod. Only constrained mods appear here.
    #[serde(
        default,
        deserialize_with = "lenient_versions",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub versions: BTreeMap<String, f32>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ModsFile {
    /// Parse a mods document. Blank input is an empty document.
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(input).context("failed to parse mods YAML")
    }

    /// Load a mods document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read mods file at {}", path.display()))?;

        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid mods file at {}", path.display()))
    }

    /// Render the document as YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to render mods YAML")
    }
}

// Both sections are read entry by entry so one hand-edited typo costs a
// single entry, not the whole document.

fn lenient_mods<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Sequence(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items.iter().filter_map(scalar_string).collect())
}

fn lenient_versions<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Mapping(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .iter()
        .filter_map(|(key, value)| Some((scalar_string(key)?, version_number(value))))
        .collect())
}

/// Scalars as their string form; null and collections have none.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers and numeric strings; anything else is unconstrained.
fn version_number(value: &Value) -> f32 {
    match value {
        Value::Number(n) => n.as_f64().map_or(0.0, |v| v as f32),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
