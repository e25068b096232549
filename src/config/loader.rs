//! Configuration loading from disk.
//!
//! Files are TOML. Nested tables flatten into dotted keys so that
//!
//! ```toml
//! [logging.bridge]
//! enabled = true
//! ```
//!
//! yields the override `logging.bridge.enabled = "true"`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use toml::Value;

use crate::config::error::ConfigError;

/// Read a TOML file into a flat override map.
pub fn load_overrides(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut out = BTreeMap::new();
    flatten("", &table, &mut out)?;

    tracing::debug!(path = %path.display(), keys = out.len(), "Config file loaded");
    Ok(out)
}

fn flatten(
    prefix: &str,
    table: &toml::Table,
    out: &mut BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    for (k, v) in table {
        let key = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        let flat = match v {
            Value::Table(inner) => {
                flatten(&key, inner, out)?;
                continue;
            }
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Datetime(d) => d.to_string(),
            Value::Array(_) => {
                return Err(ConfigError::UnsupportedValue { key, kind: "array" });
            }
        };
        out.insert(key, flat);
    }
    Ok(())
}
