//! `serde_json` backed codec.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::codec::{CodecError, JsonCodec};
use crate::repository::{SchemaEntry, Subject};

/// Compact or pretty-printed JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonCodec {
    pretty: bool,
}

impl SerdeJsonCodec {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        // Strings, maps keyed by strings and derived structs always serialize.
        rendered.unwrap_or_else(|e| {
            tracing::error!(error = %e, "JSON encoding failed");
            "null".to_string()
        })
    }
}

impl JsonCodec for SerdeJsonCodec {
    fn subject_names_to_json(&self, subjects: &[Subject]) -> String {
        let names: Vec<&str> = subjects.iter().map(|s| s.name.as_str()).collect();
        self.render(&names)
    }

    fn subjects_to_json(&self, subjects: &[Subject]) -> String {
        self.render(subjects)
    }

    fn entries_to_json(&self, entries: &[SchemaEntry]) -> String {
        self.render(entries)
    }

    fn entry_to_json(&self, entry: &SchemaEntry) -> String {
        self.render(entry)
    }

    fn properties_to_json(&self, properties: &BTreeMap<String, String>) -> String {
        self.render(properties)
    }

    fn properties_from_json(&self, body: &str) -> Result<BTreeMap<String, String>, CodecError> {
        if body.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let parsed: serde_json::Map<String, Value> = serde_json::from_str(body)?;
        parsed
            .into_iter()
            .map(|(k, v)| {
                let flat = match v {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return Err(CodecError::NonScalarProperty(k)),
                };
                Ok((k, flat))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SubjectConfig;

    #[test]
    fn entries_render_as_objects() {
        let codec = SerdeJsonCodec::compact();
        let out = codec.entries_to_json(&[SchemaEntry {
            id: "0".into(),
            schema: "\"int\"".into(),
        }]);
        assert_eq!(out, r#"[{"id":"0","schema":"\"int\""}]"#);
    }

    #[test]
    fn subjects_render_with_config() {
        let codec = SerdeJsonCodec::compact();
        let subjects = vec![Subject {
            name: "s".into(),
            config: SubjectConfig::default(),
        }];
        assert_eq!(codec.subject_names_to_json(&subjects), r#"["s"]"#);
        assert_eq!(codec.subjects_to_json(&subjects), r#"[{"name":"s","config":{}}]"#);
    }

    #[test]
    fn properties_parse_scalars() {
        let codec = SerdeJsonCodec::compact();
        let props = codec
            .properties_from_json(r#"{"a":"x","n":3,"b":true}"#)
            .unwrap();
        assert_eq!(props["a"], "x");
        assert_eq!(props["n"], "3");
        assert_eq!(props["b"], "true");
        assert!(codec.properties_from_json("  ").unwrap().is_empty());
        assert!(matches!(
            codec.properties_from_json(r#"{"a":[1]}"#),
            Err(CodecError::NonScalarProperty(_))
        ));
        assert!(matches!(codec.properties_from_json("{"), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn pretty_output_spans_lines() {
        let props = BTreeMap::from([("k".to_string(), "v".to_string())]);
        assert!(SerdeJsonCodec::pretty().properties_to_json(&props).contains('\n'));
    }
}
