//! Validators selectable by kind from configuration.

use std::sync::Arc;

use crate::repository::SchemaEntry;
use crate::validation::Validator;

/// Resolve a configured kind (`non-empty`, `json-syntax`, `max-bytes:<n>`).
pub fn from_kind(kind: &str) -> Option<Arc<dyn Validator>> {
    match kind.trim() {
        "non-empty" => Some(Arc::new(NonEmpty)),
        "json-syntax" => Some(Arc::new(JsonSyntax)),
        other => {
            let limit = other.strip_prefix("max-bytes:")?.trim().parse().ok()?;
            Some(Arc::new(MaxBytes(limit)))
        }
    }
}

/// Rejects blank schemas.
#[derive(Debug, Clone, Copy)]
pub struct NonEmpty;

impl Validator for NonEmpty {
    fn validate(&self, schema: &str, _history: &[SchemaEntry]) -> Result<(), String> {
        if schema.trim().is_empty() {
            return Err("schema is empty".to_string());
        }
        Ok(())
    }
}

/// Requires the schema text to parse as JSON.
#[derive(Debug, Clone, Copy)]
pub struct JsonSyntax;

impl Validator for JsonSyntax {
    fn validate(&self, schema: &str, _history: &[SchemaEntry]) -> Result<(), String> {
        serde_json::from_str::<serde_json::Value>(schema)
            .map(|_| ())
            .map_err(|e| format!("schema is not valid JSON: {e}"))
    }
}

/// Caps the schema size in bytes.
#[derive(Debug, Clone, Copy)]
pub struct MaxBytes(pub usize);

impl Validator for MaxBytes {
    fn validate(&self, schema: &str, _history: &[SchemaEntry]) -> Result<(), String> {
        if schema.len() > self.0 {
            return Err(format!("schema is {} bytes, limit is {}", schema.len(), self.0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_resolve() {
        assert!(from_kind("non-empty").is_some());
        assert!(from_kind(" json-syntax ").is_some());
        assert!(from_kind("max-bytes:10").is_some());
        assert!(from_kind("max-bytes:ten").is_none());
        assert!(from_kind("compatible").is_none());
    }

    #[test]
    fn builtins_reject_bad_schemas() {
        assert!(NonEmpty.validate("  ", &[]).is_err());
        assert!(NonEmpty.validate("x", &[]).is_ok());
        assert!(JsonSyntax.validate("{\"type\": \"int\"}", &[]).is_ok());
        assert!(JsonSyntax.validate("{oops", &[]).is_err());
        assert!(MaxBytes(3).validate("abcd", &[]).is_err());
        assert!(MaxBytes(4).validate("abcd", &[]).is_ok());
    }
}
