//! JSON encoding strategy for endpoint payloads.
//!
//! Handlers ask the service graph for "the JSON codec" and never name an
//! implementation, so the wire format can be swapped through `codec.kind`.

pub mod json;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::repository::{SchemaEntry, Subject};

pub use json::SerdeJsonCodec;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("property `{0}` must be a string, number or boolean")]
    NonScalarProperty(String),
}

/// Renders repository values as JSON documents and reads property maps back.
pub trait JsonCodec: Send + Sync {
    fn subject_names_to_json(&self, subjects: &[Subject]) -> String;

    fn subjects_to_json(&self, subjects: &[Subject]) -> String;

    fn entries_to_json(&self, entries: &[SchemaEntry]) -> String;

    fn entry_to_json(&self, entry: &SchemaEntry) -> String;

    fn properties_to_json(&self, properties: &BTreeMap<String, String>) -> String;

    /// Parse a flat JSON object. Scalars are stringified; an empty body is an
    /// empty map.
    fn properties_from_json(&self, body: &str) -> Result<BTreeMap<String, String>, CodecError>;
}
