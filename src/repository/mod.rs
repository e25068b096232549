//! Schema repository abstraction.
//!
//! # Data Flow
//! ```text
//! endpoint handlers
//!     → Repository (trait object shared by the service graph)
//!     → memory.rs (subjects in a concurrent map, entries per subject)
//!     → ValidatorFactory (consulted on every schema registration)
//! ```
//!
//! # Design Decisions
//! - Subjects and schema entries are identified by strings on the wire
//! - Registering an existing subject or schema returns what is already stored
//! - Entry ids are assigned per subject, in registration order

pub mod memory;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults::SUBJECT_VALIDATORS;
use crate::validation::ValidatorError;

pub use memory::InMemoryRepository;

/// One registered schema within a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub id: String,
    pub schema: String,
}

/// Per-subject properties, fixed when the subject is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectConfig {
    properties: BTreeMap<String, String>,
}

impl SubjectConfig {
    pub fn from_properties(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    /// Validator names from the `schema-repo.validators` property.
    pub fn validators(&self) -> Vec<String> {
        self.properties
            .get(SUBJECT_VALIDATORS)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

/// A named container of schema entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub name: String,
    pub config: SubjectConfig,
}

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("subject `{0}` does not exist")]
    SubjectNotFound(String),

    #[error("invalid subject name `{0}`")]
    InvalidSubjectName(String),

    #[error("schema rejected for subject `{subject}` by validator `{validator}`: {reason}")]
    Validation {
        subject: String,
        validator: String,
        reason: String,
    },

    #[error(transparent)]
    Validator(#[from] ValidatorError),
}

/// Storage for subjects and their schema entries.
///
/// One instance is shared by every handler of a server, so implementations
/// must be safe for concurrent use.
pub trait Repository: Send + Sync {
    /// Create `name`, or return the existing subject unchanged.
    fn register_subject(&self, name: &str, config: SubjectConfig) -> Result<Subject, RepositoryError>;

    fn subject(&self, name: &str) -> Option<Subject>;

    /// All subjects, sorted by name.
    fn subjects(&self) -> Vec<Subject>;

    /// Validate and store `schema`, or return the entry already holding it.
    fn register_schema(&self, subject: &str, schema: &str) -> Result<SchemaEntry, RepositoryError>;

    /// Register only when the subject's latest id equals `latest_id`
    /// (`None` meaning the subject has no entries). Returns `Ok(None)` when
    /// the precondition does not hold.
    fn register_schema_if_latest(
        &self,
        subject: &str,
        schema: &str,
        latest_id: Option<&str>,
    ) -> Result<Option<SchemaEntry>, RepositoryError>;

    fn lookup_by_id(&self, subject: &str, id: &str) -> Result<Option<SchemaEntry>, RepositoryError>;

    fn lookup_by_schema(&self, subject: &str, schema: &str) -> Result<Option<SchemaEntry>, RepositoryError>;

    fn latest(&self, subject: &str) -> Result<Option<SchemaEntry>, RepositoryError>;

    /// Entries newest first.
    fn all_entries(&self, subject: &str) -> Result<Vec<SchemaEntry>, RepositoryError>;
}

/// Subject names travel as single path segments.
pub fn is_valid_subject_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.chars().any(|c| c == '/' || c.is_control())
}
