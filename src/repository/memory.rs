//! In-memory repository.

use std::sync::{Arc, RwLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::repository::{
    is_valid_subject_name, Repository, RepositoryError, SchemaEntry, Subject, SubjectConfig,
};
use crate::validation::ValidatorFactory;

struct SubjectState {
    subject: Subject,
    /// Oldest first; an entry's id is its index.
    entries: RwLock<Vec<SchemaEntry>>,
}

/// A [`Repository`] that keeps everything in process memory.
pub struct InMemoryRepository {
    subjects: DashMap<String, Arc<SubjectState>>,
    validators: Arc<ValidatorFactory>,
}

impl InMemoryRepository {
    pub fn new(validators: Arc<ValidatorFactory>) -> Self {
        Self {
            subjects: DashMap::new(),
            validators,
        }
    }

    fn state(&self, subject: &str) -> Result<Arc<SubjectState>, RepositoryError> {
        self.subjects
            .get(subject)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| RepositoryError::SubjectNotFound(subject.to_owned()))
    }

    /// Store `schema` into `entries`, which the caller holds write-locked.
    fn append(
        &self,
        state: &SubjectState,
        entries: &mut Vec<SchemaEntry>,
        schema: &str,
    ) -> Result<SchemaEntry, RepositoryError> {
        if let Some(existing) = entries.iter().find(|e| e.schema == schema) {
            return Ok(existing.clone());
        }

        let subject = &state.subject.name;
        let names = state.subject.config.validators();
        let history: Vec<SchemaEntry> = entries.iter().rev().cloned().collect();
        for (name, validator) in self.validators.validators_for(names.as_slice())? {
            validator
                .validate(schema, &history)
                .map_err(|reason| RepositoryError::Validation {
                    subject: subject.clone(),
                    validator: name,
                    reason,
                })?;
        }

        let entry = SchemaEntry {
            id: entries.len().to_string(),
            schema: schema.to_owned(),
        };
        entries.push(entry.clone());

        tracing::info!(subject = %subject, id = %entry.id, "Schema registered");
        Ok(entry)
    }
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("subjects", &self.subjects.len())
            .finish()
    }
}

impl Repository for InMemoryRepository {
    fn register_subject(&self, name: &str, config: SubjectConfig) -> Result<Subject, RepositoryError> {
        if !is_valid_subject_name(name) {
            return Err(RepositoryError::InvalidSubjectName(name.to_owned()));
        }

        match self.subjects.entry(name.to_owned()) {
            Entry::Occupied(existing) => Ok(existing.get().subject.clone()),
            Entry::Vacant(slot) => {
                self.validators.check_names(config.validators().as_slice())?;
                let subject = Subject {
                    name: name.to_owned(),
                    config,
                };
                slot.insert(Arc::new(SubjectState {
                    subject: subject.clone(),
                    entries: RwLock::new(Vec::new()),
                }));
                tracing::info!(subject = %name, "Subject created");
                Ok(subject)
            }
        }
    }

    fn subject(&self, name: &str) -> Option<Subject> {
        self.subjects.get(name).map(|s| s.subject.clone())
    }

    fn subjects(&self) -> Vec<Subject> {
        let mut all: Vec<Subject> = self.subjects.iter().map(|s| s.subject.clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    fn register_schema(&self, subject: &str, schema: &str) -> Result<SchemaEntry, RepositoryError> {
        let state = self.state(subject)?;
        let mut entries = state.entries.write().unwrap_or_else(|e| e.into_inner());
        self.append(&state, &mut entries, schema)
    }

    fn register_schema_if_latest(
        &self,
        subject: &str,
        schema: &str,
        latest_id: Option<&str>,
    ) -> Result<Option<SchemaEntry>, RepositoryError> {
        let state = self.state(subject)?;
        let mut entries = state.entries.write().unwrap_or_else(|e| e.into_inner());
        let current = entries.last().map(|e| e.id.as_str());
        if current != latest_id {
            tracing::debug!(
                subject = %subject,
                expected = ?latest_id,
                current = ?current,
                "Latest id mismatch, not registering"
            );
            return Ok(None);
        }
        self.append(&state, &mut entries, schema).map(Some)
    }

    fn lookup_by_id(&self, subject: &str, id: &str) -> Result<Option<SchemaEntry>, RepositoryError> {
        let state = self.state(subject)?;
        let entries = state.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    fn lookup_by_schema(&self, subject: &str, schema: &str) -> Result<Option<SchemaEntry>, RepositoryError> {
        let state = self.state(subject)?;
        let entries = state.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.iter().find(|e| e.schema == schema).cloned())
    }

    fn latest(&self, subject: &str) -> Result<Option<SchemaEntry>, RepositoryError> {
        let state = self.state(subject)?;
        let entries = state.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.last().cloned())
    }

    fn all_entries(&self, subject: &str) -> Result<Vec<SchemaEntry>, RepositoryError> {
        let state = self.state(subject)?;
        let entries = state.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.iter().rev().cloned().collect())
    }
}
