//! Schema validators and the factory that hands them out.
//!
//! # Responsibilities
//! - Hold the named validators configured for one server instance
//! - Resolve a subject's validator names to validator instances
//! - Supply the default validator set for subjects that name none
//!
//! # Design Decisions
//! - Built once per service graph through [`ValidatorFactoryBuilder`]
//! - Validators are shared `Arc`s and must be safe to call concurrently
//! - Unknown names fail at build or subject-registration time, never silently

pub mod builtin;

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::config::defaults::{VALIDATOR_DEFAULTS, VALIDATOR_PREFIX};
use crate::config::Configuration;
use crate::repository::SchemaEntry;

/// Checks a candidate schema against a subject's history.
pub trait Validator: Send + Sync {
    /// `history` is newest first. Returns a human readable rejection reason.
    fn validate(&self, schema: &str, history: &[SchemaEntry]) -> Result<(), String>;
}

/// Errors raised while building or querying a [`ValidatorFactory`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    #[error("validator name must not be empty")]
    EmptyName,

    #[error("`{0}` is reserved and cannot name a validator")]
    ReservedName(String),

    #[error("unknown validator `{0}`")]
    Unknown(String),

    #[error("validator `{name}` has unsupported kind `{kind}`")]
    UnsupportedKind { name: String, kind: String },
}

/// Named validators plus the defaults applied to subjects without their own.
pub struct ValidatorFactory {
    validators: BTreeMap<String, Arc<dyn Validator>>,
    defaults: Vec<String>,
}

impl ValidatorFactory {
    pub fn builder() -> ValidatorFactoryBuilder {
        ValidatorFactoryBuilder::default()
    }

    /// Resolve `names` to validators. An empty slice resolves the defaults.
    pub fn validators_for<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<(String, Arc<dyn Validator>)>, ValidatorError> {
        if names.is_empty() {
            return self.resolve(self.defaults.as_slice());
        }
        self.resolve(names)
    }

    /// Fail if any name is unknown.
    pub fn check_names<S: AsRef<str>>(&self, names: &[S]) -> Result<(), ValidatorError> {
        self.resolve(names).map(|_| ())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    pub fn default_names(&self) -> &[String] {
        &self.defaults
    }

    fn resolve<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<(String, Arc<dyn Validator>)>, ValidatorError> {
        names
            .iter()
            .map(|n| {
                let name = n.as_ref();
                self.validators
                    .get(name)
                    .map(|v| (name.to_owned(), Arc::clone(v)))
                    .ok_or_else(|| ValidatorError::Unknown(name.to_owned()))
            })
            .collect()
    }
}

impl std::fmt::Debug for ValidatorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorFactory")
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Builder for [`ValidatorFactory`].
#[derive(Default)]
pub struct ValidatorFactoryBuilder {
    validators: BTreeMap<String, Arc<dyn Validator>>,
    defaults: Vec<String>,
}

impl ValidatorFactoryBuilder {
    /// Seed a builder from `validator.<name> = <kind>` and
    /// `validator.defaults` entries.
    pub fn from_config(config: &Configuration) -> Result<Self, ValidatorError> {
        let defaults_key = &VALIDATOR_DEFAULTS[VALIDATOR_PREFIX.len()..];
        let mut builder = Self::default();

        for (name, kind) in config.with_prefix(VALIDATOR_PREFIX) {
            if name == defaults_key {
                continue;
            }
            let validator = builtin::from_kind(kind).ok_or_else(|| ValidatorError::UnsupportedKind {
                name: name.to_owned(),
                kind: kind.to_owned(),
            })?;
            builder = builder.set_validator(name, validator);
        }

        Ok(builder.set_default_validators(config.get_list(VALIDATOR_DEFAULTS)))
    }

    pub fn set_validator(mut self, name: impl Into<String>, validator: Arc<dyn Validator>) -> Self {
        self.validators.insert(name.into(), validator);
        self
    }

    pub fn set_default_validators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defaults = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<ValidatorFactory, ValidatorError> {
        let defaults_key = &VALIDATOR_DEFAULTS[VALIDATOR_PREFIX.len()..];
        for name in self.validators.keys() {
            if name.trim().is_empty() {
                return Err(ValidatorError::EmptyName);
            }
            if name == defaults_key {
                return Err(ValidatorError::ReservedName(name.clone()));
            }
        }
        if let Some(missing) = self.defaults.iter().find(|d| !self.validators.contains_key(*d)) {
            return Err(ValidatorError::Unknown(missing.clone()));
        }

        tracing::debug!(
            validators = self.validators.len(),
            defaults = ?self.defaults,
            "Validator factory built"
        );

        Ok(ValidatorFactory {
            validators: self.validators,
            defaults: self.defaults,
        })
    }
}
