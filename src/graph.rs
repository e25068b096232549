//! Composition of the per-server singleton collaborators.
//!
//! # Responsibilities
//! - Select the repository and JSON codec named by the configuration
//! - Build the validator factory from `validator.*` keys
//! - Hand one instance of each to every endpoint group
//!
//! # Design Decisions
//! - One explicit composition function, no runtime lookup
//! - Fields are trait objects so alternate implementations plug in without
//!   touching the endpoint layer
//! - Composition fails before any listener exists

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::codec::{JsonCodec, SerdeJsonCodec};
use crate::config::defaults::{CODEC_KIND, REPOSITORY_KIND};
use crate::config::Configuration;
use crate::repository::{InMemoryRepository, Repository};
use crate::validation::{ValidatorError, ValidatorFactory, ValidatorFactoryBuilder};

/// Errors raised while composing a [`ServiceGraph`].
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("config key `{key}` names unknown implementation `{value}`")]
    UnknownImplementation { key: &'static str, value: String },

    #[error("validator configuration rejected: {0}")]
    Validators(#[from] ValidatorError),
}

/// The singleton collaborators shared by all handlers of one server.
///
/// Cloning a graph clones the handles; the collaborators themselves are
/// created exactly once, in [`ServiceGraph::compose`].
#[derive(Clone)]
pub struct ServiceGraph {
    name: Arc<str>,
    pub repository: Arc<dyn Repository>,
    pub validators: Arc<ValidatorFactory>,
    pub codec: Arc<dyn JsonCodec>,
    pub config: Arc<Configuration>,
}

impl ServiceGraph {
    /// Build every collaborator for `config`.
    pub fn compose(config: Arc<Configuration>) -> Result<Self, GraphError> {
        let name: Arc<str> = format!("schema-repo-{}", Uuid::new_v4()).into();

        let validators = Arc::new(ValidatorFactoryBuilder::from_config(&config)?.build()?);
        let repository = select_repository(&config, Arc::clone(&validators))?;
        let codec = select_codec(&config)?;

        tracing::info!(
            graph = %name,
            repository = config.get_or(REPOSITORY_KIND, ""),
            codec = config.get_or(CODEC_KIND, ""),
            validators = ?validators.names().collect::<Vec<_>>(),
            "Service graph composed"
        );

        Ok(Self {
            name,
            repository,
            validators,
            codec,
            config,
        })
    }

    /// Unique per composition: `schema-repo-<uuid>`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for ServiceGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceGraph")
            .field("name", &self.name)
            .field("validators", &self.validators)
            .finish_non_exhaustive()
    }
}

fn select_repository(
    config: &Configuration,
    validators: Arc<ValidatorFactory>,
) -> Result<Arc<dyn Repository>, GraphError> {
    match config.get_or(REPOSITORY_KIND, "in-memory") {
        "in-memory" => Ok(Arc::new(InMemoryRepository::new(validators))),
        other => Err(GraphError::UnknownImplementation {
            key: REPOSITORY_KIND,
            value: other.to_owned(),
        }),
    }
}

fn select_codec(config: &Configuration) -> Result<Arc<dyn JsonCodec>, GraphError> {
    match config.get_or(CODEC_KIND, "json") {
        "json" => Ok(Arc::new(SerdeJsonCodec::compact())),
        "json-pretty" => Ok(Arc::new(SerdeJsonCodec::pretty())),
        other => Err(GraphError::UnknownImplementation {
            key: CODEC_KIND,
            value: other.to_owned(),
        }),
    }
}
