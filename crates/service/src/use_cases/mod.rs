//! Character service use cases.
//!
//! These orchestrate the store, cache, publisher, and external catalog
//! behind the port traits; transport layers stay thin.

mod characters;
mod patch;

pub use characters::CharacterService;
pub use patch::{apply_patch, PatchRequest};

use crate::ports::{CacheError, CatalogError, PublishError, StoreError};

/// Shared error type for character use cases.
#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Unknown field: {0}")]
    InvalidField(String),
    #[error("Field is not patchable: {0}")]
    ForbiddenField(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("External catalog returned no detail records for id {catalog_id}")]
    ExternalDataMissing { catalog_id: u64 },
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl CharacterError {
    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Character",
            id: id.into(),
        }
    }
}
