//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the service. Everything else is
//! concrete types. Ports exist for:
//! - Durable character storage (could swap SQLite -> Mongo/Postgres)
//! - The read cache (could swap in-memory -> Redis)
//! - Change-event publication (could swap broadcast channel -> a broker)
//! - The external catalog API
//! - Clock/Random (for testing)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use archref_domain::{Character, CharacterId};

use crate::signing::SignedParams;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Unsupported sort key: {0}")]
    UnsupportedSort(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache error: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Publish failed: {0}")]
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Pagination Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    AttackPoint,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Page descriptor handed to the store. The index is 0-based; the service
/// converts to the 1-based number callers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<(SortKey, SortDirection)>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn sorted_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort = Some((key, direction));
        self
    }
}

/// One page of results. Store adapters echo the 0-based request index in
/// `number`; the service converts to the 1-based number callers see.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub total_pages: u32,
    pub total_elements: u64,
}

// =============================================================================
// External Catalog Types
// =============================================================================

/// One detail record from the external catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogCharacterDetail {
    pub name: String,
    pub description: String,
    pub modified: Option<DateTime<Utc>>,
}

/// Decoded catalog response: the flattened detail record list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogResponse {
    pub details: Vec<CatalogCharacterDetail>,
}

// =============================================================================
// Collaborator Ports
// =============================================================================

/// Durable keyed storage for character records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Absence is `Ok(None)`, never an error.
    async fn find_by_id(&self, id: &CharacterId) -> Result<Option<Character>, StoreError>;
    /// Insert or full overwrite by id; assigns an id when the record has none.
    async fn save(&self, character: &Character) -> Result<Character, StoreError>;
    /// Idempotent; deleting an absent id is not an error.
    async fn delete_by_id(&self, id: &CharacterId) -> Result<(), StoreError>;
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Character>, StoreError>;
}

/// Best-effort read cache in front of the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterCache: Send + Sync {
    async fn find_by_id(&self, id: &CharacterId) -> Result<Option<Character>, CacheError>;
    async fn save(&self, character: &Character) -> Result<(), CacheError>;
}

/// Fire-and-forget publication of character-change events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterEventPublisher: Send + Sync {
    async fn publish(&self, character: &Character) -> Result<(), PublishError>;
}

/// Signed fetch of a character detail record from the third-party catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_by_id(
        &self,
        id: u64,
        params: &SignedParams,
    ) -> Result<CatalogResponse, CatalogError>;
}

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Uniformly random index into a slice of the given length.
    fn pick_index(&self, len: usize) -> usize;
    /// Fresh nonce for request signing.
    fn nonce(&self) -> String;
}
