//! TTL-based in-memory character cache.
//!
//! Thread-safe read cache with automatic expiration to prevent unbounded
//! memory growth in long-running server processes. Expired entries read as
//! misses; they are only dropped on the next overwrite or cleanup pass.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use archref_domain::{Character, CharacterId};

use crate::ports::{CacheError, CharacterCache};

struct TtlEntry {
    character: Character,
    inserted_at: Instant,
}

/// In-memory implementation of the character read cache.
pub struct InMemoryCharacterCache {
    entries: RwLock<HashMap<CharacterId, TtlEntry>>,
    ttl: Duration,
}

impl InMemoryCharacterCache {
    /// Create a new cache with the specified TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert with an explicit timestamp (tests only).
    #[cfg(test)]
    async fn insert_at(&self, character: Character, inserted_at: Instant) {
        let id = match character.id.clone() {
            Some(id) => id,
            None => return,
        };
        let entry = TtlEntry {
            character,
            inserted_at,
        };
        self.entries.write().await.insert(id, entry);
    }

    /// Remove all expired entries and return the count of removed entries.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before_count = guard.len();
        guard.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        before_count - guard.len()
    }

    /// Current number of entries (including expired ones not yet cleaned).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CharacterCache for InMemoryCharacterCache {
    async fn find_by_id(&self, id: &CharacterId) -> Result<Option<Character>, CacheError> {
        let guard = self.entries.read().await;
        Ok(guard.get(id).and_then(|entry| {
            if entry.inserted_at.elapsed() < self.ttl {
                Some(entry.character.clone())
            } else {
                None
            }
        }))
    }

    async fn save(&self, character: &Character) -> Result<(), CacheError> {
        // Only store-assigned records are cacheable.
        let id = match character.id.clone() {
            Some(id) => id,
            None => return Ok(()),
        };
        let entry = TtlEntry {
            character: character.clone(),
            inserted_at: Instant::now(),
        };
        self.entries.write().await.insert(id, entry);
        Ok(())
    }
}
