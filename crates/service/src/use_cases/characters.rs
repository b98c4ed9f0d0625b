//! Character service: create, cache-aside read, patch, delete, paging, and
//! the signed randomized import.

use std::sync::Arc;

use archref_domain::{AttackPoint, Character, CharacterDraft, CharacterId, Priority};

use crate::config::{ImportConfig, DEFAULT_CATALOG_ID};
use crate::ports::{
    CatalogClient, CharacterCache, CharacterEventPublisher, CharacterStore, ClockPort, Page,
    PageRequest, RandomPort,
};
use crate::signing::SignedParams;

use super::patch::{apply_patch, PatchRequest};
use super::CharacterError;

/// Orchestrates the character store, read cache, event publisher, and
/// external catalog. Holds only immutable configuration and collaborator
/// handles; every operation is an independent, stateless request handler.
pub struct CharacterService {
    store: Arc<dyn CharacterStore>,
    cache: Arc<dyn CharacterCache>,
    publisher: Arc<dyn CharacterEventPublisher>,
    catalog: Arc<dyn CatalogClient>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    config: ImportConfig,
}

impl CharacterService {
    pub fn new(
        store: Arc<dyn CharacterStore>,
        cache: Arc<dyn CharacterCache>,
        publisher: Arc<dyn CharacterEventPublisher>,
        catalog: Arc<dyn CatalogClient>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        config: ImportConfig,
    ) -> Self {
        Self {
            store,
            cache,
            publisher,
            catalog,
            clock,
            random,
            config,
        }
    }

    /// Create a character and publish a change event for it.
    ///
    /// Exactly one store write and one publication per call, the write
    /// strictly first. A failed publish is not rolled back.
    pub async fn create(&self, draft: CharacterDraft) -> Result<Character, CharacterError> {
        tracing::info!(name = %draft.name, "Creating character");
        let character = draft.into_character();

        let saved = self.store.save(&character).await?;
        tracing::info!(id = ?saved.id, "Character saved");

        self.publisher.publish(&saved).await?;
        Ok(saved)
    }

    /// Cache-aside read: cache hit returns without consulting the store; a
    /// miss reads the store and back-fills the cache best-effort.
    pub async fn get_by_id(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        if let Some(cached) = self.cache.find_by_id(id).await? {
            return Ok(cached);
        }

        tracing::info!(%id, "Character not in cache, querying store");

        match self.store.find_by_id(id).await? {
            Some(character) => {
                // The cache is an accelerator only; a failed write never
                // fails the read.
                if let Err(error) = self.cache.save(&character).await {
                    tracing::warn!(%id, %error, "Failed to populate character cache");
                }
                Ok(character)
            }
            None => Err(CharacterError::not_found(id.as_str())),
        }
    }

    /// Apply a partial update to the stored character.
    ///
    /// Loads straight from the store (the cache is neither consulted nor
    /// refreshed) and saves back only the fields the patch names.
    pub async fn update_partial(
        &self,
        id: &CharacterId,
        patch: PatchRequest,
    ) -> Result<Character, CharacterError> {
        let mut character = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CharacterError::not_found(id.as_str()))?;

        apply_patch(&patch, &mut character)?;

        let saved = self.store.save(&character).await?;
        Ok(saved)
    }

    /// Delete a character after checking it exists. The cache entry, if
    /// any, stays in place until the next populating read overwrites it.
    pub async fn delete(&self, id: &CharacterId) -> Result<(), CharacterError> {
        tracing::info!(%id, "Deleting character");

        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CharacterError::not_found(id.as_str()))?;

        self.store.delete_by_id(id).await?;
        Ok(())
    }

    /// Paginated listing straight from the store; the returned page number
    /// is 1-based.
    pub async fn get_pages(&self, request: &PageRequest) -> Result<Page<Character>, CharacterError> {
        tracing::info!(page = request.page, size = request.size, "Querying character page");
        let page = self.store.find_page(request).await?;

        Ok(Page {
            number: page.number + 1,
            ..page
        })
    }

    /// Import a character from the external catalog and create it.
    ///
    /// The target id is drawn uniformly from the configured candidate list,
    /// falling back to a fixed id when the list is empty. The request is
    /// signed with a fresh nonce per call.
    pub async fn create_random(&self) -> Result<Character, CharacterError> {
        let catalog_id = self.pick_catalog_id();
        tracing::info!(catalog_id, "Importing character from external catalog");

        let params = SignedParams::new(
            self.random.nonce(),
            &self.config.private_key,
            &self.config.public_key,
        );

        let response = self.catalog.fetch_by_id(catalog_id, &params).await?;

        let detail = response
            .details
            .into_iter()
            .next()
            .ok_or(CharacterError::ExternalDataMissing { catalog_id })?;

        let stamp = detail.modified.unwrap_or_else(|| self.clock.now());
        let draft = CharacterDraft::new(
            detail.name,
            detail.description,
            AttackPoint::default(),
            self.config.import_address.clone(),
            Priority::None,
            Some(stamp),
            Some(stamp),
        )
        .map_err(|e| CharacterError::Validation(e.to_string()))?;

        self.create(draft).await
    }

    fn pick_catalog_id(&self) -> u64 {
        let ids = &self.config.candidate_ids;
        if ids.is_empty() {
            return DEFAULT_CATALOG_ID;
        }
        let index = self.random.pick_index(ids.len());
        ids.get(index).copied().unwrap_or(DEFAULT_CATALOG_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{
        CatalogCharacterDetail, CatalogResponse, MockCatalogClient, MockCharacterCache,
        MockCharacterEventPublisher, MockCharacterStore, MockClockPort, MockRandomPort,
        CacheError, PublishError, StoreError,
    };
    use crate::signing::request_hash;
    use chrono::{TimeZone, Utc};
    use mockall::Sequence;
    use serde_json::json;

    fn groot() -> Character {
        Character {
            id: Some(CharacterId::new("42")),
            name: "Groot".into(),
            description: "A tree-like humanoid".into(),
            attack_point: AttackPoint::new(5).expect("valid"),
            address: None,
            priority: Priority::None,
            created_at: None,
            updated_at: None,
        }
    }

    fn groot_draft() -> CharacterDraft {
        CharacterDraft::new(
            "Groot",
            "A tree-like humanoid",
            AttackPoint::new(5).expect("valid"),
            None,
            Priority::None,
            None,
            None,
        )
        .expect("valid draft")
    }

    fn patch_of(value: serde_json::Value) -> PatchRequest {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("patch fixtures must be JSON objects"),
        }
    }

    struct Mocks {
        store: MockCharacterStore,
        cache: MockCharacterCache,
        publisher: MockCharacterEventPublisher,
        catalog: MockCatalogClient,
        clock: MockClockPort,
        random: MockRandomPort,
        config: ImportConfig,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                store: MockCharacterStore::new(),
                cache: MockCharacterCache::new(),
                publisher: MockCharacterEventPublisher::new(),
                catalog: MockCatalogClient::new(),
                clock: MockClockPort::new(),
                random: MockRandomPort::new(),
                config: ImportConfig::new(
                    vec![1011334],
                    "public-key",
                    "private-key",
                    Some(ImportConfig::placeholder_address()),
                ),
            }
        }

        fn into_service(self) -> CharacterService {
            CharacterService::new(
                Arc::new(self.store),
                Arc::new(self.cache),
                Arc::new(self.publisher),
                Arc::new(self.catalog),
                Arc::new(self.clock),
                Arc::new(self.random),
                self.config,
            )
        }
    }

    // =========================================================================
    // Cache-aside reads
    // =========================================================================

    #[tokio::test]
    async fn cache_hit_never_touches_store() {
        let mut mocks = Mocks::new();
        mocks
            .cache
            .expect_find_by_id()
            .withf(|id| id.as_str() == "42")
            .times(1)
            .returning(|_| Ok(Some(groot())));
        mocks.store.expect_find_by_id().times(0);

        let service = mocks.into_service();
        let found = service
            .get_by_id(&CharacterId::new("42"))
            .await
            .expect("cache hit");

        assert_eq!(found, groot());
    }

    #[tokio::test]
    async fn cache_miss_reads_store_and_populates_cache() {
        let mut mocks = Mocks::new();
        mocks.cache.expect_find_by_id().times(1).returning(|_| Ok(None));
        mocks
            .store
            .expect_find_by_id()
            .withf(|id| id.as_str() == "42")
            .times(1)
            .returning(|_| Ok(Some(groot())));
        mocks
            .cache
            .expect_save()
            .withf(|character| character.name == "Groot")
            .times(1)
            .returning(|_| Ok(()));

        let service = mocks.into_service();
        let found = service
            .get_by_id(&CharacterId::new("42"))
            .await
            .expect("store fallback");

        assert_eq!(found, groot());
    }

    #[tokio::test]
    async fn both_miss_raises_not_found_with_id() {
        let mut mocks = Mocks::new();
        mocks.cache.expect_find_by_id().returning(|_| Ok(None));
        mocks.store.expect_find_by_id().times(1).returning(|_| Ok(None));

        let service = mocks.into_service();
        let result = service.get_by_id(&CharacterId::new("404")).await;

        assert!(matches!(
            result,
            Err(CharacterError::NotFound { entity_type: "Character", ref id }) if id == "404"
        ));
    }

    #[tokio::test]
    async fn cache_write_failure_does_not_fail_the_read() {
        let mut mocks = Mocks::new();
        mocks.cache.expect_find_by_id().returning(|_| Ok(None));
        mocks.store.expect_find_by_id().returning(|_| Ok(Some(groot())));
        mocks
            .cache
            .expect_save()
            .returning(|_| Err(CacheError::Unavailable("connection refused".into())));

        let service = mocks.into_service();
        let found = service
            .get_by_id(&CharacterId::new("42"))
            .await
            .expect("read survives cache write failure");

        assert_eq!(found, groot());
    }

    #[tokio::test]
    async fn cache_read_failure_propagates() {
        let mut mocks = Mocks::new();
        mocks
            .cache
            .expect_find_by_id()
            .returning(|_| Err(CacheError::Unavailable("connection refused".into())));
        mocks.store.expect_find_by_id().times(0);

        let service = mocks.into_service();
        let result = service.get_by_id(&CharacterId::new("42")).await;

        assert!(matches!(result, Err(CharacterError::Cache(_))));
    }

    // =========================================================================
    // Create
    // =========================================================================

    #[tokio::test]
    async fn create_saves_before_publishing() {
        let mut mocks = Mocks::new();
        let mut seq = Sequence::new();
        mocks
            .store
            .expect_save()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|character| {
                let mut saved = character.clone();
                saved.id = Some(CharacterId::new("42"));
                Ok(saved)
            });
        mocks
            .publisher
            .expect_publish()
            .withf(|character| character.id == Some(CharacterId::new("42")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let service = mocks.into_service();
        let saved = service.create(groot_draft()).await.expect("created");

        assert_eq!(saved.id, Some(CharacterId::new("42")));
        assert_eq!(saved.name, "Groot");
    }

    #[tokio::test]
    async fn create_never_publishes_when_save_fails() {
        let mut mocks = Mocks::new();
        mocks
            .store
            .expect_save()
            .returning(|_| Err(StoreError::Database("write failed".into())));
        mocks.publisher.expect_publish().times(0);

        let service = mocks.into_service();
        let result = service.create(groot_draft()).await;

        assert!(matches!(result, Err(CharacterError::Store(_))));
    }

    #[tokio::test]
    async fn create_surfaces_publish_failures() {
        let mut mocks = Mocks::new();
        mocks.store.expect_save().returning(|character| Ok(character.clone()));
        mocks
            .publisher
            .expect_publish()
            .returning(|_| Err(PublishError::Failed("broker down".into())));

        let service = mocks.into_service();
        let result = service.create(groot_draft()).await;

        assert!(matches!(result, Err(CharacterError::Publish(_))));
    }

    // =========================================================================
    // Partial update
    // =========================================================================

    #[tokio::test]
    async fn patch_changes_only_named_fields() {
        let mut mocks = Mocks::new();
        // The patch path goes straight to the store.
        mocks.cache.expect_find_by_id().times(0);
        mocks.cache.expect_save().times(0);
        mocks.store.expect_find_by_id().times(1).returning(|_| Ok(Some(groot())));
        mocks
            .store
            .expect_save()
            .withf(|character| {
                character.id == Some(CharacterId::new("42"))
                    && character.name == "Groot"
                    && character.attack_point.value() == 9
            })
            .times(1)
            .returning(|character| Ok(character.clone()));

        let service = mocks.into_service();
        let updated = service
            .update_partial(&CharacterId::new("42"), patch_of(json!({"attackPoint": 9})))
            .await
            .expect("patched");

        assert_eq!(updated.attack_point.value(), 9);
        assert_eq!(updated.name, "Groot");
    }

    #[tokio::test]
    async fn patching_identity_is_forbidden() {
        let mut mocks = Mocks::new();
        mocks.store.expect_find_by_id().returning(|_| Ok(Some(groot())));
        mocks.store.expect_save().times(0);

        let service = mocks.into_service();
        let result = service
            .update_partial(
                &CharacterId::new("42"),
                patch_of(json!({"id": "999", "name": "Rocket"})),
            )
            .await;

        assert!(matches!(result, Err(CharacterError::ForbiddenField(ref f)) if f == "id"));
    }

    #[tokio::test]
    async fn patching_unknown_field_is_invalid() {
        let mut mocks = Mocks::new();
        mocks.store.expect_find_by_id().returning(|_| Ok(Some(groot())));
        mocks.store.expect_save().times(0);

        let service = mocks.into_service();
        let result = service
            .update_partial(&CharacterId::new("42"), patch_of(json!({"notAField": 1})))
            .await;

        assert!(matches!(result, Err(CharacterError::InvalidField(ref f)) if f == "notAField"));
    }

    #[tokio::test]
    async fn patching_missing_character_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.store.expect_find_by_id().returning(|_| Ok(None));
        mocks.store.expect_save().times(0);

        let service = mocks.into_service();
        let result = service
            .update_partial(&CharacterId::new("404"), patch_of(json!({"name": "Rocket"})))
            .await;

        assert!(matches!(result, Err(CharacterError::NotFound { .. })));
    }

    // =========================================================================
    // Delete
    // =========================================================================

    #[tokio::test]
    async fn delete_checks_existence_first() {
        let mut mocks = Mocks::new();
        let mut seq = Sequence::new();
        mocks
            .store
            .expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(groot())));
        mocks
            .store
            .expect_delete_by_id()
            .withf(|id| id.as_str() == "42")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let service = mocks.into_service();
        service
            .delete(&CharacterId::new("42"))
            .await
            .expect("deleted");
    }

    #[tokio::test]
    async fn delete_of_missing_character_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.store.expect_find_by_id().returning(|_| Ok(None));
        mocks.store.expect_delete_by_id().times(0);

        let service = mocks.into_service();
        let result = service.delete(&CharacterId::new("404")).await;

        assert!(matches!(result, Err(CharacterError::NotFound { .. })));
    }

    // =========================================================================
    // Paging
    // =========================================================================

    #[tokio::test]
    async fn page_numbers_are_one_based() {
        let mut mocks = Mocks::new();
        mocks.store.expect_find_page().times(1).returning(|request| {
            Ok(Page {
                items: vec![groot()],
                number: request.page,
                total_pages: 3,
                total_elements: 25,
            })
        });

        let service = mocks.into_service();
        let page = service
            .get_pages(&PageRequest::new(0, 10))
            .await
            .expect("page");

        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_elements, 25);
        assert_eq!(page.items.len(), 1);
    }

    // =========================================================================
    // Randomized import
    // =========================================================================

    #[tokio::test]
    async fn import_targets_the_single_candidate_with_signed_params() {
        let mut mocks = Mocks::new();
        let modified = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid ts");

        mocks.random.expect_pick_index().times(1).returning(|_| 0);
        mocks.random.expect_nonce().returning(|| "nonce-1".to_string());

        let expected_hash = request_hash("nonce-1", "private-key", "public-key");
        mocks
            .catalog
            .expect_fetch_by_id()
            .withf(move |id, params| {
                *id == 1011334
                    && params.nonce == "nonce-1"
                    && params.public_key == "public-key"
                    && params.hash == expected_hash
            })
            .times(1)
            .returning(move |_, _| {
                Ok(CatalogResponse {
                    details: vec![CatalogCharacterDetail {
                        name: "3-D Man".into(),
                        description: "Triple-strength hero".into(),
                        modified: Some(modified),
                    }],
                })
            });

        mocks
            .store
            .expect_save()
            .withf(move |character| {
                character.name == "3-D Man"
                    && character.attack_point.value() == 1
                    && character.priority == Priority::None
                    && character.address == Some(ImportConfig::placeholder_address())
                    && character.created_at == Some(modified)
                    && character.updated_at == Some(modified)
            })
            .times(1)
            .returning(|character| {
                let mut saved = character.clone();
                saved.id = Some(CharacterId::new("imported-1"));
                Ok(saved)
            });
        mocks.publisher.expect_publish().times(1).returning(|_| Ok(()));

        let service = mocks.into_service();
        let imported = service.create_random().await.expect("imported");

        assert_eq!(imported.id, Some(CharacterId::new("imported-1")));
    }

    #[tokio::test]
    async fn import_falls_back_to_current_time_without_modified_stamp() {
        let mut mocks = Mocks::new();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid ts");

        mocks.random.expect_pick_index().returning(|_| 0);
        mocks.random.expect_nonce().returning(|| "nonce-2".to_string());
        mocks.clock.expect_now().returning(move || now);
        mocks.catalog.expect_fetch_by_id().returning(|_, _| {
            Ok(CatalogResponse {
                details: vec![CatalogCharacterDetail {
                    name: "A-Bomb".into(),
                    description: "Gamma-charged bruiser".into(),
                    modified: None,
                }],
            })
        });
        mocks
            .store
            .expect_save()
            .withf(move |character| {
                character.created_at == Some(now) && character.updated_at == Some(now)
            })
            .returning(|character| Ok(character.clone()));
        mocks.publisher.expect_publish().returning(|_| Ok(()));

        let service = mocks.into_service();
        service.create_random().await.expect("imported");
    }

    #[tokio::test]
    async fn import_with_empty_details_never_creates() {
        let mut mocks = Mocks::new();
        mocks.random.expect_pick_index().returning(|_| 0);
        mocks.random.expect_nonce().returning(|| "nonce-3".to_string());
        mocks
            .catalog
            .expect_fetch_by_id()
            .returning(|_, _| Ok(CatalogResponse::default()));
        mocks.store.expect_save().times(0);
        mocks.publisher.expect_publish().times(0);

        let service = mocks.into_service();
        let result = service.create_random().await;

        assert!(matches!(
            result,
            Err(CharacterError::ExternalDataMissing { catalog_id: 1011334 })
        ));
    }

    #[tokio::test]
    async fn import_uses_fallback_id_when_no_candidates_configured() {
        let mut mocks = Mocks::new();
        mocks.config = ImportConfig::new(vec![], "public-key", "private-key", None);
        mocks.random.expect_pick_index().times(0);
        mocks.random.expect_nonce().returning(|| "nonce-4".to_string());
        mocks
            .catalog
            .expect_fetch_by_id()
            .withf(|id, _| *id == DEFAULT_CATALOG_ID)
            .times(1)
            .returning(|_, _| Ok(CatalogResponse::default()));

        let service = mocks.into_service();
        let result = service.create_random().await;

        assert!(matches!(result, Err(CharacterError::ExternalDataMissing { .. })));
    }

    #[tokio::test]
    async fn import_without_placeholder_address_leaves_it_absent() {
        let mut mocks = Mocks::new();
        mocks.config = ImportConfig::new(vec![7], "public-key", "private-key", None);
        mocks.random.expect_pick_index().returning(|_| 0);
        mocks.random.expect_nonce().returning(|| "nonce-5".to_string());
        let modified = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid ts");
        mocks.catalog.expect_fetch_by_id().returning(move |_, _| {
            Ok(CatalogResponse {
                details: vec![CatalogCharacterDetail {
                    name: "Abyss".into(),
                    description: "Shadowy entity".into(),
                    modified: Some(modified),
                }],
            })
        });
        mocks
            .store
            .expect_save()
            .withf(|character| character.address.is_none())
            .returning(|character| Ok(character.clone()));
        mocks.publisher.expect_publish().returning(|_| Ok(()));

        let service = mocks.into_service();
        service.create_random().await.expect("imported");
    }
}
