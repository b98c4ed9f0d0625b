//! SQLite-backed character store.
//!
//! Records are stored as one JSON document per row, keyed by the assigned
//! id. Pagination sorts through `json_extract` over a closed set of keys
//! so no user input ever reaches the ORDER BY clause.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use archref_domain::{Character, CharacterId};

use crate::ports::{
    CharacterStore, ClockPort, Page, PageRequest, SortDirection, SortKey, StoreError,
};

/// SQLite implementation of the durable character store.
pub struct SqliteCharacterStore {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteCharacterStore {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(db_err)?;
        Self::init(pool, clock).await
    }

    /// In-memory store, used by tests and local wiring.
    pub async fn in_memory(clock: Arc<dyn ClockPort>) -> Result<Self, StoreError> {
        // Every pooled connection would otherwise see its own empty
        // in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(db_err)?;
        Self::init(pool, clock).await
    }

    async fn init(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Result<Self, StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS characters (
                id TEXT PRIMARY KEY,
                character_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(db_err)?;

        Ok(Self { pool, clock })
    }

    fn decode_row(row: &sqlx::sqlite::SqliteRow) -> Result<Character, StoreError> {
        let json: String = row.get("character_json");
        serde_json::from_str(&json).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl CharacterStore for SqliteCharacterStore {
    async fn find_by_id(&self, id: &CharacterId) -> Result<Option<Character>, StoreError> {
        let row = sqlx::query("SELECT character_json FROM characters WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => Ok(Some(Self::decode_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, character: &Character) -> Result<Character, StoreError> {
        let mut saved = character.clone();
        // First save assigns identity; it never changes afterwards.
        let id = match saved.id.clone() {
            Some(id) => id,
            None => {
                let id = CharacterId::new(Uuid::new_v4().to_string());
                saved.id = Some(id.clone());
                id
            }
        };

        let json =
            serde_json::to_string(&saved).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let now = self.clock.now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO characters (id, character_json, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                character_json = excluded.character_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id.as_str())
        .bind(json)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(saved)
    }

    async fn delete_by_id(&self, id: &CharacterId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Character>, StoreError> {
        let total_row = sqlx::query("SELECT COUNT(*) AS total FROM characters")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let total_elements: i64 = total_row.get("total");
        let total_elements = total_elements.max(0) as u64;

        let total_pages = if request.size == 0 {
            0
        } else {
            total_elements.div_ceil(u64::from(request.size)) as u32
        };

        let order_clause = order_clause(request.sort);
        let query = format!(
            "SELECT character_json FROM characters {} LIMIT ? OFFSET ?",
            order_clause
        );

        let offset = i64::from(request.page) * i64::from(request.size);
        let rows = sqlx::query(&query)
            .bind(i64::from(request.size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .iter()
            .map(Self::decode_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            number: request.page,
            total_pages,
            total_elements,
        })
    }
}

fn order_clause(sort: Option<(SortKey, SortDirection)>) -> String {
    let Some((key, direction)) = sort else {
        // Insertion order keeps pagination stable without a sort key.
        return "ORDER BY rowid".to_string();
    };

    let column = match key {
        SortKey::Name => "json_extract(character_json, '$.name')",
        SortKey::AttackPoint => "json_extract(character_json, '$.attackPoint')",
        SortKey::CreatedAt => "json_extract(character_json, '$.createdAt')",
    };
    let direction = match direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    };

    format!("ORDER BY {} {}, rowid", column, direction)
}

fn db_err(error: sqlx::Error) -> StoreError {
    StoreError::Database(error.to_string())
}
