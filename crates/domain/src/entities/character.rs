//! Character entity and its validated create payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::CharacterId;
use crate::value_objects::{Address, AttackPoint, Priority};

/// A character record in the catalog.
///
/// Identity is assigned by the record store on first save, so a freshly
/// created character carries no id. The struct-level `default` lets a
/// partial JSON object decode into a candidate value with defaulted fields,
/// which the patch merge relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Character {
    pub id: Option<CharacterId>,
    pub name: String,
    pub description: String,
    pub attack_point: AttackPoint,
    pub address: Option<Address>,
    pub priority: Priority,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated create payload: a character without identity.
///
/// Construction enforces the textual invariants; the attack point range is
/// enforced by `AttackPoint` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDraft {
    pub name: String,
    pub description: String,
    pub attack_point: AttackPoint,
    pub address: Option<Address>,
    pub priority: Priority,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CharacterDraft {
    /// Create a new validated draft.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if name or description is empty
    /// after trimming.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        attack_point: AttackPoint,
        address: Option<Address>,
        priority: Priority,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Character name cannot be empty"));
        }
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation(
                "Character description cannot be empty",
            ));
        }

        Ok(Self {
            name,
            description,
            attack_point,
            address,
            priority,
            created_at,
            updated_at,
        })
    }

    /// Convert the draft into an id-less character ready for the store.
    pub fn into_character(self) -> Character {
        Character {
            id: None,
            name: self.name,
            description: self.description,
            attack_point: self.attack_point,
            address: self.address,
            priority: self.priority,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
