pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{Character, CharacterDraft};
pub use error::DomainError;
pub use ids::CharacterId;
pub use value_objects::{Address, AttackPoint, Priority};
