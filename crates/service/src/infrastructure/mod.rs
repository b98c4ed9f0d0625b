//! Concrete adapters behind the service's port traits.

pub mod cache;
pub mod catalog;
pub mod clock;
pub mod events;
pub mod sqlite;

pub use cache::InMemoryCharacterCache;
pub use catalog::CatalogHttpClient;
pub use clock::{SystemClock, SystemRandom};
pub use events::{BroadcastPublisher, CharacterEvent};
pub use sqlite::SqliteCharacterStore;
