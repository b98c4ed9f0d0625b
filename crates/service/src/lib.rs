//! Character catalog service.
//!
//! The core is [`use_cases::CharacterService`]: cache-aside reads, a
//! registry-driven partial update, and a signed import flow against an
//! external catalog API. Everything it talks to sits behind the port traits
//! in [`ports`]; concrete adapters live in [`infrastructure`].

pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod signing;
pub mod use_cases;

pub use config::ImportConfig;
pub use use_cases::{CharacterError, CharacterService};
