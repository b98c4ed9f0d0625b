//! Value objects - Immutable objects defined by their attributes

mod address;
mod attack_point;
mod priority;

pub use address::Address;
pub use attack_point::AttackPoint;
pub use priority::Priority;
