//! Validated attack point newtype.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Minimum allowed attack point value (inclusive)
pub const MIN_ATTACK_POINT: i32 = 1;

/// Maximum allowed attack point value (inclusive)
pub const MAX_ATTACK_POINT: i32 = 13;

/// An attack point score, valid by construction (1..=13).
///
/// The `try_from` serde representation means every decode path enforces the
/// range, including patch candidates built from untyped JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct AttackPoint(i32);

impl AttackPoint {
    /// Create a new validated attack point.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the value lies outside 1..=13.
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if !(MIN_ATTACK_POINT..=MAX_ATTACK_POINT).contains(&value) {
            return Err(DomainError::validation(format!(
                "Attack point must be between {} and {}, got {}",
                MIN_ATTACK_POINT, MAX_ATTACK_POINT, value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl Default for AttackPoint {
    fn default() -> Self {
        Self(MIN_ATTACK_POINT)
    }
}

impl fmt::Display for AttackPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for AttackPoint {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AttackPoint> for i32 {
    fn from(value: AttackPoint) -> Self {
        value.0
    }
}
