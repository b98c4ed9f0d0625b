//! Character priority level.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed priority scale for a character record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Priority::None).ok().as_deref(), Some("\"NONE\""));
        assert_eq!(serde_json::to_string(&Priority::High).ok().as_deref(), Some("\"HIGH\""));
    }

    #[test]
    fn defaults_to_none() {
        assert_eq!(Priority::default(), Priority::None);
    }
}
