//! Import configuration.
//!
//! Key material and the candidate id list are explicit constructor-injected
//! state: the service never reads process-wide configuration at call time.

use archref_domain::Address;

/// Catalog id used when no candidate list is configured.
pub const DEFAULT_CATALOG_ID: u64 = 1011334;

/// Immutable configuration for the randomized import flow.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// External catalog ids eligible for random import. Empty means the
    /// fixed fallback id is used.
    pub candidate_ids: Vec<u64>,
    pub public_key: String,
    pub private_key: String,
    /// Address stamped onto imported characters; `None` leaves it absent.
    pub import_address: Option<Address>,
}

impl ImportConfig {
    pub fn new(
        candidate_ids: Vec<u64>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        import_address: Option<Address>,
    ) -> Self {
        Self {
            candidate_ids,
            public_key: public_key.into(),
            private_key: private_key.into(),
            import_address,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `CATALOG_PUBLIC_KEY` / `CATALOG_PRIVATE_KEY` (default empty)
    /// - `CATALOG_CHARACTER_IDS` - comma-separated candidate ids
    /// - `IMPORT_PLACEHOLDER_ADDRESS` - `false` to leave addresses absent
    pub fn from_env() -> Self {
        let public_key = std::env::var("CATALOG_PUBLIC_KEY").unwrap_or_default();
        let private_key = std::env::var("CATALOG_PRIVATE_KEY").unwrap_or_default();

        let candidate_ids = std::env::var("CATALOG_CHARACTER_IDS")
            .map(|raw| {
                raw.split(',')
                    .filter_map(|part| part.trim().parse::<u64>().ok())
                    .collect()
            })
            .unwrap_or_default();

        let import_address = match std::env::var("IMPORT_PLACEHOLDER_ADDRESS").as_deref() {
            Ok("false") | Ok("0") => None,
            _ => Some(Self::placeholder_address()),
        };

        Self {
            candidate_ids,
            public_key,
            private_key,
            import_address,
        }
    }

    /// The fixed placeholder address stamped onto imported characters.
    pub fn placeholder_address() -> Address {
        Address::new("Hollywood Boulevard", "Los Angeles", "90028")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_address_is_stable() {
        let address = ImportConfig::placeholder_address();
        assert_eq!(address.street, "Hollywood Boulevard");
        assert_eq!(address.city, "Los Angeles");
        assert_eq!(address.zip_code, "90028");
    }
}
