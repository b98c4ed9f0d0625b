//! HTTP client for the external character catalog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::ports::{CatalogCharacterDetail, CatalogClient, CatalogError, CatalogResponse};
use crate::signing::SignedParams;

/// Default catalog base URL.
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://gateway.marvel.com";

/// Client for the catalog's public character endpoint.
#[derive(Clone)]
pub struct CatalogHttpClient {
    client: Client,
    base_url: String,
}

impl CatalogHttpClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, 30)
    }

    /// Create client with custom timeout (for testing).
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create client from the `CATALOG_BASE_URL` environment variable,
    /// falling back to the default gateway.
    pub fn from_env() -> Self {
        let base_url = std::env::var("CATALOG_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_CATALOG_BASE_URL.to_string());
        Self::new(&base_url)
    }
}

impl Default for CatalogHttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_BASE_URL)
    }
}

#[async_trait]
impl CatalogClient for CatalogHttpClient {
    async fn fetch_by_id(
        &self,
        id: u64,
        params: &SignedParams,
    ) -> Result<CatalogResponse, CatalogError> {
        let response = self
            .client
            .get(format!("{}/v1/public/characters/{}", self.base_url, id))
            .query(&[
                ("ts", params.nonce.as_str()),
                ("apikey", params.public_key.as_str()),
                ("hash", params.hash.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| CatalogError::RequestFailed(e.to_string()))?;
            return Err(CatalogError::RequestFailed(error_text));
        }

        let envelope: CatalogEnvelope = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        Ok(envelope.into())
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CatalogEnvelope {
    #[serde(default)]
    data: CatalogData,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogData {
    #[serde(default)]
    results: Vec<CatalogResult>,
}

#[derive(Debug, Deserialize)]
struct CatalogResult {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    modified: Option<String>,
}

impl From<CatalogEnvelope> for CatalogResponse {
    fn from(envelope: CatalogEnvelope) -> Self {
        let details = envelope
            .data
            .results
            .into_iter()
            .map(|result| CatalogCharacterDetail {
                name: result.name,
                description: result.description,
                modified: result.modified.as_deref().and_then(parse_modified),
            })
            .collect();
        Self { details }
    }
}

/// Parse the catalog's offset timestamps (e.g. `2014-04-29T14:18:17-0400`).
///
/// The upstream API is known to emit garbage dates for some records
/// (negative years); those read as absent rather than failing the import.
fn parse_modified(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(_) => {
            tracing::warn!(raw, "Unparseable modified timestamp from catalog");
            None
        }
    }
}
