//! Search backend client
//!
//! Issues two bounded queries per run: failed telemetry events and the
//! reference records used to confirm them. Either query failing is fatal to
//! the run. Individual unreadable documents are skipped and counted.

use crate::config::SearchConfig;
use crate::error::{SourceError, SourceResult};
use crate::wire::{Decoded, EventDoc, ReferenceDoc, SearchResponse};
use failwatch_core::{FailureEvent, ReferenceRecord};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Source of raw failures and reference records
#[async_trait::async_trait]
pub trait FailureSource: Send + Sync {
    /// Failed runs within the query window
    async fn fetch_failures(&self) -> SourceResult<Decoded<FailureEvent>>;

    /// Authoritative run results within the query window
    async fn fetch_references(&self) -> SourceResult<Decoded<ReferenceRecord>>;
}

/// Both inputs of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// Failure events that decoded
    pub events: Vec<FailureEvent>,
    /// Reference records that decoded
    pub references: Vec<ReferenceRecord>,
    /// Event documents skipped as unreadable
    pub skipped_events: usize,
    /// Reference documents skipped as unreadable
    pub skipped_references: usize,
}

/// Fetch both inputs of a run concurrently
///
/// # Errors
/// Returns the first `SourceError` from either query
pub async fn fetch_batch(source: &dyn FailureSource) -> SourceResult<Batch> {
    let (events, references) =
        tokio::try_join!(source.fetch_failures(), source.fetch_references())?;
    tracing::info!(
        "Fetched {} failure events and {} reference records ({} and {} unreadable)",
        events.items.len(),
        references.items.len(),
        events.skipped,
        references.skipped
    );
    Ok(Batch {
        events: events.items,
        references: references.items,
        skipped_events: events.skipped,
        skipped_references: references.skipped,
    })
}

/// HTTP client for the search backend
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    config: SearchConfig,
}

impl SearchClient {
    /// Create client from configuration
    ///
    /// # Errors
    /// - `SourceError::InvalidConfig` if a URL is empty
    /// - `SourceError::Network` if the HTTP client cannot be built
    pub fn new(config: SearchConfig) -> SourceResult<Self> {
        if config.events_url.trim().is_empty() {
            return Err(SourceError::InvalidConfig("events URL is empty".to_string()));
        }
        if config.references_url.trim().is_empty() {
            return Err(SourceError::InvalidConfig(
                "references URL is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Query body for failed telemetry events
    #[must_use]
    pub fn events_query(&self) -> Value {
        json!({
            "size": self.config.max_hits,
            "query": {
                "bool": {
                    "must": [
                        self.window("uploaded"),
                        { "term": { "result.keyword": "FAIL" } }
                    ]
                }
            }
        })
    }

    /// Query body for reference records
    #[must_use]
    pub fn references_query(&self) -> Value {
        json!({
            "size": self.config.max_hits,
            "query": {
                "bool": {
                    "must": [ self.window(&self.config.reference_date_field) ]
                }
            }
        })
    }

    fn window(&self, field: &str) -> Value {
        json!({
            "range": {
                field: {
                    "gte": format!("now-{}d/d", self.config.lookback_days),
                    "lt": "now/d"
                }
            }
        })
    }

    async fn search<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &Value,
        kind: &str,
    ) -> SourceResult<Decoded<T>> {
        tracing::debug!("Querying {}", url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.decode(kind))
    }
}

#[async_trait::async_trait]
impl FailureSource for SearchClient {
    async fn fetch_failures(&self) -> SourceResult<Decoded<FailureEvent>> {
        let docs: Decoded<EventDoc> = self
            .search(&self.config.events_url, &self.events_query(), "event")
            .await?;
        Ok(docs.map(FailureEvent::from))
    }

    async fn fetch_references(&self) -> SourceResult<Decoded<ReferenceRecord>> {
        let docs: Decoded<ReferenceDoc> = self
            .search(&self.config.references_url, &self.references_query(), "reference")
            .await?;
        Ok(docs.map(ReferenceRecord::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SearchClient {
        SearchClient::new(SearchConfig::new("http://es/events", "http://es/refs").with_lookback_days(3))
            .unwrap()
    }

    #[test]
    fn events_query_filters_window_and_failures() {
        let query = client().events_query();
        let must = &query["query"]["bool"]["must"];
        assert_eq!(must[0]["range"]["uploaded"]["gte"], "now-3d/d");
        assert_eq!(must[0]["range"]["uploaded"]["lt"], "now/d");
        assert_eq!(must[1]["term"]["result.keyword"], "FAIL");
        assert_eq!(query["size"], 10_000);
    }

    #[test]
    fn references_query_uses_configured_field() {
        let client = SearchClient::new(
            SearchConfig::new("http://es/events", "http://es/refs").with_reference_date_field("finished"),
        )
        .unwrap();
        let query = client.references_query();
        assert_eq!(query["query"]["bool"]["must"][0]["range"]["finished"]["gte"], "now-7d/d");
    }

    #[test]
    fn rejects_empty_urls() {
        let err = SearchClient::new(SearchConfig::new("", "http://es/refs")).unwrap_err();
        assert!(matches!(err, SourceError::InvalidConfig(_)));
    }
}
