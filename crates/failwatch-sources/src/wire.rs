//! Search backend wire format
//!
//! Hits arrive as `hits.hits[]._source`. Telemetry sources carry
//! `job_name`, `build_url`, `description` and `uploaded`; reference sources
//! carry `link` and `result`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use failwatch_core::{FailureEvent, ReferenceRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Search response envelope
///
/// Only the envelope is decoded strictly. Each `_source` is kept as raw JSON
/// and decoded on its own, so one unreadable document cannot take its
/// siblings down with it.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Outer hits object
    pub hits: Hits,
}

/// Hits container
#[derive(Debug, Clone, Deserialize)]
pub struct Hits {
    /// Matching documents
    pub hits: Vec<Hit>,
}

/// One matching document
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    /// Stored document, undecoded
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl SearchResponse {
    /// Unwrap the stored documents, in response order
    #[must_use]
    pub fn into_sources(self) -> Vec<Value> {
        self.hits.hits.into_iter().map(|hit| hit.source).collect()
    }

    /// Decode every stored document, skipping unreadable ones
    #[must_use]
    pub fn decode<T: DeserializeOwned>(self, kind: &str) -> Decoded<T> {
        decode_documents(self.into_sources(), kind)
    }
}

/// Documents that decoded, plus a count of those that did not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// Decoded documents, in response order
    pub items: Vec<T>,
    /// Documents skipped as unreadable
    pub skipped: usize,
}

impl<T> Decoded<T> {
    /// Convert every decoded item, keeping the skip count
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Decoded<U> {
        Decoded {
            items: self.items.into_iter().map(f).collect(),
            skipped: self.skipped,
        }
    }
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

/// Decode raw documents one at a time
///
/// A document that does not match `T` is logged and counted, never fatal.
pub fn decode_documents<T: DeserializeOwned>(
    documents: impl IntoIterator<Item = Value>,
    kind: &str,
) -> Decoded<T> {
    let mut decoded = Decoded::default();
    for (position, document) in documents.into_iter().enumerate() {
        match serde_json::from_value(document) {
            Ok(item) => decoded.items.push(item),
            Err(e) => {
                tracing::warn!("Skipping unreadable {} document #{}: {}", kind, position, e);
                decoded.skipped += 1;
            }
        }
    }
    decoded
}

/// Telemetry document for a failed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDoc {
    /// Raw job identifier
    pub job_name: String,
    /// Run location
    pub build_url: String,
    /// Failure reason; null reads as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Upload time
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub uploaded: Option<DateTime<Utc>>,
}

impl From<EventDoc> for FailureEvent {
    fn from(doc: EventDoc) -> Self {
        Self {
            job_identifier: doc.job_name,
            run_location: doc.build_url,
            description: doc.description,
            uploaded_at: doc.uploaded,
        }
    }
}

/// Reference document for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDoc {
    /// Run location
    pub link: String,
    /// Authoritative result; null reads as empty, which never confirms
    #[serde(default, deserialize_with = "null_as_empty")]
    pub result: String,
}

impl From<ReferenceDoc> for ReferenceRecord {
    fn from(doc: ReferenceDoc) -> Self {
        Self::new(doc.link, doc.result)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or epoch milliseconds.
/// Unreadable values become `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(uploaded: Value) -> EventDoc {
        serde_json::from_value(json!({
            "job_name": "InsightsAuthSuite_1",
            "build_url": "https://ci/job/auth/1/",
            "description": "Boom",
            "uploaded": uploaded,
        }))
        .unwrap()
    }

    #[test]
    fn parses_rfc3339_upload_time() {
        let uploaded = doc(json!("2024-03-01T10:00:00Z")).uploaded.unwrap();
        assert_eq!(uploaded.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn parses_space_separated_upload_time() {
        assert!(doc(json!("2024-03-01 10:00:00")).uploaded.is_some());
    }

    #[test]
    fn parses_epoch_millis() {
        let uploaded = doc(json!(1_709_287_200_000_i64)).uploaded.unwrap();
        assert_eq!(uploaded.timestamp(), 1_709_287_200);
    }

    #[test]
    fn unreadable_upload_time_is_none() {
        assert!(doc(json!("yesterday")).uploaded.is_none());
        assert!(doc(Value::Null).uploaded.is_none());
    }

    #[test]
    fn missing_description_and_upload_default() {
        let doc: EventDoc = serde_json::from_value(json!({
            "job_name": "InsightsAuthSuite_1",
            "build_url": "https://ci/job/auth/1/",
        }))
        .unwrap();
        assert_eq!(doc.description, "");
        assert!(doc.uploaded.is_none());
    }

    #[test]
    fn null_description_reads_as_empty() {
        let doc: EventDoc = serde_json::from_value(json!({
            "job_name": "InsightsAuthSuite_1",
            "build_url": "https://ci/job/auth/1/",
            "description": null,
        }))
        .unwrap();
        assert_eq!(doc.description, "");
    }

    #[test]
    fn null_result_reads_as_empty() {
        let doc: ReferenceDoc =
            serde_json::from_value(json!({ "link": "a/1/", "result": null })).unwrap();
        assert_eq!(doc.result, "");
        assert!(!ReferenceRecord::from(doc).result.is_fail());
    }

    #[test]
    fn envelope_decodes_sources_in_order() {
        let response: SearchResponse = serde_json::from_value(json!({
            "hits": { "hits": [
                { "_source": { "link": "a/1/", "result": "FAIL" } },
                { "_source": { "link": "a/2/", "result": "PASS" } },
            ]}
        }))
        .unwrap();
        let decoded: Decoded<ReferenceDoc> = response.decode("reference");
        let links: Vec<String> = decoded.items.into_iter().map(|d| d.link).collect();
        assert_eq!(links, vec!["a/1/", "a/2/"]);
        assert_eq!(decoded.skipped, 0);
    }

    #[test]
    fn unreadable_documents_are_skipped_not_fatal() {
        let response: SearchResponse = serde_json::from_value(json!({
            "hits": { "hits": [
                { "_source": { "job_name": "InsightsA_1", "build_url": "a/1/", "description": "x" } },
                { "_source": { "job_name": "InsightsA_2" } },
                { "_source": { "job_name": null, "build_url": "a/3/" } },
                { "_id": "no-source" },
                { "_source": { "job_name": "InsightsA_4", "build_url": "a/4/", "description": null } },
            ]}
        }))
        .unwrap();

        let decoded: Decoded<EventDoc> = response.decode("event");

        let urls: Vec<&str> = decoded.items.iter().map(|d| d.build_url.as_str()).collect();
        assert_eq!(urls, vec!["a/1/", "a/4/"]);
        assert_eq!(decoded.skipped, 3);
    }

    #[test]
    fn missing_hits_is_an_envelope_error() {
        assert!(serde_json::from_value::<SearchResponse>(json!({ "took": 3 })).is_err());
    }
}
