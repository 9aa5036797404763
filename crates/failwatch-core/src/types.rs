//! Core types for the engine
//!
//! Defines the fundamental data shapes:
//! - Raw failure events and reference records
//! - Family keys and run numbers
//! - Engine configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of leading characters stripped from a job identifier
pub const DEFAULT_PREFIX_LEN: usize = 8;

/// Default number of reasons shown in a report summary
pub const DEFAULT_MAX_DISPLAYED_REASONS: usize = 2;

/// Logical job family, stable across runs of the same job
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyKey(String);

impl FamilyKey {
    /// Wrap an already-extracted key
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run sequence number taken from a run location
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunNumber(String);

impl RunNumber {
    /// Wrap an already-extracted run number
    #[inline]
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Run number as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A failed run as reported by the telemetry source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEvent {
    /// Raw job identifier (prefix + family + `_` + run suffix)
    pub job_identifier: String,
    /// Hierarchical run location; second-to-last segment is the run number
    pub run_location: String,
    /// Failure reason
    pub description: String,
    /// Upload time, when the source provided a readable one
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl FailureEvent {
    /// Create new event without an upload time
    #[inline]
    #[must_use]
    pub fn new(
        job_identifier: impl Into<String>,
        run_location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            job_identifier: job_identifier.into(),
            run_location: run_location.into(),
            description: description.into(),
            uploaded_at: None,
        }
    }

    /// With upload time
    #[inline]
    #[must_use]
    pub fn with_uploaded_at(mut self, uploaded_at: DateTime<Utc>) -> Self {
        self.uploaded_at = Some(uploaded_at);
        self
    }
}

/// Authoritative result of a run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunResult {
    /// Run passed
    Pass,
    /// Run failed
    Fail,
    /// Anything else the source records (aborted, unstable, ...)
    Other(String),
}

impl RunResult {
    /// Check if this result marks a failure
    #[inline]
    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail)
    }
}

impl From<String> for RunResult {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("PASS") {
            Self::Pass
        } else if trimmed.eq_ignore_ascii_case("FAIL") {
            Self::Fail
        } else {
            Self::Other(raw)
        }
    }
}

impl From<&str> for RunResult {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<RunResult> for String {
    fn from(result: RunResult) -> Self {
        match result {
            RunResult::Pass => "PASS".to_string(),
            RunResult::Fail => "FAIL".to_string(),
            RunResult::Other(raw) => raw,
        }
    }
}

/// A run's entry in the secondary source of truth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Run location, matched verbatim against `FailureEvent::run_location`
    pub location: String,
    /// Authoritative result
    pub result: RunResult,
}

impl ReferenceRecord {
    /// Create new reference record
    #[inline]
    #[must_use]
    pub fn new(location: impl Into<String>, result: impl Into<RunResult>) -> Self {
        Self {
            location: location.into(),
            result: result.into(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Characters stripped from the front of every job identifier
    pub prefix_len: usize,
    /// Reasons listed in a summary before the "and N more" suffix
    pub max_displayed_reasons: usize,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With prefix length
    #[inline]
    #[must_use]
    pub fn with_prefix_len(mut self, prefix_len: usize) -> Self {
        self.prefix_len = prefix_len;
        self
    }

    /// With summary reason limit
    #[inline]
    #[must_use]
    pub fn with_max_displayed_reasons(mut self, max: usize) -> Self {
        self.max_displayed_reasons = max;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prefix_len: DEFAULT_PREFIX_LEN,
            max_displayed_reasons: DEFAULT_MAX_DISPLAYED_REASONS,
        }
    }
}
