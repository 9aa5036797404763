//! Client configuration
//!
//! Plain values handed to each client at construction. Nothing here reads
//! the environment; see the CLI crate for that.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default query window in days
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// Default date field on reference records
pub const DEFAULT_REFERENCE_DATE_FIELD: &str = "timestamp";

/// Default page size requested from the search backend
pub const DEFAULT_MAX_HITS: usize = 10_000;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default estimation custom field
pub const DEFAULT_ESTIMATE_FIELD: &str = "customfield_12310243";

/// Search backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search URL for failure telemetry
    pub events_url: String,
    /// Search URL for reference records
    pub references_url: String,
    /// Query window, `[now-Nd/d, now/d)`
    pub lookback_days: u32,
    /// Date field filtered on reference records
    pub reference_date_field: String,
    /// Page size requested per query
    pub max_hits: usize,
    /// Per-request timeout
    pub timeout: Duration,
}

impl SearchConfig {
    /// Create configuration for the two search URLs
    #[must_use]
    pub fn new(events_url: impl Into<String>, references_url: impl Into<String>) -> Self {
        Self {
            events_url: events_url.into(),
            references_url: references_url.into(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            reference_date_field: DEFAULT_REFERENCE_DATE_FIELD.to_string(),
            max_hits: DEFAULT_MAX_HITS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// With query window
    #[inline]
    #[must_use]
    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    /// With reference date field
    #[inline]
    #[must_use]
    pub fn with_reference_date_field(mut self, field: impl Into<String>) -> Self {
        self.reference_date_field = field.into();
        self
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Ticket tracker configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Tracker base URL, without trailing slash
    pub base_url: String,
    /// Bearer token
    pub token: String,
    /// Project receiving new tickets
    pub project_key: String,
    /// Board whose active sprint receives new tickets
    pub board_id: u64,
    /// Domain appended to assignee names
    pub user_domain: String,
    /// Issue type name
    pub issue_type: String,
    /// Estimation custom field
    pub estimate_field: String,
    /// Estimate written to new tickets
    pub estimate_value: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl JiraConfig {
    /// Create configuration; line breaks in the token are stripped
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        token: impl AsRef<str>,
        project_key: impl Into<String>,
        board_id: u64,
        user_domain: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.as_ref().replace(['\r', '\n'], ""),
            project_key: project_key.into(),
            board_id,
            user_domain: user_domain.into(),
            issue_type: "Task".to_string(),
            estimate_field: DEFAULT_ESTIMATE_FIELD.to_string(),
            estimate_value: 1,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// With issue type
    #[inline]
    #[must_use]
    pub fn with_issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.issue_type = issue_type.into();
        self
    }

    /// With estimation field and value
    #[inline]
    #[must_use]
    pub fn with_estimate(mut self, field: impl Into<String>, value: u32) -> Self {
        self.estimate_field = field.into();
        self.estimate_value = value;
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fully qualified user name for an assignee
    #[inline]
    #[must_use]
    pub fn qualified_user(&self, assignee: &str) -> String {
        format!("{assignee}@{}", self.user_domain)
    }
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("project_key", &self.project_key)
            .field("board_id", &self.board_id)
            .field("user_domain", &self.user_domain)
            .field("issue_type", &self.issue_type)
            .field("estimate_field", &self.estimate_field)
            .field("estimate_value", &self.estimate_value)
            .field("timeout", &self.timeout)
            .finish()
    }
}
