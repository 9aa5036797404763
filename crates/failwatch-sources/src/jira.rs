//! Ticket tracker client
//!
//! Filing one report is four calls: create the issue, find the board's
//! active sprint, move the issue into it, and set the estimate. Only the
//! first is required; failures of the follow-up calls are logged and leave
//! the created issue in place.

use crate::config::JiraConfig;
use crate::error::{TicketError, TicketResult};
use failwatch_core::FailureReport;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Issue key assigned by the tracker, opaque to the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueKey(pub String);

impl std::fmt::Display for IssueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happened while filing one report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketReceipt {
    /// Created issue
    pub key: IssueKey,
    /// Sprint the issue was added to
    pub sprint_id: Option<u64>,
    /// Whether the estimate was written
    pub estimated: bool,
}

/// Destination for rendered reports
#[async_trait::async_trait]
pub trait TicketSink: Send + Sync {
    /// File one report, optionally assigned
    async fn file(&self, report: &FailureReport, assignee: Option<&str>)
        -> TicketResult<TicketReceipt>;
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Debug, Deserialize)]
struct SprintPage {
    #[serde(default)]
    values: Vec<Sprint>,
}

#[derive(Debug, Deserialize)]
struct Sprint {
    id: u64,
    #[serde(default)]
    state: String,
}

/// HTTP client for the ticket tracker
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: reqwest::Client,
    config: JiraConfig,
}

impl JiraClient {
    /// Create client from configuration
    ///
    /// # Errors
    /// - `TicketError::InvalidConfig` if the token is not a valid header value
    /// - `TicketError::Network` if the HTTP client cannot be built
    pub fn new(config: JiraConfig) -> TicketResult<Self> {
        if config.token.is_empty() {
            tracing::warn!("Ticket tracker token is empty; requests will be unauthenticated");
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| TicketError::InvalidConfig("token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// Request body creating an issue for a report
    #[must_use]
    pub fn issue_body(&self, report: &FailureReport, assignee: Option<&str>) -> Value {
        let mut fields = json!({
            "project": { "key": self.config.project_key },
            "summary": report.summary,
            "description": report.description,
            "issuetype": { "name": self.config.issue_type },
        });
        if let Some(assignee) = assignee {
            fields["assignee"] = json!({ "name": self.config.qualified_user(assignee) });
        }
        json!({ "fields": fields })
    }

    /// Create an issue
    ///
    /// # Errors
    /// Returns `TicketError` if the call fails or the response has no key
    pub async fn create_issue(
        &self,
        report: &FailureReport,
        assignee: Option<&str>,
    ) -> TicketResult<IssueKey> {
        let body = self.issue_body(report, assignee);
        let response = self
            .send(Method::POST, "/rest/api/2/issue", Some(&body), "create issue")
            .await?;
        let created: CreatedIssue = serde_json::from_str(&response.text().await?)?;
        Ok(IssueKey(created.key))
    }

    /// Id of the board's active sprint
    ///
    /// # Errors
    /// `TicketError::NoActiveSprint` if no sprint on the board is active
    pub async fn active_sprint(&self) -> TicketResult<u64> {
        let path = format!("/rest/agile/1.0/board/{}/sprint", self.config.board_id);
        let response = self.send(Method::GET, &path, None, "list sprints").await?;
        let page: SprintPage = serde_json::from_str(&response.text().await?)?;

        page.values
            .into_iter()
            .find(|sprint| sprint.state == "active")
            .map(|sprint| sprint.id)
            .ok_or(TicketError::NoActiveSprint {
                board_id: self.config.board_id,
            })
    }

    /// Move an issue into a sprint
    ///
    /// # Errors
    /// Returns `TicketError` if the call fails
    pub async fn add_to_sprint(&self, key: &IssueKey, sprint_id: u64) -> TicketResult<()> {
        let path = format!("/rest/agile/1.0/sprint/{sprint_id}/issue");
        let body = json!({ "issues": [key.0] });
        self.send(Method::POST, &path, Some(&body), "add to sprint")
            .await
            .map(drop)
    }

    /// Write the configured estimate onto an issue
    ///
    /// # Errors
    /// Returns `TicketError` if the call fails
    pub async fn set_estimate(&self, key: &IssueKey) -> TicketResult<()> {
        let path = format!("/rest/api/2/issue/{key}");
        let mut fields = serde_json::Map::new();
        fields.insert(
            self.config.estimate_field.clone(),
            json!(self.config.estimate_value),
        );
        let body = json!({ "fields": fields });
        self.send(Method::PUT, &path, Some(&body), "set estimate")
            .await
            .map(drop)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        operation: &'static str,
    ) -> TicketResult<Response> {
        let url = format!("{}{path}", self.config.base_url);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TicketError::api(operation, status.as_u16(), body))
    }
}

#[async_trait::async_trait]
impl TicketSink for JiraClient {
    async fn file(
        &self,
        report: &FailureReport,
        assignee: Option<&str>,
    ) -> TicketResult<TicketReceipt> {
        let key = self.create_issue(report, assignee).await?;
        tracing::info!("Created issue {} for {}", key, report.family);

        let sprint_id = match self.active_sprint().await {
            Ok(sprint_id) => match self.add_to_sprint(&key, sprint_id).await {
                Ok(()) => {
                    tracing::info!("Added issue {} to sprint {}", key, sprint_id);
                    Some(sprint_id)
                }
                Err(e) => {
                    tracing::warn!("Error adding issue {} to sprint: {}", key, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Error fetching sprints: {}", e);
                None
            }
        };

        let estimated = match self.set_estimate(&key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Error setting estimate on {}: {}", key, e);
                false
            }
        };

        Ok(TicketReceipt {
            key,
            sprint_id,
            estimated,
        })
    }
}
