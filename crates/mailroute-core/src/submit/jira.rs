//! Jira REST v2 client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{IssueTracker, SubmissionError, render_description};
use crate::analysis::Priority;
use crate::ticket::JiraTicket;

/// Maximum length of a response body quoted in an error message.
const ERROR_BODY_LIMIT: usize = 200;

/// Creates issues in a Jira project.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    project_key: String,
    username: String,
    api_token: String,
}

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

impl JiraClient {
    /// Creates a client for the given site and project.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        project_key: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_key: project_key.into(),
            username: username.into(),
            api_token: api_token.into(),
        })
    }

    fn payload(&self, ticket: &JiraTicket) -> serde_json::Value {
        json!({
            "fields": {
                "project": { "key": self.project_key },
                "summary": ticket.fields.title,
                "description": render_description(&ticket.fields),
                "issuetype": { "name": ticket.kind.issue_type_name() },
                "priority": { "name": priority_name(ticket.fields.priority) },
            }
        })
    }
}

const fn priority_name(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn create_issue(&self, ticket: &JiraTicket) -> Result<String, SubmissionError> {
        let url = format!("{}/rest/api/2/issue", self.base_url);
        tracing::debug!(%url, kind = ?ticket.kind, "Creating Jira issue");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.api_token))
            .json(&self.payload(ticket))
            .send()
            .await
            .map_err(|e| SubmissionError::jira(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::jira(http_failure(status, &body)));
        }

        let created: CreatedIssue = response
            .json()
            .await
            .map_err(|e| SubmissionError::jira(format!("invalid response body: {e}")))?;
        Ok(created.key)
    }
}

/// Formats a non-2xx response, without echoing bodies of auth failures.
pub(super) fn http_failure(status: reqwest::StatusCode, body: &str) -> String {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return format!("HTTP {}: authentication failed", status.as_u16());
    }
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        let truncated: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        format!("HTTP {}: {truncated}", status.as_u16())
    }
}
