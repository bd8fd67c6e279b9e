//! ServiceNow Table API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::jira::http_failure;
use super::{IncidentSystem, SubmissionError, render_description};
use crate::analysis::Priority;
use crate::ticket::ServiceNowTicket;

/// Creates incident and request records on a ServiceNow instance.
#[derive(Debug, Clone)]
pub struct ServiceNowClient {
    http: reqwest::Client,
    instance_url: String,
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct TableResponse {
    result: CreatedRecord,
}

#[derive(Deserialize)]
struct CreatedRecord {
    number: String,
}

impl ServiceNowClient {
    /// Creates a client for the given instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        instance_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            instance_url: instance_url.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        })
    }
}

/// Table API urgency: 1 high, 2 medium, 3 low.
const fn urgency(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "1",
        Priority::Medium => "2",
        Priority::Low => "3",
    }
}

#[async_trait]
impl IncidentSystem for ServiceNowClient {
    async fn create_record(&self, ticket: &ServiceNowTicket) -> Result<String, SubmissionError> {
        let url = format!(
            "{}/api/now/table/{}",
            self.instance_url,
            ticket.kind.table()
        );
        tracing::debug!(%url, kind = ticket.kind.as_str(), "Creating ServiceNow record");

        let body = json!({
            "short_description": ticket.fields.title,
            "description": render_description(&ticket.fields),
            "urgency": urgency(ticket.fields.priority),
        });

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SubmissionError::servicenow(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::servicenow(http_failure(status, &body)));
        }

        let created: TableResponse = response
            .json()
            .await
            .map_err(|e| SubmissionError::servicenow(format!("invalid response body: {e}")))?;
        Ok(created.result.number)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analysis::EmailAnalysis;
    use crate::classify::TicketType;
    use crate::ticket::{Ticket, build_ticket};
    use httpmock::prelude::*;

    fn record(ticket_type: TicketType) -> ServiceNowTicket {
        let analysis = EmailAnalysis {
            priority: Some(Priority::Low),
            account_number: Some("ACC9".into()),
            subject: "VPN broken".into(),
            content: "Cannot connect".into(),
            ..EmailAnalysis::default()
        };
        match build_ticket(&analysis, ticket_type) {
            Ticket::ServiceNow(record) => record,
            Ticket::Jira(_) => panic!("expected servicenow ticket"),
        }
    }

    fn client(server: &MockServer) -> ServiceNowClient {
        ServiceNowClient::new(&server.base_url(), "admin", "pw", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_create_incident() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/now/table/incident")
                    .header_exists("authorization")
                    .json_body_includes(r#"{"short_description": "VPN broken", "urgency": "3"}"#)
                    .body_includes("Account Number: ACC9");
                then.status(201)
                    .json_body(serde_json::json!({"result": {"number": "INC0010001"}}));
            })
            .await;

        let number = client(&server)
            .create_record(&record(TicketType::ServiceNowIncident))
            .await
            .unwrap();
        assert_eq!(number, "INC0010001");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_request_uses_request_table() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/now/table/sc_request");
                then.status(201)
                    .json_body(serde_json::json!({"result": {"number": "REQ0001"}}));
            })
            .await;

        let number = client(&server)
            .create_record(&record(TicketType::ServiceNowRequest))
            .await
            .unwrap();
        assert_eq!(number, "REQ0001");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unexpected_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(serde_json::json!({"status": "ok"}));
            })
            .await;

        let err = client(&server)
            .create_record(&record(TicketType::ServiceNowIncident))
            .await
            .unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Failed to create ServiceNow ticket: invalid response body")
        );
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503);
            })
            .await;

        let err = client(&server)
            .create_record(&record(TicketType::ServiceNowIncident))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to create ServiceNow ticket: HTTP 503");
    }
}
