//! Submission target that creates nothing.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;

use super::{IncidentSystem, IssueTracker, SubmissionError};
use crate::ticket::{JiraTicket, ServiceNowTicket};

/// Logs tickets instead of sending them and hands out `DRY-n` identifiers.
///
/// One instance can serve as both the issue tracker and the incident
/// system; the counter is shared so identifiers stay unique per run.
#[derive(Debug, Default)]
pub struct DryRunSystem {
    next: AtomicU64,
}

impl DryRunSystem {
    /// Creates a dry-run target starting at `DRY-1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        format!("DRY-{}", self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// JSON of the ticket that would have been sent.
fn payload(ticket: &impl Serialize) -> String {
    serde_json::to_string(ticket).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Dry run: ticket could not be serialized");
        format!("<unserializable: {e}>")
    })
}

#[async_trait]
impl IssueTracker for DryRunSystem {
    async fn create_issue(&self, ticket: &JiraTicket) -> Result<String, SubmissionError> {
        let id = self.next_id();
        let payload = payload(ticket);
        tracing::info!(%id, kind = ?ticket.kind, %payload, "Dry run: Jira issue not sent");
        Ok(id)
    }
}

#[async_trait]
impl IncidentSystem for DryRunSystem {
    async fn create_record(&self, ticket: &ServiceNowTicket) -> Result<String, SubmissionError> {
        let id = self.next_id();
        let payload = payload(ticket);
        tracing::info!(%id, kind = ticket.kind.as_str(), %payload, "Dry run: ServiceNow record not sent");
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analysis::EmailAnalysis;
    use crate::classify::TicketType;
    use crate::ticket::{Ticket, build_ticket};

    #[tokio::test]
    async fn test_sequential_ids_across_systems() {
        let system = DryRunSystem::new();
        let analysis = EmailAnalysis {
            subject: "s".into(),
            ..EmailAnalysis::default()
        };

        let Ticket::Jira(jira) = build_ticket(&analysis, TicketType::JiraStory) else {
            panic!("expected jira ticket");
        };
        let Ticket::ServiceNow(record) = build_ticket(&analysis, TicketType::ServiceNowRequest)
        else {
            panic!("expected servicenow ticket");
        };

        assert_eq!(system.create_issue(&jira).await.unwrap(), "DRY-1");
        assert_eq!(system.create_record(&record).await.unwrap(), "DRY-2");
        assert_eq!(system.create_issue(&jira).await.unwrap(), "DRY-3");
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("no wire form"))
        }
    }

    #[test]
    fn test_payload_reports_serialization_failure() {
        assert_eq!(payload(&Unserializable), "<unserializable: no wire form>");
        assert!(payload(&"ok").contains("ok"));
    }
}
