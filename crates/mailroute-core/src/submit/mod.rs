//! Ticket submission to the external systems.
//!
//! [`TicketSubmitter`] dispatches a [`Ticket`] to the collaborator for its
//! system and turns the returned identifier into a confirmation line.
//! Collaborators are the async seams [`IssueTracker`] and
//! [`IncidentSystem`]; the REST clients and [`DryRunSystem`] implement them.

mod dry_run;
mod jira;
mod servicenow;

use std::sync::Arc;

use async_trait::async_trait;

pub use dry_run::DryRunSystem;
pub use jira::JiraClient;
pub use servicenow::ServiceNowClient;

use crate::classify::TicketSystem;
use crate::ticket::{JiraTicket, ServiceNowTicket, Ticket, TicketFields};

/// A ticket could not be created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to create {system} ticket: {message}")]
pub struct SubmissionError {
    /// System the ticket was meant for.
    pub system: TicketSystem,
    /// What went wrong.
    pub message: String,
}

impl SubmissionError {
    /// Creates an error for a Jira submission.
    pub fn jira(message: impl Into<String>) -> Self {
        Self {
            system: TicketSystem::Jira,
            message: message.into(),
        }
    }

    /// Creates an error for a ServiceNow submission.
    pub fn servicenow(message: impl Into<String>) -> Self {
        Self {
            system: TicketSystem::ServiceNow,
            message: message.into(),
        }
    }
}

/// Issue tracker that accepts Jira tickets.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Creates an issue and returns its key, e.g. `PROJ-123`.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmissionError`] if the issue was not created.
    async fn create_issue(&self, ticket: &JiraTicket) -> Result<String, SubmissionError>;
}

/// Incident system that accepts ServiceNow records.
#[async_trait]
pub trait IncidentSystem: Send + Sync {
    /// Creates a record and returns its number, e.g. `INC0010001`.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmissionError`] if the record was not created.
    async fn create_record(&self, ticket: &ServiceNowTicket) -> Result<String, SubmissionError>;
}

/// Routes tickets to the configured systems.
#[derive(Clone, Default)]
pub struct TicketSubmitter {
    jira: Option<Arc<dyn IssueTracker>>,
    servicenow: Option<Arc<dyn IncidentSystem>>,
}

impl TicketSubmitter {
    /// Creates a submitter with no systems configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the issue tracker for Jira tickets.
    #[must_use]
    pub fn with_issue_tracker(mut self, tracker: Arc<dyn IssueTracker>) -> Self {
        self.jira = Some(tracker);
        self
    }

    /// Sets the incident system for ServiceNow tickets.
    #[must_use]
    pub fn with_incident_system(mut self, system: Arc<dyn IncidentSystem>) -> Self {
        self.servicenow = Some(system);
        self
    }

    /// Submits a ticket and returns the confirmation line.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmissionError`] if the destination is not configured
    /// or rejects the ticket.
    pub async fn submit(&self, ticket: &Ticket) -> Result<String, SubmissionError> {
        match ticket {
            Ticket::Jira(jira) => {
                let tracker = self
                    .jira
                    .as_ref()
                    .ok_or_else(|| SubmissionError::jira("not configured"))?;
                let key = tracker.create_issue(jira).await?;
                Ok(format!("Jira ticket created: {key}"))
            }
            Ticket::ServiceNow(record) => {
                let system = self
                    .servicenow
                    .as_ref()
                    .ok_or_else(|| SubmissionError::servicenow("not configured"))?;
                let number = system.create_record(record).await?;
                Ok(format!(
                    "ServiceNow {} created: {number}",
                    record.kind.as_str()
                ))
            }
        }
    }
}

impl std::fmt::Debug for TicketSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketSubmitter")
            .field("jira", &self.jira.is_some())
            .field("servicenow", &self.servicenow.is_some())
            .finish()
    }
}

/// Plain-text description sent to either system: content followed by the
/// customer identifiers and attachment names.
pub(crate) fn render_description(fields: &TicketFields) -> String {
    let mut out = fields.description.clone();

    let mut details = Vec::new();
    if let Some(account) = &fields.account_number {
        details.push(format!("Account Number: {account}"));
    }
    if let Some(customer) = &fields.customer_id {
        details.push(format!("Customer ID: {customer}"));
    }
    for attachment in &fields.attachments {
        details.push(format!(
            "Attachment: {} ({})",
            attachment.filename(),
            attachment.content_type()
        ));
    }

    if !details.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&details.join("\n"));
    }
    out
}
