//! Outbound ticket records.

use std::sync::Arc;

use mailroute_mime::Attachment;
use serde::Serialize;

use crate::analysis::{EmailAnalysis, Priority, non_blank};
use crate::classify::{TicketSystem, TicketType};

/// Title used when the analysis has no subject.
pub const UNTITLED: &str = "No Subject";

/// Jira issue kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JiraIssueKind {
    /// Defect.
    Bug,
    /// New functionality.
    Feature,
    /// Large body of work.
    Epic,
    /// User story.
    Story,
    /// Unit of work.
    Task,
    /// Operational incident.
    Incident,
}

impl JiraIssueKind {
    /// Jira issue type name as shown in a project.
    #[must_use]
    pub const fn issue_type_name(&self) -> &'static str {
        match self {
            Self::Bug => "Bug",
            Self::Feature => "New Feature",
            Self::Epic => "Epic",
            Self::Story => "Story",
            Self::Task => "Task",
            Self::Incident => "Incident",
        }
    }
}

/// ServiceNow record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceNowKind {
    /// Something is broken.
    Incident,
    /// Something is wanted.
    Request,
}

impl ServiceNowKind {
    /// Table API table the record is created in.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Incident => "incident",
            Self::Request => "sc_request",
        }
    }

    /// Lowercase label used in confirmations.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Incident => "incident",
            Self::Request => "request",
        }
    }
}

/// Fields shared by tickets of either system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFields {
    /// Summary line.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Urgency.
    pub priority: Priority,
    /// Customer account number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    /// Customer identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Attachments of the source email.
    pub attachments: Vec<Arc<Attachment>>,
}

/// Ticket destined for the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JiraTicket {
    /// Issue kind.
    pub kind: JiraIssueKind,
    /// Shared fields.
    #[serde(flatten)]
    pub fields: TicketFields,
}

/// Record destined for the incident system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceNowTicket {
    /// Record kind.
    pub kind: ServiceNowKind,
    /// Shared fields.
    #[serde(flatten)]
    pub fields: TicketFields,
}

/// A ticket for one of the two destination systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "system", rename_all = "lowercase")]
pub enum Ticket {
    /// Issue tracker ticket.
    Jira(JiraTicket),
    /// Incident system record.
    ServiceNow(ServiceNowTicket),
}

impl Ticket {
    /// Destination system.
    #[must_use]
    pub const fn system(&self) -> TicketSystem {
        match self {
            Self::Jira(_) => TicketSystem::Jira,
            Self::ServiceNow(_) => TicketSystem::ServiceNow,
        }
    }

    /// Shared fields.
    #[must_use]
    pub const fn fields(&self) -> &TicketFields {
        match self {
            Self::Jira(ticket) => &ticket.fields,
            Self::ServiceNow(ticket) => &ticket.fields,
        }
    }
}

/// Builds the ticket for a validated analysis.
#[must_use]
pub fn build_ticket(analysis: &EmailAnalysis, ticket_type: TicketType) -> Ticket {
    let title = if analysis.subject.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        analysis.subject.clone()
    };

    let fields = TicketFields {
        title,
        description: analysis.content.clone(),
        priority: analysis.priority.unwrap_or_default(),
        account_number: non_blank(analysis.account_number.as_deref()).map(str::to_string),
        customer_id: non_blank(analysis.customer_id.as_deref()).map(str::to_string),
        attachments: analysis.attachments.clone(),
    };

    match ticket_type {
        TicketType::JiraBug => jira(JiraIssueKind::Bug, fields),
        TicketType::JiraFeature => jira(JiraIssueKind::Feature, fields),
        TicketType::JiraEpic => jira(JiraIssueKind::Epic, fields),
        TicketType::JiraStory => jira(JiraIssueKind::Story, fields),
        TicketType::JiraTask => jira(JiraIssueKind::Task, fields),
        TicketType::JiraIncident => jira(JiraIssueKind::Incident, fields),
        TicketType::ServiceNowIncident => Ticket::ServiceNow(ServiceNowTicket {
            kind: ServiceNowKind::Incident,
            fields,
        }),
        TicketType::ServiceNowRequest => Ticket::ServiceNow(ServiceNowTicket {
            kind: ServiceNowKind::Request,
            fields,
        }),
    }
}

const fn jira(kind: JiraIssueKind, fields: TicketFields) -> Ticket {
    Ticket::Jira(JiraTicket { kind, fields })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn analysis() -> EmailAnalysis {
        EmailAnalysis {
            request_type: "Bug Report".into(),
            priority: Some(Priority::High),
            account_number: Some("ACC123456".into()),
            subject: "Login crash".into(),
            content: "The app crashes on login".into(),
            ..EmailAnalysis::default()
        }
    }

    #[test]
    fn test_build_jira_bug() {
        let ticket = build_ticket(&analysis(), TicketType::JiraBug);
        let Ticket::Jira(jira) = &ticket else {
            panic!("expected jira ticket");
        };
        assert_eq!(jira.kind, JiraIssueKind::Bug);
        assert_eq!(jira.fields.title, "Login crash");
        assert_eq!(jira.fields.description, "The app crashes on login");
        assert_eq!(jira.fields.priority, Priority::High);
        assert_eq!(jira.fields.account_number.as_deref(), Some("ACC123456"));
        assert_eq!(ticket.system(), TicketSystem::Jira);
    }

    #[test]
    fn test_blank_subject_gets_placeholder_title() {
        let source = EmailAnalysis {
            subject: "  ".into(),
            ..analysis()
        };
        let ticket = build_ticket(&source, TicketType::ServiceNowRequest);
        assert_eq!(ticket.fields().title, UNTITLED);
        assert!(matches!(
            ticket,
            Ticket::ServiceNow(ServiceNowTicket {
                kind: ServiceNowKind::Request,
                ..
            })
        ));
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        let source = EmailAnalysis {
            priority: None,
            ..analysis()
        };
        let ticket = build_ticket(&source, TicketType::ServiceNowIncident);
        assert_eq!(ticket.fields().priority, Priority::Medium);
    }

    #[test]
    fn test_attachments_are_shared() {
        let attachment = Arc::new(Attachment::new("log.txt", "text/plain", "trace"));
        let source = EmailAnalysis {
            attachments: vec![Arc::clone(&attachment)],
            ..analysis()
        };
        let ticket = build_ticket(&source, TicketType::JiraTask);
        assert!(Arc::ptr_eq(&ticket.fields().attachments[0], &attachment));
    }

    #[test]
    fn test_every_ticket_type_routes_to_its_system() {
        for ticket_type in [
            TicketType::JiraBug,
            TicketType::JiraFeature,
            TicketType::JiraEpic,
            TicketType::JiraStory,
            TicketType::JiraTask,
            TicketType::JiraIncident,
            TicketType::ServiceNowIncident,
            TicketType::ServiceNowRequest,
        ] {
            let ticket = build_ticket(&analysis(), ticket_type);
            assert_eq!(ticket.system(), ticket_type.system());
        }
    }

    #[test]
    fn test_serializes_with_system_tag() {
        let ticket = build_ticket(&analysis(), TicketType::JiraBug);
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["system"], "jira");
        assert_eq!(json["kind"], "bug");
        assert_eq!(json["title"], "Login crash");
        assert_eq!(json["accountNumber"], "ACC123456");
        assert!(json.get("customerId").is_none());
    }
}
