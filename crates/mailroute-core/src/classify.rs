//! Ticket-type classification.
//!
//! Maps an analysis onto an outbound ticket category with an ordered rule
//! chain. The first matching rule wins; rules are not scored:
//!
//! 1. "bug report" request, or "bug"/"crash" in the content → Jira bug
//! 2. "feature request" request, or "feature" in content/subject → Jira feature
//! 3. "epic" in content/subject → Jira epic
//! 4. "story" in content/subject → Jira story
//! 5. "task" in content/subject → Jira task
//! 6. "support request" request, or incident language in the content →
//!    ServiceNow incident
//! 7. anything else → ServiceNow request
//!
//! Emails matching several rules are classified by the earliest one, so
//! the order above is part of the contract.

use std::fmt;

use serde::Serialize;

use crate::analysis::EmailAnalysis;

/// Content phrases that signal an incident (rule 6).
const INCIDENT_PHRASES: [&str; 6] = [
    "incident",
    "error",
    "broken",
    "trouble",
    "not working",
    "reset",
];

/// External system a ticket is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TicketSystem {
    /// Issue tracker.
    Jira,
    /// Incident system.
    ServiceNow,
}

impl TicketSystem {
    /// Human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Jira => "Jira",
            Self::ServiceNow => "ServiceNow",
        }
    }
}

impl fmt::Display for TicketSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Outbound ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketType {
    /// Jira bug.
    JiraBug,
    /// Jira feature.
    JiraFeature,
    /// Jira epic.
    JiraEpic,
    /// Jira story.
    JiraStory,
    /// Jira task.
    JiraTask,
    /// Jira incident.
    JiraIncident,
    /// ServiceNow incident.
    #[serde(rename = "servicenow-incident")]
    ServiceNowIncident,
    /// ServiceNow request.
    #[serde(rename = "servicenow-request")]
    ServiceNowRequest,
}

impl TicketType {
    /// Wire representation, e.g. `jira-bug`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JiraBug => "jira-bug",
            Self::JiraFeature => "jira-feature",
            Self::JiraEpic => "jira-epic",
            Self::JiraStory => "jira-story",
            Self::JiraTask => "jira-task",
            Self::JiraIncident => "jira-incident",
            Self::ServiceNowIncident => "servicenow-incident",
            Self::ServiceNowRequest => "servicenow-request",
        }
    }

    /// System this category is routed to.
    #[must_use]
    pub const fn system(&self) -> TicketSystem {
        match self {
            Self::ServiceNowIncident | Self::ServiceNowRequest => TicketSystem::ServiceNow,
            _ => TicketSystem::Jira,
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a request by its type label, subject and content.
#[must_use]
pub fn classify(request_type: &str, subject: &str, content: &str) -> TicketType {
    let request_type = request_type.trim().to_lowercase();
    let subject = subject.to_lowercase();
    let content = content.to_lowercase();
    let either = |word: &str| content.contains(word) || subject.contains(word);

    if request_type == "bug report" || content.contains("bug") || content.contains("crash") {
        TicketType::JiraBug
    } else if request_type == "feature request" || either("feature") {
        TicketType::JiraFeature
    } else if either("epic") {
        TicketType::JiraEpic
    } else if either("story") {
        TicketType::JiraStory
    } else if either("task") {
        TicketType::JiraTask
    } else if request_type == "support request"
        || INCIDENT_PHRASES.iter().any(|p| content.contains(p))
    {
        TicketType::ServiceNowIncident
    } else {
        TicketType::ServiceNowRequest
    }
}

/// Classifies a validated analysis.
#[must_use]
pub fn classify_analysis(analysis: &EmailAnalysis) -> TicketType {
    classify(&analysis.request_type, &analysis.subject, &analysis.content)
}
