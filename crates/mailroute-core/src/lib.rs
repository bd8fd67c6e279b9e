//! # mailroute-core
//!
//! Routing logic for `mailroute`: turns a raw support email into a Jira
//! issue or a ServiceNow record, or hands it to a person.
//!
//! This crate provides:
//! - **Analysis** - prompt building, the provider seam and a strict
//!   response parser
//! - **Validation** - the required-field gate
//! - **Classification** - the ordered ticket-type rule chain
//! - **Submission** - Jira and ServiceNow clients plus a dry-run target
//! - **Human review** - an injectable queue for emails that need a person
//! - **Pipeline** - the per-email state machine and bulk runs
//! - **Configuration** - JSON settings with keyring-backed secrets

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod classify;
pub mod config;
pub mod credentials;
mod error;
pub mod pipeline;
pub mod review;
pub mod submit;
pub mod ticket;
pub mod validation;

pub use analysis::{
    AnalysisClient, AnalysisError, AnalysisProvider, AnalysisResponse, EmailAnalysis,
    HttpAnalysisProvider, Priority,
};
pub use classify::{TicketSystem, TicketType, classify, classify_analysis};
pub use config::Settings;
pub use credentials::{CredentialError, CredentialKind, CredentialResult};
pub use error::{Error, Result};
pub use pipeline::{BulkReport, EmailRun, FileReport, Outcome, Pipeline, PipelineState};
pub use review::{HumanReviewItem, InMemoryReviewQueue, ReviewSink};
pub use submit::{
    DryRunSystem, IncidentSystem, IssueTracker, JiraClient, ServiceNowClient, SubmissionError,
    TicketSubmitter,
};
pub use ticket::{Ticket, build_ticket};
pub use validation::{MissingField, ValidationResult, missing_fields, validate_analysis};
