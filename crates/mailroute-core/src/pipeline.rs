//! Email-to-ticket pipeline.
//!
//! Each email moves through a fixed sequence of states:
//!
//! ```text
//! Parsing → Analyzing → Validating → Classifying → Submitting → Done
//!               │            │                         │
//!               └────────────┴──→ QueuedForReview       └──→ Failed
//! ```
//!
//! There are no retries and no backtracking. Every transition appends a
//! line to the run's progress log, which is returned to the caller.
//! Emails that cannot be analyzed or lack required fields go to the
//! injected [`ReviewSink`]; ticket-system failures are reported in the log
//! and never retried.

use std::fmt;
use std::path::{Path, PathBuf};

use mailroute_mime::ParsedEmail;
use serde::Serialize;

use crate::analysis::{AnalysisClient, AnalysisResponse, EmailAnalysis};
use crate::classify::classify_analysis;
use crate::review::{HumanReviewItem, ReviewSink};
use crate::submit::TicketSubmitter;
use crate::ticket::build_ticket;
use crate::validation::{MissingField, describe, validate_analysis};

/// Text every queued outcome's log line contains.
pub const QUEUED_NOTICE: &str = "queued for human review";

/// Where a run is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    /// Splitting headers, body and attachments.
    Parsing,
    /// Waiting on the analysis provider.
    Analyzing,
    /// Checking required fields.
    Validating,
    /// Choosing the ticket type.
    Classifying,
    /// Creating the ticket.
    Submitting,
    /// Ticket created.
    Done,
    /// Handed to human review.
    QueuedForReview,
    /// Ticket system rejected the ticket or was unreachable.
    Failed,
}

/// Result of one email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum Outcome {
    /// Ticket created; holds the confirmation line.
    Created(String),
    /// Handed to human review.
    QueuedForReview,
    /// Submission failed; holds the error message.
    Failed(String),
}

impl Outcome {
    /// Whether a ticket was created.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(confirmation) => f.write_str(confirmation),
            Self::QueuedForReview => write!(f, "Email {QUEUED_NOTICE}"),
            Self::Failed(message) => f.write_str(message),
        }
    }
}

/// Everything one email run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailRun {
    /// Terminal state.
    pub state: PipelineState,
    /// Result.
    pub outcome: Outcome,
    /// Progress lines in the order they were written.
    pub log: Vec<String>,
}

/// Per-file result of a bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Input file.
    pub path: PathBuf,
    /// Outcome text.
    pub outcome: String,
    /// Whether a ticket was created.
    pub created: bool,
    /// The email run, absent if the file could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<EmailRun>,
}

/// Result of a bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    /// One entry per input file, in input order.
    pub entries: Vec<FileReport>,
}

impl BulkReport {
    /// Files that produced a ticket.
    #[must_use]
    pub fn created(&self) -> usize {
        self.entries.iter().filter(|e| e.created).count()
    }

    /// Files that were queued, failed, or could not be read.
    #[must_use]
    pub fn not_created(&self) -> usize {
        self.entries.len() - self.created()
    }

    /// Trailing summary line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Processed {} files: {} created successfully, {} queued for review or failed",
            self.entries.len(),
            self.created(),
            self.not_created()
        )
    }
}

/// Ordered progress log that mirrors each line to `tracing`.
struct ProgressLog {
    lines: Vec<String>,
}

impl ProgressLog {
    const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn enter(&mut self, state: PipelineState, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(?state, "{line}");
        self.lines.push(line);
    }

    fn warn(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!("{line}");
        self.lines.push(line);
    }

    fn finish(self, state: PipelineState, outcome: Outcome) -> EmailRun {
        EmailRun {
            state,
            outcome,
            log: self.lines,
        }
    }
}

/// Runs emails through analysis, validation, classification and
/// submission.
///
/// The pipeline owns its review sink; nothing else can write to it while
/// the pipeline exists.
#[derive(Debug)]
pub struct Pipeline<S: ReviewSink> {
    analysis: AnalysisClient,
    submitter: TicketSubmitter,
    sink: S,
}

impl<S: ReviewSink> Pipeline<S> {
    /// Creates a pipeline.
    pub const fn new(analysis: AnalysisClient, submitter: TicketSubmitter, sink: S) -> Self {
        Self {
            analysis,
            submitter,
            sink,
        }
    }

    /// The review sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the pipeline and returns the review sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Processes one raw email.
    ///
    /// Never fails: every error ends in a queued or failed outcome that is
    /// described in the returned log.
    pub async fn process_email(&mut self, raw: &str) -> EmailRun {
        let mut log = ProgressLog::new();

        log.enter(PipelineState::Parsing, "Parsing email");
        let email = ParsedEmail::parse(raw);
        for rejected in &email.rejected_attachments {
            log.warn(format!(
                "Skipped attachment {}: {}",
                rejected.filename.as_deref().unwrap_or("(unnamed)"),
                rejected.reason
            ));
        }
        log.enter(
            PipelineState::Parsing,
            format!(
                "Parsed email \"{}\" with {} attachment(s)",
                email.subject(),
                email.attachments.len()
            ),
        );

        log.enter(PipelineState::Analyzing, "Analyzing email content");
        let analysis = match self.analysis.analyze(&email).await {
            Ok(AnalysisResponse::Findings(analysis)) => *analysis,
            Ok(AnalysisResponse::Empty) => {
                return self.queue(
                    log,
                    raw,
                    "Analysis returned no findings",
                    vec![MissingField::Analysis],
                    None,
                );
            }
            Err(e) => {
                return self.queue(
                    log,
                    raw,
                    &format!("Analysis failed: {e}"),
                    vec![MissingField::Analysis],
                    None,
                );
            }
        };

        log.enter(PipelineState::Validating, "Validating required fields");
        if let Err(missing) = validate_analysis(&analysis) {
            let reason = format!("Missing required fields: {}", describe(&missing));
            return self.queue(log, raw, &reason, missing, Some(analysis));
        }

        let ticket_type = classify_analysis(&analysis);
        log.enter(
            PipelineState::Classifying,
            format!("Classified as {ticket_type}"),
        );

        let ticket = build_ticket(&analysis, ticket_type);
        log.enter(
            PipelineState::Submitting,
            format!("Submitting {} ticket", ticket.system()),
        );

        match self.submitter.submit(&ticket).await {
            Ok(confirmation) => {
                log.enter(PipelineState::Done, confirmation.clone());
                log.finish(PipelineState::Done, Outcome::Created(confirmation))
            }
            Err(e) => {
                let message = e.to_string();
                log.warn(message.clone());
                log.finish(PipelineState::Failed, Outcome::Failed(message))
            }
        }
    }

    fn queue(
        &mut self,
        mut log: ProgressLog,
        raw: &str,
        reason: &str,
        missing: Vec<MissingField>,
        partial: Option<EmailAnalysis>,
    ) -> EmailRun {
        log.warn(format!("{reason}; {QUEUED_NOTICE}"));
        self.sink
            .enqueue(HumanReviewItem::new(reason, raw, missing, partial));
        log.finish(PipelineState::QueuedForReview, Outcome::QueuedForReview)
    }

    /// Processes files one at a time, in the given order.
    ///
    /// A file that cannot be read becomes a failed entry; the remaining
    /// files are still processed.
    pub async fn process_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> BulkReport {
        let mut report = BulkReport::default();

        for path in paths {
            let path = path.as_ref();
            tracing::info!(path = %path.display(), "Processing file");

            let entry = match tokio::fs::read_to_string(path).await {
                Ok(raw) => {
                    let run = self.process_email(&raw).await;
                    FileReport {
                        path: path.to_path_buf(),
                        outcome: run.outcome.to_string(),
                        created: run.outcome.is_created(),
                        run: Some(run),
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read file");
                    FileReport {
                        path: path.to_path_buf(),
                        outcome: format!("Failed to read file: {e}"),
                        created: false,
                        run: None,
                    }
                }
            };
            report.entries.push(entry);
        }

        tracing::info!("{}", report.summary());
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisError, AnalysisProvider};
    use crate::review::InMemoryReviewQueue;
    use crate::submit::{IssueTracker, SubmissionError};
    use crate::ticket::JiraTicket;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Reply(&'static str);

    #[async_trait]
    impl AnalysisProvider for Reply {
        async fn complete(&self, _prompt: &str) -> Result<String, AnalysisError> {
            Ok(self.0.to_string())
        }
    }

    struct Tracker;

    #[async_trait]
    impl IssueTracker for Tracker {
        async fn create_issue(&self, _ticket: &JiraTicket) -> Result<String, SubmissionError> {
            Ok("PROJ-1".to_string())
        }
    }

    fn pipeline(reply: &'static str) -> Pipeline<InMemoryReviewQueue> {
        Pipeline::new(
            AnalysisClient::new(Arc::new(Reply(reply))),
            TicketSubmitter::new().with_issue_tracker(Arc::new(Tracker)),
            InMemoryReviewQueue::new(),
        )
    }

    const COMPLETE: &str = r#"{"requestType": "Bug Report", "priority": "low",
        "customerId": "C-1", "subject": "Crash", "content": "crash"}"#;

    #[tokio::test]
    async fn test_happy_path_log_order() {
        let mut pipeline = pipeline(COMPLETE);
        let run = pipeline.process_email("Subject: Crash\n\ncrash").await;

        assert_eq!(run.state, PipelineState::Done);
        assert_eq!(run.outcome, Outcome::Created("Jira ticket created: PROJ-1".into()));
        assert_eq!(
            run.log,
            [
                "Parsing email",
                "Parsed email \"Crash\" with 0 attachment(s)",
                "Analyzing email content",
                "Validating required fields",
                "Classified as jira-bug",
                "Submitting Jira ticket",
                "Jira ticket created: PROJ-1",
            ]
        );
        assert!(pipeline.sink().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_queue_with_partial_analysis() {
        let mut pipeline = pipeline(r#"{"requestType": "Question", "subject": "Hi"}"#);
        let run = pipeline.process_email("Subject: Hi\n\nhello").await;

        assert_eq!(run.state, PipelineState::QueuedForReview);
        let last = run.log.last().unwrap();
        assert_eq!(
            last,
            "Missing required fields: Priority, Account Number/Customer ID; queued for human review"
        );

        let items = pipeline.sink().snapshot();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].missing_fields,
            [MissingField::Priority, MissingField::AccountOrCustomerId]
        );
        assert_eq!(
            items[0].partial_analysis.as_ref().unwrap().request_type,
            "Question"
        );
        assert_eq!(items[0].email_content, "Subject: Hi\n\nhello");
    }

    #[tokio::test]
    async fn test_unparseable_analysis_is_queued() {
        let mut pipeline = pipeline("I could not find anything useful.");
        let run = pipeline.process_email("Subject: x\n\ny").await;

        assert_eq!(run.outcome, Outcome::QueuedForReview);
        assert!(run.log.last().unwrap().starts_with("Analysis failed:"));
        let items = pipeline.into_sink().snapshot();
        assert_eq!(items[0].missing_fields, [MissingField::Analysis]);
        assert!(items[0].partial_analysis.is_none());
    }

    #[tokio::test]
    async fn test_rejected_attachment_is_logged() {
        let raw = "Subject: Crash\n\ncrash\n--ATTACHMENT--\nFilename: bad.bin\nContent-Type: text/plain\nContent: !!!\n--END-ATTACHMENT--";
        let mut pipeline = pipeline(COMPLETE);
        let run = pipeline.process_email(raw).await;

        assert!(run.log[1].starts_with("Skipped attachment bad.bin:"));
        assert_eq!(run.state, PipelineState::Done);
    }

    #[test]
    fn test_bulk_summary_counts() {
        let created = FileReport {
            path: "a.eml".into(),
            outcome: "Jira ticket created: PROJ-1".into(),
            created: true,
            run: None,
        };
        let queued = FileReport {
            path: "b.eml".into(),
            outcome: Outcome::QueuedForReview.to_string(),
            created: false,
            run: None,
        };
        let report = BulkReport {
            entries: vec![created, queued.clone(), queued],
        };
        assert_eq!(
            report.summary(),
            "Processed 3 files: 1 created successfully, 2 queued for review or failed"
        );
    }
}
