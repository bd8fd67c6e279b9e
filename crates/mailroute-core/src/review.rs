//! Human review queue.
//!
//! Emails the pipeline cannot turn into a ticket are handed to a
//! [`ReviewSink`]. Items are appended once and never changed; readers get
//! a snapshot copy.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::EmailAnalysis;
use crate::validation::MissingField;

/// An email waiting for a person to look at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanReviewItem {
    /// Why the email was not ticketed.
    pub reason: String,
    /// Full raw email text.
    pub email_content: String,
    /// Required fields the analysis lacked.
    pub missing_fields: Vec<MissingField>,
    /// Analysis as far as it got, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_analysis: Option<EmailAnalysis>,
    /// When the item was queued.
    pub queued_at: DateTime<Utc>,
}

impl HumanReviewItem {
    /// Creates an item stamped with the current time.
    pub fn new(
        reason: impl Into<String>,
        email_content: impl Into<String>,
        missing_fields: Vec<MissingField>,
        partial_analysis: Option<EmailAnalysis>,
    ) -> Self {
        Self {
            reason: reason.into(),
            email_content: email_content.into(),
            missing_fields,
            partial_analysis,
            queued_at: Utc::now(),
        }
    }
}

/// Destination for emails that need human review.
pub trait ReviewSink {
    /// Appends an item.
    fn enqueue(&mut self, item: HumanReviewItem);

    /// Returns a copy of every queued item, oldest first.
    fn snapshot(&self) -> Vec<HumanReviewItem>;
}

/// Unbounded in-memory queue. No deduplication.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReviewQueue {
    items: Vec<HumanReviewItem>,
}

impl InMemoryReviewQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ReviewSink for InMemoryReviewQueue {
    fn enqueue(&mut self, item: HumanReviewItem) {
        tracing::warn!(
            reason = %item.reason,
            missing = item.missing_fields.len(),
            "Email queued for human review"
        );
        self.items.push(item);
    }

    fn snapshot(&self) -> Vec<HumanReviewItem> {
        self.items.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_snapshot_preserve_order() {
        let mut queue = InMemoryReviewQueue::new();
        assert!(queue.is_empty());

        queue.enqueue(HumanReviewItem::new("first", "raw 1", vec![], None));
        queue.enqueue(HumanReviewItem::new(
            "second",
            "raw 2",
            vec![MissingField::Priority],
            None,
        ));
        queue.enqueue(HumanReviewItem::new("first", "raw 1", vec![], None));

        assert_eq!(queue.len(), 3);
        let items = queue.snapshot();
        let reasons: Vec<_> = items.iter().map(|i| i.reason.as_str()).collect();
        assert_eq!(reasons, ["first", "second", "first"]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut queue = InMemoryReviewQueue::new();
        queue.enqueue(HumanReviewItem::new("r", "raw", vec![], None));
        let mut snapshot = queue.snapshot();
        snapshot.clear();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let item = HumanReviewItem::new(
            "Missing required fields",
            "Subject: x",
            vec![MissingField::AccountOrCustomerId],
            Some(EmailAnalysis::default()),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["emailContent"], "Subject: x");
        assert_eq!(json["missingFields"][0], "Account Number/Customer ID");
        assert!(json["partialAnalysis"].is_object());
        assert!(json["queuedAt"].is_string());
    }
}
