//! Analysis completeness validation.

use serde::Serialize;

use crate::analysis::{EmailAnalysis, non_blank};

/// A required piece of information that an analysis lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MissingField {
    /// Request type is empty.
    RequestType,
    /// Priority is absent or unrecognized.
    Priority,
    /// Neither an account number nor a customer ID was found.
    AccountOrCustomerId,
    /// Subject is empty.
    Subject,
    /// No analysis could be produced at all.
    Analysis,
}

impl MissingField {
    /// Label shown to users.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::RequestType => "Request Type",
            Self::Priority => "Priority",
            Self::AccountOrCustomerId => "Account Number/Customer ID",
            Self::Subject => "Subject",
            Self::Analysis => "Email Analysis",
        }
    }
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for MissingField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Result of validating an analysis.
pub type ValidationResult = Result<(), Vec<MissingField>>;

/// Lists the required fields an analysis is missing.
///
/// The order is fixed (request type, priority, account/customer ID,
/// subject) and is used as-is in user-facing messages. An empty list
/// means the analysis is complete.
#[must_use]
pub fn missing_fields(analysis: &EmailAnalysis) -> Vec<MissingField> {
    let mut missing = Vec::new();

    if analysis.request_type.trim().is_empty() {
        missing.push(MissingField::RequestType);
    }
    if analysis.priority.is_none() {
        missing.push(MissingField::Priority);
    }
    if non_blank(analysis.account_number.as_deref()).is_none()
        && non_blank(analysis.customer_id.as_deref()).is_none()
    {
        missing.push(MissingField::AccountOrCustomerId);
    }
    if analysis.subject.trim().is_empty() {
        missing.push(MissingField::Subject);
    }

    missing
}

/// Validates an analysis.
///
/// # Errors
///
/// Returns the missing fields if any required field is absent.
pub fn validate_analysis(analysis: &EmailAnalysis) -> ValidationResult {
    let missing = missing_fields(analysis);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

/// Joins field labels for messages: `"Request Type, Priority"`.
#[must_use]
pub fn describe(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(MissingField::label)
        .collect::<Vec<_>>()
        .join(", ")
}
