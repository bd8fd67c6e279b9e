//! Structured analysis data models.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mailroute_mime::Attachment;
use serde::{Deserialize, Deserializer, Serialize};

/// Urgency of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Needs attention now.
    High,
    /// Normal handling.
    #[default]
    Medium,
    /// Whenever there is time.
    Low,
}

impl Priority {
    /// Parses a priority name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of analyzing one email.
///
/// Deserialized from the provider's JSON (camelCase keys). Missing keys,
/// `null`s and numeric identifiers are accepted so that completeness is
/// decided by field validation rather than by the JSON parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAnalysis {
    /// Kind of request, e.g. "Bug Report" or "Support Request".
    #[serde(default, deserialize_with = "lenient_text")]
    pub request_type: String,
    /// Urgency; unknown or empty values are `None`.
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Option<Priority>,
    /// Main points of the email (up to three intended).
    #[serde(default, deserialize_with = "lenient_list")]
    pub key_points: Vec<String>,
    /// Follow-up actions.
    #[serde(default, deserialize_with = "lenient_list")]
    pub action_items: Vec<String>,
    /// Customer account number.
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_number: Option<String>,
    /// Customer identifier.
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_id: Option<String>,
    /// Subject of the source email.
    ///
    /// The analysis client overwrites whatever the provider returned with
    /// the parsed `Subject:` header.
    #[serde(default, deserialize_with = "lenient_text")]
    pub subject: String,
    /// Request content.
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,
    /// Any other identifying fields the provider found.
    #[serde(default, deserialize_with = "stringly_map")]
    pub additional_fields: BTreeMap<String, String>,
    /// Attachments of the source email.
    ///
    /// Never taken from the provider; the analysis client fills these in
    /// from the parsed email.
    #[serde(skip_deserializing)]
    pub attachments: Vec<Arc<Attachment>>,
}

impl EmailAnalysis {
    /// Account number or customer ID, whichever is set (account first).
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        non_blank(self.account_number.as_deref()).or_else(|| non_blank(self.customer_id.as_deref()))
    }
}

/// `Some` only for values with non-whitespace content.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(|s| {
        let priority = Priority::parse(s);
        if priority.is_none() && !s.trim().is_empty() {
            tracing::debug!(priority = s, "Unrecognized priority");
        }
        priority
    }))
}

/// Strings as-is, `null` as `None`, anything else as JSON text.
fn text_of(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)
        .map(text_of)?
        .unwrap_or_default())
}

/// Identifiers sometimes come back as numbers.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(text_of)
}

/// A list of strings; `null` is empty and a lone scalar is one item.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items.into_iter().filter_map(text_of).collect(),
        other => text_of(other).into_iter().collect(),
    })
}

/// Accepts any JSON values, keeping strings as-is and rendering the rest
/// as JSON text.
fn stringly_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}
