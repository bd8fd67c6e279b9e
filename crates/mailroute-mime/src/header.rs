//! Email header block handling.

use crate::encoding::decode_rfc2047;

/// The headers the pipeline cares about.
///
/// `subject` is always present; an absent `Subject:` header parses to an
/// empty string and is caught later by field validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EmailHeaders {
    /// Subject line (empty if absent).
    pub subject: String,
    /// Sender address.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub from: Option<String>,
    /// Recipient address.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub to: Option<String>,
    /// Date as written by the sender.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub date: Option<String>,
}

impl EmailHeaders {
    /// Parses a header block.
    ///
    /// Lines are `Key: value`; lines starting with a space or tab continue
    /// the previous value. Only `subject`, `from`, `to` and `date` are kept
    /// (keys compared case-insensitively); anything else is dropped. Parsing
    /// stops at the first empty line.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::default();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.trim().is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.set(&name, &value);
            }

            match line.split_once(':') {
                Some((name, value)) if is_header_name(name) => {
                    current = Some((name.to_string(), value.trim().to_string()));
                }
                _ => tracing::debug!(line, "Ignoring line that is not a header"),
            }
        }

        if let Some((name, value)) = current {
            headers.set(&name, &value);
        }

        headers
    }

    fn set(&mut self, name: &str, value: &str) {
        let value = decode_value(value.trim());
        match name.to_ascii_lowercase().as_str() {
            "subject" => self.subject = value,
            "from" => self.from = Some(value),
            "to" => self.to = Some(value),
            "date" => self.date = Some(value),
            other => tracing::trace!(header = other, "Dropping unrecognized header"),
        }
    }
}

/// Header names are word characters and dashes only.
fn is_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Decodes an RFC 2047 value, keeping the raw text if it is malformed.
fn decode_value(value: &str) -> String {
    decode_rfc2047(value).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Keeping undecodable header value verbatim");
        value.to_string()
    })
}
