//! Interpretation of raw provider output.
//!
//! The provider answers in free text. The grammar accepted here is:
//!
//! 1. a fenced code block (```` ```json ```` or bare ```` ``` ````) whose
//!    content is a JSON object, or, failing that,
//! 2. the first balanced `{ ... }` object anywhere in the text.
//!
//! Every way this can go wrong is a distinct [`AnalysisError`] variant.

use super::model::EmailAnalysis;

/// Why a provider response could not be turned into an analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The response contains no JSON object.
    #[error("No JSON object found in analysis response")]
    Format,

    /// A JSON object was found but is not a valid analysis.
    #[error("Could not parse analysis JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The provider failed or returned an empty payload.
    #[error("Analysis provider error: {0}")]
    Provider(String),
}

/// A successfully interpreted provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResponse {
    /// The provider returned `{}`: nothing could be determined.
    Empty,
    /// The provider returned an analysis.
    Findings(Box<EmailAnalysis>),
}

/// Parses a raw provider response.
///
/// # Errors
///
/// - [`AnalysisError::Provider`] if the payload is empty
/// - [`AnalysisError::Format`] if no JSON object can be located
/// - [`AnalysisError::Parse`] if the located JSON is not a valid analysis
pub fn parse_response(raw: &str) -> Result<AnalysisResponse, AnalysisError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::Provider("empty response".to_string()));
    }

    let json = extract_json(trimmed).ok_or(AnalysisError::Format)?;
    let value: serde_json::Value = serde_json::from_str(json)?;

    match value {
        serde_json::Value::Object(map) if map.is_empty() => Ok(AnalysisResponse::Empty),
        serde_json::Value::Object(_) => {
            let analysis: EmailAnalysis = serde_json::from_value(value)?;
            Ok(AnalysisResponse::Findings(Box::new(analysis)))
        }
        _ => Err(AnalysisError::Format),
    }
}

/// Locates the JSON object text inside a response.
#[must_use]
pub fn extract_json(text: &str) -> Option<&str> {
    fenced_block(text)
        .filter(|block| block.starts_with('{'))
        .or_else(|| first_object(text))
}

/// Content of the first fenced code block, trimmed.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    // Skip an info string such as `json` on the opening fence line.
    let line_end = after.find('\n').map_or(0, |i| i + 1);
    let content_start = if after[..line_end].trim_start().starts_with('{') {
        0
    } else {
        line_end
    };
    let content = &after[content_start..];
    let end = content.find("```")?;
    Some(content[..end].trim())
}

/// The first balanced brace-delimited object, ignoring braces inside JSON
/// strings.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
