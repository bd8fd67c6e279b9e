//! Parsed email structure.

use std::sync::Arc;

use crate::attachment::{Attachment, split_blocks};
use crate::header::EmailHeaders;

/// An attachment block that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RejectedAttachment {
    /// File name, if the block declared one.
    pub filename: Option<String>,
    /// Why the block was dropped.
    pub reason: String,
}

/// An email split into headers, plain body and decoded attachments.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParsedEmail {
    /// Recognized headers.
    pub headers: EmailHeaders,
    /// Body text with attachment blocks removed (`None` if empty).
    pub body: Option<String>,
    /// Decoded attachments, in the order they appeared.
    pub attachments: Vec<Arc<Attachment>>,
    /// Blocks dropped because they failed to decode.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub rejected_attachments: Vec<RejectedAttachment>,
}

impl ParsedEmail {
    /// Parses raw email text.
    ///
    /// The text is split on the first blank line into a header block and a
    /// body. Attachment blocks are removed from the body and decoded one by
    /// one; a block that fails to decode is logged and dropped without
    /// affecting the rest of the email.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (header_text, rest) = split_header_block(raw);
        let headers = EmailHeaders::parse(header_text);

        let (body_text, blocks) = split_blocks(rest);
        let mut attachments = Vec::with_capacity(blocks.len());
        let mut rejected_attachments = Vec::new();

        for block in blocks {
            match Attachment::decode_block(block) {
                Ok(attachment) => attachments.push(Arc::new(attachment)),
                Err(e) => {
                    let filename = declared_filename(block);
                    tracing::warn!(?filename, error = %e, "Dropping undecodable attachment");
                    rejected_attachments.push(RejectedAttachment {
                        filename,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let body = Some(body_text.trim())
            .filter(|b| !b.is_empty())
            .map(ToString::to_string);

        Self {
            headers,
            body,
            attachments,
            rejected_attachments,
        }
    }

    /// Subject line (empty if absent).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.headers.subject
    }

    /// Body text, or an empty string.
    #[must_use]
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// Splits at the first blank line; everything is headers if there is none.
fn split_header_block(raw: &str) -> (&str, &str) {
    let crlf = raw.find("\r\n\r\n").map(|i| (i, 4));
    let lf = raw.find("\n\n").map(|i| (i, 2));
    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match split {
        Some((index, len)) => (&raw[..index], &raw[index + len..]),
        None => (raw, ""),
    }
}

fn declared_filename(block: &str) -> Option<String> {
    block.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim().to_string())
    })
}
