//! Embedded attachment blocks.
//!
//! Attachments travel inside the body as delimited blocks:
//!
//! ```text
//! --ATTACHMENT--
//! Filename: <name>
//! Content-Type: <mime>
//! Content: <base64>
//! --END-ATTACHMENT--
//! ```
//!
//! Each block is decoded independently and enriched according to its
//! content type.

use std::collections::BTreeMap;

use crate::content_type::ContentType;
use crate::encoding::decode_base64_text;
use crate::error::{Error, Result};

/// Opening marker of an attachment block.
pub const ATTACHMENT_START: &str = "--ATTACHMENT--";

/// Closing marker of an attachment block.
pub const ATTACHMENT_END: &str = "--END-ATTACHMENT--";

/// Content derived from an attachment at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttachmentBody {
    /// No derived content.
    #[default]
    Plain,
    /// `text/csv`: one flat `header -> value` mapping.
    Tabular(BTreeMap<String, String>),
    /// Document types: text treated as already extracted.
    ExtractedText(String),
}

/// A decoded attachment.
///
/// Immutable once built; downstream records share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content_type: String,
    content: String,
    body: AttachmentBody,
}

impl Attachment {
    /// Builds an attachment from already-decoded text, deriving its body
    /// from the content type.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content_type = content_type.into();
        let content = content.into();
        let body = derive_body(&content_type, &content);
        Self {
            filename: filename.into(),
            content_type,
            content,
            body,
        }
    }

    /// Attachment file name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared content type, as written in the block.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Decoded text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Derived body.
    #[must_use]
    pub const fn body(&self) -> &AttachmentBody {
        &self.body
    }

    /// Column mapping for CSV attachments.
    #[must_use]
    pub const fn parsed_content(&self) -> Option<&BTreeMap<String, String>> {
        match &self.body {
            AttachmentBody::Tabular(map) => Some(map),
            _ => None,
        }
    }

    /// Extracted text for document attachments.
    #[must_use]
    pub fn extracted_text(&self) -> Option<&str> {
        match &self.body {
            AttachmentBody::ExtractedText(text) => Some(text),
            _ => None,
        }
    }

    /// Decodes the inside of one attachment block (the text between the
    /// markers).
    ///
    /// # Errors
    ///
    /// Returns an error if a sub-field is missing or the payload is not
    /// Base64-encoded UTF-8.
    pub fn decode_block(block: &str) -> Result<Self> {
        let fields = BlockFields::parse(block);
        let filename = fields.filename.ok_or(Error::MalformedAttachment("Filename"))?;
        let content_type = fields
            .content_type
            .ok_or(Error::MalformedAttachment("Content-Type"))?;
        let payload = fields.content.ok_or(Error::MalformedAttachment("Content"))?;

        let content = decode_base64_text(&payload)?;
        tracing::debug!(filename, content_type, bytes = content.len(), "Decoded attachment");
        Ok(Self::new(filename, content_type, content))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Attachment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let derived = usize::from(!matches!(self.body, AttachmentBody::Plain));
        let mut state = serializer.serialize_struct("Attachment", 3 + derived)?;
        state.serialize_field("filename", &self.filename)?;
        state.serialize_field("contentType", &self.content_type)?;
        state.serialize_field("content", &self.content)?;
        match &self.body {
            AttachmentBody::Plain => {}
            AttachmentBody::Tabular(map) => state.serialize_field("parsedContent", map)?,
            AttachmentBody::ExtractedText(text) => state.serialize_field("extractedText", text)?,
        }
        state.end()
    }
}

/// Raw sub-fields of a block.
#[derive(Default)]
struct BlockFields {
    filename: Option<String>,
    content_type: Option<String>,
    content: Option<String>,
}

impl BlockFields {
    fn parse(block: &str) -> Self {
        let mut fields = Self::default();
        let mut in_content = false;

        for line in block.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(value) = strip_field(trimmed, "Filename") {
                fields.filename = Some(value.to_string());
                in_content = false;
            } else if let Some(value) = strip_field(trimmed, "Content-Type") {
                fields.content_type = Some(value.to_string());
                in_content = false;
            } else if let Some(value) = strip_field(trimmed, "Content") {
                fields.content = Some(value.to_string());
                in_content = true;
            } else if in_content {
                // Wrapped Base64 payload
                if let Some(content) = fields.content.as_mut() {
                    content.push_str(trimmed);
                }
            }
        }

        fields
    }
}

/// Returns the value of a `Name: value` line, matching the name
/// case-insensitively.
fn strip_field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (key, value) = line.split_once(':')?;
    key.trim()
        .eq_ignore_ascii_case(name)
        .then(|| value.trim())
}

fn derive_body(content_type: &str, content: &str) -> AttachmentBody {
    match ContentType::parse(content_type) {
        Ok(ct) if ct.is_csv() => AttachmentBody::Tabular(parse_csv_pairs(content)),
        Ok(ct) if ct.is_pdf() => AttachmentBody::ExtractedText(content.to_string()),
        Ok(_) => AttachmentBody::Plain,
        Err(e) => {
            tracing::debug!(error = %e, "Treating attachment as plain text");
            AttachmentBody::Plain
        }
    }
}

/// Folds `header,value` lines into one mapping.
///
/// A repeated header overwrites the earlier value.
// TODO: confirm with product whether repeated CSV headers should collapse
// (last wins) or be kept as separate rows.
fn parse_csv_pairs(content: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        match line.split_once(',') {
            Some((header, value)) => {
                map.insert(header.trim().to_string(), value.trim().to_string());
            }
            None => tracing::debug!(line, "Skipping CSV line without a comma"),
        }
    }
    map
}

/// Splits attachment blocks out of a body.
///
/// Returns the body with every complete block removed, plus the inner
/// text of each block in order. A start marker without a matching end
/// marker is left in the body.
pub(crate) fn split_blocks(text: &str) -> (String, Vec<&str>) {
    let mut remaining = text;
    let mut body = String::with_capacity(text.len());
    let mut blocks = Vec::new();

    while let Some(start) = remaining.find(ATTACHMENT_START) {
        let after_start = &remaining[start + ATTACHMENT_START.len()..];
        let Some(end) = after_start.find(ATTACHMENT_END) else {
            break;
        };
        body.push_str(&remaining[..start]);
        blocks.push(&after_start[..end]);
        remaining = &after_start[end + ATTACHMENT_END.len()..];
    }
    body.push_str(remaining);

    (body, blocks)
}
