//! # mailroute-mime
//!
//! Parsing of plain-text emails as they arrive in the mailroute pipeline.
//!
//! ## Features
//!
//! - **Header parsing**: `Subject`, `From`, `To` and `Date`, case-insensitive,
//!   with folded lines and RFC 2047 encoded-words
//! - **Embedded attachments**: `--ATTACHMENT--` blocks with Base64 payloads,
//!   decoded independently so one bad block never aborts the email
//! - **Content-type enrichment**: CSV attachments become a column mapping,
//!   PDF attachments expose their text
//!
//! ## Quick Start
//!
//! ```
//! use mailroute_mime::ParsedEmail;
//!
//! let raw = "Subject: Printer broken\nFrom: ops@example.com\n\nIt jams on every page.";
//! let email = ParsedEmail::parse(raw);
//!
//! assert_eq!(email.subject(), "Printer broken");
//! assert_eq!(email.body_text(), "It jams on every page.");
//! assert!(email.attachments.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod attachment;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use attachment::{ATTACHMENT_END, ATTACHMENT_START, Attachment, AttachmentBody};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::EmailHeaders;
pub use message::{ParsedEmail, RejectedAttachment};
