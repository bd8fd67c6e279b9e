//! Prompt construction for the analysis provider.

use std::fmt::Write as _;

use mailroute_mime::{Attachment, AttachmentBody, ParsedEmail};

/// Instructions sent ahead of the email. The keys match
/// [`EmailAnalysis`](super::EmailAnalysis)'s wire format.
const INSTRUCTIONS: &str = "\
Analyze the following email and respond with a single JSON object using these keys:
- requestType: one of \"Bug Report\", \"Feature Request\", \"Support Request\" or a short description
- priority: \"high\", \"medium\" or \"low\"
- keyPoints: up to 3 short strings
- actionItems: list of strings
- accountNumber: the customer account number, if present
- customerId: the customer ID, if present
- subject: the email subject
- content: a concise description of the request
- additionalFields: object of any other identifying fields (string values)
If the email cannot be analyzed, respond with {}.";

/// Builds the analysis prompt for an email.
///
/// The output depends only on the email, so identical emails always
/// produce identical prompts.
#[must_use]
pub fn build_prompt(email: &ParsedEmail) -> String {
    let mut prompt = String::with_capacity(INSTRUCTIONS.len() + email.body_text().len() + 256);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\n");

    let _ = writeln!(prompt, "Subject: {}", email.subject());
    let _ = writeln!(prompt, "\nBody:\n{}", email.body_text());

    if !email.attachments.is_empty() {
        prompt.push_str("\nAttachments:\n");
        for (index, attachment) in email.attachments.iter().enumerate() {
            write_attachment(&mut prompt, index + 1, attachment);
        }
    }

    prompt
}

fn write_attachment(prompt: &mut String, number: usize, attachment: &Attachment) {
    let _ = writeln!(
        prompt,
        "\n[{number}] {} ({})",
        attachment.filename(),
        attachment.content_type()
    );
    let _ = writeln!(prompt, "Content:\n{}", attachment.content());

    match attachment.body() {
        AttachmentBody::Plain => {}
        AttachmentBody::Tabular(columns) => {
            prompt.push_str("Parsed content:\n");
            for (column, value) in columns {
                let _ = writeln!(prompt, "  {column}: {value}");
            }
        }
        AttachmentBody::ExtractedText(text) => {
            let _ = writeln!(prompt, "Extracted text:\n{text}");
        }
    }
}
