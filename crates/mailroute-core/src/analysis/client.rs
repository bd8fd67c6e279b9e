//! Analysis client: prompt, provider call, response interpretation.

use std::sync::Arc;

use async_trait::async_trait;
use mailroute_mime::ParsedEmail;

use super::prompt::build_prompt;
use super::response::{AnalysisError, AnalysisResponse, parse_response};

/// An external service that turns a prompt into a free-text answer.
///
/// One request per call, not streamed. Transport, timeouts and retries are
/// the implementation's business.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Sends the prompt and returns the raw response text.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Provider`] if the call fails.
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// Runs the analysis step for parsed emails.
#[derive(Clone)]
pub struct AnalysisClient {
    provider: Arc<dyn AnalysisProvider>,
}

impl AnalysisClient {
    /// Creates a client backed by the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn AnalysisProvider>) -> Self {
        Self { provider }
    }

    /// Analyzes an email.
    ///
    /// On success the analysis carries the parsed email's own subject and
    /// attachments; whatever the provider said about them is ignored, so an
    /// email without a `Subject:` header always fails validation.
    ///
    /// # Errors
    ///
    /// Returns an [`AnalysisError`] if the provider fails or its response
    /// cannot be interpreted.
    pub async fn analyze(&self, email: &ParsedEmail) -> Result<AnalysisResponse, AnalysisError> {
        let prompt = build_prompt(email);
        tracing::debug!(prompt_len = prompt.len(), "Requesting analysis");

        let raw = self.provider.complete(&prompt).await?;
        let response = parse_response(&raw)?;

        Ok(match response {
            AnalysisResponse::Findings(mut analysis) => {
                email.subject().clone_into(&mut analysis.subject);
                analysis.attachments.clone_from(&email.attachments);
                AnalysisResponse::Findings(analysis)
            }
            AnalysisResponse::Empty => AnalysisResponse::Empty,
        })
    }
}

impl std::fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailroute_mime::encoding::encode_base64;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AnalysisProvider for Canned {
        async fn complete(&self, prompt: &str) -> Result<String, AnalysisError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(AnalysisError::Provider)
        }
    }

    fn client(reply: Result<&str, &str>) -> (AnalysisClient, Arc<Canned>) {
        let provider = Arc::new(Canned {
            reply: reply.map(str::to_string).map_err(str::to_string),
            prompts: Mutex::new(Vec::new()),
        });
        (AnalysisClient::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_analyze_attaches_parsed_attachments() {
        let raw = format!(
            "Subject: Logs\n\nsee file\n--ATTACHMENT--\nFilename: log.txt\nContent-Type: text/plain\nContent: {}\n--END-ATTACHMENT--",
            encode_base64(b"trace")
        );
        let email = ParsedEmail::parse(&raw);
        let (client, provider) = client(Ok(
            r#"{"subject": "Logs", "attachments": [{"filename": "made-up.exe"}]}"#,
        ));

        let AnalysisResponse::Findings(analysis) = client.analyze(&email).await.unwrap() else {
            panic!("expected findings");
        };
        assert_eq!(analysis.attachments.len(), 1);
        assert_eq!(analysis.attachments[0].filename(), "log.txt");
        assert!(Arc::ptr_eq(&analysis.attachments[0], &email.attachments[0]));
        assert_eq!(provider.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_keeps_parsed_subject() {
        let (client, _) = client(Ok(r#"{"subject": "Crash", "content": "App crashes"}"#));

        let email = ParsedEmail::parse("From: a@b.com\n\nApp crashes");
        let AnalysisResponse::Findings(analysis) = client.analyze(&email).await.unwrap() else {
            panic!("expected findings");
        };
        assert_eq!(analysis.subject, "");

        let email = ParsedEmail::parse("Subject: Login crash\n\nApp crashes");
        let AnalysisResponse::Findings(analysis) = client.analyze(&email).await.unwrap() else {
            panic!("expected findings");
        };
        assert_eq!(analysis.subject, "Login crash");
    }

    #[tokio::test]
    async fn test_analyze_empty_object() {
        let email = ParsedEmail::parse("Subject: ?\n\n...");
        let (client, _) = client(Ok("{}"));
        assert_eq!(client.analyze(&email).await.unwrap(), AnalysisResponse::Empty);
    }

    #[tokio::test]
    async fn test_analyze_provider_failure() {
        let email = ParsedEmail::parse("Subject: x\n\ny");
        let (client, _) = client(Err("connection refused"));
        let err = client.analyze(&email).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Provider(msg) if msg == "connection refused"));
    }
}
