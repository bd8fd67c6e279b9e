//! Application settings.
//!
//! Settings live in a JSON file, by default `<config dir>/mailroute/config.json`.
//! Secrets may be left out of the file: each one is looked up in the file
//! first, then in an environment variable, then in the system keyring.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credentials::{self, CredentialKind};
use crate::error::{Error, Result};

/// Environment variable holding the analysis provider API key.
pub const ANALYSIS_API_KEY_ENV: &str = "MAILROUTE_ANALYSIS_API_KEY";
/// Environment variable holding the Jira API token.
pub const JIRA_TOKEN_ENV: &str = "MAILROUTE_JIRA_TOKEN";
/// Environment variable holding the ServiceNow password.
pub const SERVICENOW_PASSWORD_ENV: &str = "MAILROUTE_SERVICENOW_PASSWORD";

/// Keyring user for the analysis API key, which has no account name.
pub const ANALYSIS_KEYRING_USER: &str = "default";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Analysis provider.
    pub analysis: AnalysisSettings,
    /// Issue tracker; Jira tickets fail when absent.
    pub jira: Option<JiraSettings>,
    /// Incident system; ServiceNow tickets fail when absent.
    pub servicenow: Option<ServiceNowSettings>,
    /// Per-request timeout for every HTTP collaborator.
    pub request_timeout_secs: u64,
    /// Log tickets instead of creating them.
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            analysis: AnalysisSettings::default(),
            jira: None,
            servicenow: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            dry_run: false,
        }
    }
}

/// OpenAI-compatible chat-completions provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Full chat-completions URL.
    pub endpoint: String,
    /// Model name sent with each request.
    pub model: String,
    /// Bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        }
    }
}

impl AnalysisSettings {
    /// Resolves the API key. Local providers may need none.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(
            self.api_key.as_deref(),
            std::env::var(ANALYSIS_API_KEY_ENV).ok(),
            || keyring_secret(CredentialKind::AnalysisApiKey, ANALYSIS_KEYRING_USER),
        )
    }
}

/// Jira Cloud or Server site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraSettings {
    /// Site URL, e.g. `https://example.atlassian.net`.
    pub base_url: String,
    /// Project issues are created in.
    pub project_key: String,
    /// Account name or email.
    pub username: String,
    /// API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl JiraSettings {
    /// Resolves the API token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no token is found anywhere.
    pub fn resolve_api_token(&self) -> Result<String> {
        resolve_secret(
            self.api_token.as_deref(),
            std::env::var(JIRA_TOKEN_ENV).ok(),
            || keyring_secret(CredentialKind::JiraToken, &self.username),
        )
        .ok_or_else(|| {
            Error::Config(format!(
                "no Jira API token for {} (set {JIRA_TOKEN_ENV} or run `mailroute credentials set jira`)",
                self.username
            ))
        })
    }
}

/// ServiceNow instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNowSettings {
    /// Instance URL, e.g. `https://example.service-now.com`.
    pub instance_url: String,
    /// Integration user.
    pub username: String,
    /// Password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ServiceNowSettings {
    /// Resolves the password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no password is found anywhere.
    pub fn resolve_password(&self) -> Result<String> {
        resolve_secret(
            self.password.as_deref(),
            std::env::var(SERVICENOW_PASSWORD_ENV).ok(),
            || keyring_secret(CredentialKind::ServiceNowPassword, &self.username),
        )
        .ok_or_else(|| {
            Error::Config(format!(
                "no ServiceNow password for {} (set {SERVICENOW_PASSWORD_ENV} or run `mailroute credentials set servicenow`)",
                self.username
            ))
        })
    }
}

impl Settings {
    /// Default settings file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailroute")
            .join("config.json")
    }

    /// Loads settings from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let settings: Self = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Loads settings from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields the
    /// default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path).await;
        }

        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path).await
    }

    /// Per-request timeout for HTTP collaborators.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Checks the settings for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.analysis.endpoint.trim().is_empty() {
            problems.push("analysis.endpoint is empty");
        }
        if self.analysis.model.trim().is_empty() {
            problems.push("analysis.model is empty");
        }
        if self.request_timeout_secs == 0 {
            problems.push("request_timeout_secs must be at least 1");
        }
        if let Some(jira) = &self.jira {
            if jira.base_url.trim().is_empty() {
                problems.push("jira.base_url is empty");
            }
            if jira.project_key.trim().is_empty() {
                problems.push("jira.project_key is empty");
            }
            if jira.username.trim().is_empty() {
                problems.push("jira.username is empty");
            }
        }
        if let Some(servicenow) = &self.servicenow {
            if servicenow.instance_url.trim().is_empty() {
                problems.push("servicenow.instance_url is empty");
            }
            if servicenow.username.trim().is_empty() {
                problems.push("servicenow.username is empty");
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(problems.join("; ")))
        }
    }
}

/// Picks the first non-empty secret: configured, then environment, then
/// keyring. The keyring is only consulted when needed.
fn resolve_secret(
    configured: Option<&str>,
    env: Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Option<String> {
    configured
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .or_else(|| env.filter(|s| !s.trim().is_empty()))
        .or_else(keyring)
}

fn keyring_secret(kind: CredentialKind, user: &str) -> Option<String> {
    match credentials::get_secret(kind, user) {
        Ok(secret) => secret,
        Err(e) => {
            tracing::warn!(%kind, error = %e, "Keyring lookup failed");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(!settings.dry_run);
        assert!(settings.jira.is_none());
        assert!(settings.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "jira": {{"base_url": "https://example.atlassian.net", "project_key": "PROJ", "username": "bot"}},
                "dry_run": true
            }}"#
        )
        .unwrap();

        let settings = Settings::load(file.path()).await.unwrap();
        assert!(settings.dry_run);
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.analysis, AnalysisSettings::default());
        let jira = settings.jira.unwrap();
        assert_eq!(jira.project_key, "PROJ");
        assert!(jira.api_token.is_none());
    }

    #[tokio::test]
    async fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = Settings::load_or_default(Some(&missing)).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Settings::load(file.path()).await.unwrap_err();
        assert!(matches!(err, Error::Serde(_)));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let settings = Settings {
            jira: Some(JiraSettings {
                base_url: "https://example.atlassian.net".into(),
                project_key: String::new(),
                username: "bot".into(),
                api_token: None,
            }),
            servicenow: Some(ServiceNowSettings {
                instance_url: " ".into(),
                username: "admin".into(),
                password: None,
            }),
            request_timeout_secs: 0,
            ..Settings::default()
        };
        let Err(Error::Config(message)) = settings.validate() else {
            panic!("expected config error");
        };
        assert_eq!(
            message,
            "request_timeout_secs must be at least 1; jira.project_key is empty; servicenow.instance_url is empty"
        );
    }

    #[test]
    fn test_resolve_secret_order() {
        let never = || -> Option<String> { panic!("keyring consulted") };
        assert_eq!(
            resolve_secret(Some("file"), Some("env".into()), never),
            Some("file".into())
        );
        assert_eq!(
            resolve_secret(Some("  "), Some("env".into()), never),
            Some("env".into())
        );
        assert_eq!(
            resolve_secret(None, Some(String::new()), || Some("keyring".into())),
            Some("keyring".into())
        );
        assert_eq!(resolve_secret(None, None, || None), None);
    }

    #[test]
    fn test_configured_token_wins() {
        let jira = JiraSettings {
            base_url: "https://example.atlassian.net".into(),
            project_key: "PROJ".into(),
            username: "bot".into(),
            api_token: Some("tok".into()),
        };
        assert_eq!(jira.resolve_api_token().unwrap(), "tok");
    }
}
