//! Secure credential storage using system keyring.
//!
//! Ticket-system tokens and the analysis API key can live in the
//! platform's native credential storage instead of the settings file:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use std::fmt;
use std::str::FromStr;

use keyring::Entry;
use tracing::{debug, warn};

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "mailroute";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Unknown credential kind name.
    #[error("Unknown credential kind: {0} (expected jira, servicenow or analysis)")]
    UnknownKind(String),
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Which secret an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Jira API token.
    JiraToken,
    /// ServiceNow password.
    ServiceNowPassword,
    /// Analysis provider API key.
    AnalysisApiKey,
}

impl CredentialKind {
    /// Keyring entry type identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JiraToken => "jira_token",
            Self::ServiceNowPassword => "servicenow_password",
            Self::AnalysisApiKey => "analysis_api_key",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jira" | "jira_token" => Ok(Self::JiraToken),
            "servicenow" | "servicenow_password" => Ok(Self::ServiceNowPassword),
            "analysis" | "analysis_api_key" => Ok(Self::AnalysisApiKey),
            other => Err(CredentialError::UnknownKind(other.to_string())),
        }
    }
}

/// Generates the keyring entry key for a credential.
fn credential_key(kind: CredentialKind, user: &str) -> String {
    format!("{SERVICE_NAME}_{kind}_{}", user.to_lowercase())
}

/// Stores a secret in the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn store_secret(kind: CredentialKind, user: &str, secret: &str) -> CredentialResult<()> {
    let entry = Entry::new(SERVICE_NAME, &credential_key(kind, user))?;
    entry.set_password(secret)?;
    debug!("Stored {kind} for {user}");
    Ok(())
}

/// Retrieves a secret from the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn get_secret(kind: CredentialKind, user: &str) -> CredentialResult<Option<String>> {
    let entry = Entry::new(SERVICE_NAME, &credential_key(kind, user))?;
    match entry.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => {
            debug!("No {kind} found for {user}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes a secret from the keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails (except for missing entries).
pub fn delete_secret(kind: CredentialKind, user: &str) -> CredentialResult<()> {
    let entry = Entry::new(SERVICE_NAME, &credential_key(kind, user))?;
    match entry.delete_credential() {
        Ok(()) => {
            debug!("Deleted {kind} for {user}");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            debug!("No {kind} to delete for {user}");
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete {kind}: {e}");
            Err(e.into())
        }
    }
}
