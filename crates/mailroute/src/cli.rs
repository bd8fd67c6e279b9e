//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mailroute_core::CredentialKind;

/// Route support emails to Jira, ServiceNow or human review.
#[derive(Debug, Parser)]
#[command(name = "mailroute", version, about)]
pub struct Cli {
    /// Settings file (default: <config dir>/mailroute/config.json)
    #[arg(long, global = true, env = "MAILROUTE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log tickets instead of creating them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Write the human review queue to this file as JSON after the run
    #[arg(long, global = true, value_name = "PATH")]
    pub review_out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a single email file
    Process {
        /// Raw email text file
        file: PathBuf,
    },

    /// Process several email files in order
    Bulk {
        /// Raw email text files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Manage secrets stored in the system keyring
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum CredentialsAction {
    /// Read a secret from stdin and store it
    Set {
        /// jira, servicenow or analysis
        kind: CredentialKind,
        /// Account name (default: the username from the settings file)
        #[arg(long)]
        user: Option<String>,
    },

    /// Remove a stored secret
    Delete {
        /// jira, servicenow or analysis
        kind: CredentialKind,
        /// Account name (default: the username from the settings file)
        #[arg(long)]
        user: Option<String>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bulk_with_global_flags() {
        let cli = Cli::try_parse_from([
            "mailroute",
            "bulk",
            "a.eml",
            "b.eml",
            "--dry-run",
            "--review-out",
            "review.json",
        ])
        .unwrap();

        assert!(cli.dry_run);
        assert_eq!(cli.review_out, Some(PathBuf::from("review.json")));
        let Command::Bulk { files } = cli.command else {
            panic!("expected bulk");
        };
        assert_eq!(files, [PathBuf::from("a.eml"), PathBuf::from("b.eml")]);
    }

    #[test]
    fn test_bulk_requires_files() {
        assert!(Cli::try_parse_from(["mailroute", "bulk"]).is_err());
    }

    #[test]
    fn test_parse_credentials_kind() {
        let cli = Cli::try_parse_from(["mailroute", "credentials", "set", "servicenow"]).unwrap();
        let Command::Credentials {
            action: CredentialsAction::Set { kind, user },
        } = cli.command
        else {
            panic!("expected credentials set");
        };
        assert_eq!(kind, CredentialKind::ServiceNowPassword);
        assert!(user.is_none());

        assert!(Cli::try_parse_from(["mailroute", "credentials", "set", "github"]).is_err());
    }
}
