//! Wiring settings into a pipeline and running commands.

use std::io::{BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use mailroute_core::config::ANALYSIS_KEYRING_USER;
use mailroute_core::credentials;
use mailroute_core::{
    AnalysisClient, CredentialKind, DryRunSystem, HttpAnalysisProvider, InMemoryReviewQueue,
    JiraClient, Outcome, Pipeline, ReviewSink, ServiceNowClient, Settings, TicketSubmitter,
};
use tracing::info;

use crate::cli::{Cli, Command, CredentialsAction};

/// Runs the parsed command line.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::load_or_default(cli.config.as_deref())
        .await
        .context("failed to load settings")?;
    settings.dry_run |= cli.dry_run;
    settings.validate()?;

    match cli.command {
        Command::Process { file } => {
            let mut pipeline = build_pipeline(&settings)?;
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;

            let run = pipeline.process_email(&raw).await;
            for line in &run.log {
                println!("{line}");
            }

            export_review(cli.review_out.as_deref(), pipeline.sink()).await?;
            Ok(exit_code(matches!(run.outcome, Outcome::Failed(_))))
        }
        Command::Bulk { files } => {
            let mut pipeline = build_pipeline(&settings)?;
            let report = pipeline.process_files(&files).await;

            for entry in &report.entries {
                println!("{}: {}", entry.path.display(), entry.outcome);
            }
            println!("{}", report.summary());

            export_review(cli.review_out.as_deref(), pipeline.sink()).await?;
            let any_failed = report.entries.iter().any(|entry| {
                entry
                    .run
                    .as_ref()
                    .is_none_or(|run| matches!(run.outcome, Outcome::Failed(_)))
            });
            Ok(exit_code(any_failed))
        }
        Command::Credentials { action } => {
            manage_credentials(&settings, action)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

const fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Builds a pipeline with an in-memory review queue from settings.
///
/// In dry-run mode one [`DryRunSystem`] serves both ticket systems.
/// Otherwise each configured system gets its REST client; unconfigured
/// systems are left out and their tickets fail at submission.
pub fn build_pipeline(settings: &Settings) -> Result<Pipeline<InMemoryReviewQueue>> {
    let timeout = settings.request_timeout();

    let provider = HttpAnalysisProvider::new(
        &settings.analysis.endpoint,
        &settings.analysis.model,
        settings.analysis.resolve_api_key(),
        timeout,
    )
    .context("failed to create analysis client")?;
    let analysis = AnalysisClient::new(Arc::new(provider));

    let mut submitter = TicketSubmitter::new();
    if settings.dry_run {
        info!("Dry run: no tickets will be created");
        let dry_run = Arc::new(DryRunSystem::new());
        submitter = submitter
            .with_issue_tracker(dry_run.clone())
            .with_incident_system(dry_run);
    } else {
        if let Some(jira) = &settings.jira {
            let client = JiraClient::new(
                &jira.base_url,
                &jira.project_key,
                &jira.username,
                jira.resolve_api_token()?,
                timeout,
            )
            .context("failed to create Jira client")?;
            submitter = submitter.with_issue_tracker(Arc::new(client));
        }
        if let Some(servicenow) = &settings.servicenow {
            let client = ServiceNowClient::new(
                &servicenow.instance_url,
                &servicenow.username,
                servicenow.resolve_password()?,
                timeout,
            )
            .context("failed to create ServiceNow client")?;
            submitter = submitter.with_incident_system(Arc::new(client));
        }
    }

    Ok(Pipeline::new(analysis, submitter, InMemoryReviewQueue::new()))
}

/// Writes the review queue snapshot as pretty JSON.
async fn export_review(path: Option<&Path>, sink: &impl ReviewSink) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let items = sink.snapshot();
    let json = serde_json::to_string_pretty(&items)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(count = items.len(), path = %path.display(), "Wrote review queue");
    Ok(())
}

fn manage_credentials(settings: &Settings, action: CredentialsAction) -> Result<()> {
    match action {
        CredentialsAction::Set { kind, user } => {
            let user = keyring_user(settings, kind, user)?;
            eprint!("Enter {kind} secret for {user}: ");
            std::io::stderr().flush()?;

            let mut secret = String::new();
            std::io::stdin().lock().read_line(&mut secret)?;
            let secret = secret.trim_end_matches(['\r', '\n']);
            if secret.is_empty() {
                bail!("no secret given");
            }

            credentials::store_secret(kind, &user, secret)?;
            eprintln!("Stored {kind} secret for {user}");
        }
        CredentialsAction::Delete { kind, user } => {
            let user = keyring_user(settings, kind, user)?;
            credentials::delete_secret(kind, &user)?;
            eprintln!("Deleted {kind} secret for {user}");
        }
    }
    Ok(())
}

/// Account name a secret is stored under.
fn keyring_user(settings: &Settings, kind: CredentialKind, user: Option<String>) -> Result<String> {
    if let Some(user) = user {
        return Ok(user);
    }
    match kind {
        CredentialKind::AnalysisApiKey => Ok(ANALYSIS_KEYRING_USER.to_string()),
        CredentialKind::JiraToken => settings
            .jira
            .as_ref()
            .map(|jira| jira.username.clone())
            .context("Jira is not configured; pass --user"),
        CredentialKind::ServiceNowPassword => settings
            .servicenow
            .as_ref()
            .map(|servicenow| servicenow.username.clone())
            .context("ServiceNow is not configured; pass --user"),
    }
}
