use std::collections::BTreeSet;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use concierge_form::{StepSpec, ValidationResult};

use crate::cmd::answers::AnswersDocument;
use crate::cmd::prompt::{prompt_field, prompt_yes_no};
use crate::config::ConciergeConfig;
use crate::intake::interest_form;
use crate::notice::NoticeBus;
use crate::session::{SubmissionReport, SubmitOutcome, WizardSession};
use crate::wizard::{Advance, Wizard, WizardPhase};

#[derive(Args, Debug, Clone)]
pub struct WizardArgs {
    /// Answers file to submit instead of prompting
    #[arg(long = "answers", value_name = "answers.json")]
    pub answers: Option<PathBuf>,
    /// TOML file with supabase, resend and submission sections
    #[arg(long = "config", value_name = "concierge.toml")]
    pub config: Option<PathBuf>,
    /// Keep the record and email in memory even when collaborators are configured
    #[arg(long = "dry-run", default_value_t = false)]
    pub dry_run: bool,
    /// Print the submission report as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: WizardArgs) -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?
        .block_on(run_async(args))
}

async fn run_async(args: WizardArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let notices = NoticeBus::default();
    let session = WizardSession::new(
        Wizard::new(interest_form())?,
        config.record_store()?,
        config.notifier()?,
    )
    .with_config(&config.submission)
    .with_notices(notices.clone());

    let report = match &args.answers {
        Some(path) => submit_answers(&session, &AnswersDocument::load(path)?).await?,
        None if io::stdin().is_terminal() && io::stdout().is_terminal() => {
            drive_interactive(&session).await?
        }
        None => bail!("stdin is not a terminal; pass --answers <answers.json>"),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for notice in notices.notices() {
            println!("{}", notice.title);
            if let Some(description) = &notice.description {
                println!("{description}");
            }
        }
    }
    notices.shutdown();
    Ok(())
}

fn resolve_config(args: &WizardArgs) -> Result<ConciergeConfig> {
    let mut config = match &args.config {
        Some(path) => ConciergeConfig::load(path)?,
        None => ConciergeConfig::from_env(),
    };
    if args.dry_run {
        config.supabase = None;
        config.resend = None;
    }
    if config.is_dry_run() {
        eprintln!("dry run: no supabase or resend configuration, keeping the enquiry in memory");
    }
    Ok(config)
}

/// Fills every answer up front, then walks the steps like a user would.
pub async fn submit_answers(
    session: &WizardSession,
    doc: &AnswersDocument,
) -> Result<SubmissionReport> {
    for (name, value) in doc.field_values()? {
        session
            .update_field(&name, value)
            .await
            .with_context(|| format!("answer `{name}` was not accepted"))?;
    }
    let form = session.form().await;
    while let WizardPhase::Editing(index) = session.snapshot().await.phase {
        if index == form.last_step() {
            break;
        }
        if let Advance::Rejected(result) = session.next().await? {
            bail!(
                "step `{}` is invalid:\n{}",
                form.steps[index].id,
                describe_errors(&result)
            );
        }
    }
    session.confirm_submit().await;
    finish(session.submit().await, &form.steps[form.last_step()])
}

async fn drive_interactive(session: &WizardSession) -> Result<SubmissionReport> {
    let form = session.form().await;
    println!("{}", form.title);
    loop {
        let WizardPhase::Editing(index) = session.snapshot().await.phase else {
            bail!("wizard left editing without a confirmed submission");
        };
        let step = &form.steps[index];
        println!();
        println!("[{}/{}] {}", index + 1, form.steps.len(), step.title);
        if let Some(description) = &step.description {
            println!("{description}");
        }

        let mut only: Option<BTreeSet<String>> = None;
        loop {
            fill_step(session, step, only.as_ref()).await?;
            if index < form.last_step() {
                match session.next().await? {
                    Advance::Moved { .. } => break,
                    Advance::Rejected(result) => only = Some(print_rejection(&result)),
                }
                continue;
            }
            if !prompt_yes_no("Submit your enquiry now?", true)? {
                bail!("submission cancelled");
            }
            session.confirm_submit().await;
            match session.submit().await {
                SubmitOutcome::Rejected(result) => only = Some(print_rejection(&result)),
                outcome => return finish(outcome, step),
            }
        }
    }
}

async fn fill_step(
    session: &WizardSession,
    step: &StepSpec,
    only: Option<&BTreeSet<String>>,
) -> Result<()> {
    for field in &step.fields {
        if let Some(only) = only
            && !only.contains(&field.id)
        {
            continue;
        }
        // Visibility can change with every answer, so re-read it per field.
        let snapshot = session.snapshot().await;
        let visible = field
            .visible_if
            .as_ref()
            .is_none_or(|condition| condition.evaluate(&snapshot.fields));
        if !visible {
            continue;
        }
        if let Some(message) = snapshot.errors.get(&field.id) {
            println!("  ! {message}");
        }
        let value = prompt_field(field, snapshot.fields.get(&field.id))?;
        session.update_field(&field.id, value).await?;
    }
    Ok(())
}

fn finish(outcome: SubmitOutcome, last_step: &StepSpec) -> Result<SubmissionReport> {
    match outcome {
        SubmitOutcome::Confirmed(report) => Ok(*report),
        SubmitOutcome::Rejected(result) => Err(anyhow!(
            "step `{}` is invalid:\n{}",
            last_step.id,
            describe_errors(&result)
        )),
        SubmitOutcome::Failed { reason } => Err(anyhow!("submission failed: {reason}")),
        SubmitOutcome::Ignored => Err(anyhow!("submission was ignored")),
    }
}

fn print_rejection(result: &ValidationResult) -> BTreeSet<String> {
    println!("Please fix the following:");
    println!("{}", describe_errors(result));
    result.errors.keys().cloned().collect()
}

pub(crate) fn describe_errors(result: &ValidationResult) -> String {
    result
        .errors
        .values()
        .map(|error| format!("  - {}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("\n")
}
