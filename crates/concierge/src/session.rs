//! Async wrapper around a [`Wizard`] that owns the collaborators and
//! carries out submission.
//!
//! The wizard lock is only held while the machine changes phase. Both
//! collaborator calls run on a spawned task with the lock released, so a
//! second `submit()` arriving meanwhile sees `Submitting` and is ignored.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use concierge_collaborators::{FinalizedRecord, Notifier, RecordStore, SavedRecord};
use concierge_form::{FieldValue, FormSpec, ValidationResult, validate_email};
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::SubmissionConfig;
use crate::intake::assemble_record;
use crate::notice::{NewNotice, NoticeBus};
use crate::reference::ReferenceGenerator;
use crate::wizard::{Advance, SubmitGate, Wizard, WizardError, WizardSnapshot};

/// What happened to one collaborator call. Never blocks confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CollaboratorOutcome {
    Succeeded,
    Failed { message: String },
    TimedOut,
    Skipped { reason: String },
}

impl CollaboratorOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CollaboratorOutcome::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReport {
    pub reference_code: String,
    pub record: FinalizedRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<SavedRecord>,
    pub persistence: CollaboratorOutcome,
    pub notification: CollaboratorOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Reached `Confirmed`, whatever the collaborators reported.
    Confirmed(Box<SubmissionReport>),
    /// The final step did not validate; the wizard stays on it.
    Rejected(ValidationResult),
    /// No confirmed user action, or a submission is already under way.
    Ignored,
    /// The answers could not be turned into a record.
    Failed { reason: String },
}

#[derive(Clone)]
pub struct WizardSession {
    wizard: Arc<Mutex<Wizard>>,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    references: ReferenceGenerator,
    timeout: Option<Duration>,
    notices: Option<NoticeBus>,
}

impl fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardSession")
            .field("store", &self.store.store_id())
            .field("notifier", &self.notifier.notifier_id())
            .field("references", &self.references)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl WizardSession {
    pub fn new(wizard: Wizard, store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            wizard: Arc::new(Mutex::new(wizard)),
            store,
            notifier,
            references: ReferenceGenerator::default(),
            timeout: None,
            notices: None,
        }
    }

    pub fn with_config(mut self, config: &SubmissionConfig) -> Self {
        self.references = config.reference_generator();
        self.timeout = config.collaborator_timeout();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_references(mut self, references: ReferenceGenerator) -> Self {
        self.references = references;
        self
    }

    pub fn with_notices(mut self, notices: NoticeBus) -> Self {
        self.notices = Some(notices);
        self
    }

    pub fn notices(&self) -> Option<&NoticeBus> {
        self.notices.as_ref()
    }

    pub async fn form(&self) -> FormSpec {
        self.wizard.lock().await.form().clone()
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        self.wizard.lock().await.snapshot()
    }

    pub async fn update_field(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), WizardError> {
        self.wizard.lock().await.update_field(name, value)
    }

    /// Forward navigation. A rejection is also published as a notice.
    pub async fn next(&self) -> Result<Advance, WizardError> {
        let advance = self.wizard.lock().await.next()?;
        if let Advance::Rejected(result) = &advance {
            self.publish_rejection(result);
        }
        Ok(advance)
    }

    pub async fn back(&self) -> Result<usize, WizardError> {
        self.wizard.lock().await.back()
    }

    /// The explicit user action that arms the next `submit()`.
    pub async fn confirm_submit(&self) {
        self.wizard.lock().await.confirm_submit();
    }

    pub async fn reset(&self) -> Result<(), WizardError> {
        self.wizard.lock().await.reset()
    }

    /// Runs the submission at most once per confirmation.
    ///
    /// Persistence and notification are attempted concurrently and their
    /// failures are logged, not returned; the wizard reaches `Confirmed`
    /// either way. Must be called from within a tokio runtime. Once the
    /// wizard is `Submitting`, cancelling this future does not cancel the
    /// collaborator calls.
    pub async fn submit(&self) -> SubmitOutcome {
        let record = {
            let mut wizard = self.wizard.lock().await;
            match wizard.begin_submit() {
                SubmitGate::Ignored => {
                    debug!(phase = ?wizard.phase(), "submit ignored");
                    return SubmitOutcome::Ignored;
                }
                SubmitGate::Rejected(result) => {
                    drop(wizard);
                    self.publish_rejection(&result);
                    return SubmitOutcome::Rejected(result);
                }
                SubmitGate::Proceed(fields) => {
                    let code = self.references.generate();
                    match assemble_record(&fields, code, OffsetDateTime::now_utc()) {
                        Ok(record) => record,
                        Err(err) => {
                            wizard.fail_submission();
                            warn!(error = %err, "submission could not be assembled");
                            return SubmitOutcome::Failed {
                                reason: err.to_string(),
                            };
                        }
                    }
                }
            }
        };

        // Collaborators settle on their own task; dropping this future
        // leaves it running.
        let settle = tokio::spawn(self.clone().settle(record));
        match settle.await {
            Ok(report) => SubmitOutcome::Confirmed(Box::new(report)),
            Err(err) => {
                self.wizard.lock().await.fail_submission();
                warn!(error = %err, "submission task did not finish");
                SubmitOutcome::Failed {
                    reason: format!("submission task did not finish: {err}"),
                }
            }
        }
    }

    /// Runs both collaborators to completion and moves the wizard to
    /// `Confirmed`, whatever they report.
    async fn settle(self, record: FinalizedRecord) -> SubmissionReport {
        let reference = record.reference_code.clone();
        let email_ok = validate_email(&record.email).is_ok();
        let ((persistence, saved), notification) = tokio::join!(
            self.persist(&record),
            self.notify(&record, email_ok)
        );

        if let CollaboratorOutcome::Failed { message } = &persistence {
            warn!(reference = %reference, store = self.store.store_id(), error = %message, "record was not saved");
        } else if persistence == CollaboratorOutcome::TimedOut {
            warn!(reference = %reference, store = self.store.store_id(), "record save timed out");
        }
        match &notification {
            CollaboratorOutcome::Failed { message } => {
                warn!(reference = %reference, notifier = self.notifier.notifier_id(), error = %message, "confirmation was not sent")
            }
            CollaboratorOutcome::TimedOut => {
                warn!(reference = %reference, notifier = self.notifier.notifier_id(), "confirmation timed out")
            }
            CollaboratorOutcome::Skipped { reason } => {
                warn!(reference = %reference, reason = %reason, "confirmation skipped")
            }
            CollaboratorOutcome::Succeeded => {}
        }

        self.wizard.lock().await.complete_submission(record.clone());
        info!(
            reference = %reference,
            saved = persistence.is_success(),
            notified = notification.is_success(),
            "submission confirmed"
        );
        if let Some(notices) = &self.notices {
            notices.push(
                NewNotice::success("Thank you! Your interest has been registered.")
                    .with_description(format!("Your reference code is {reference}.")),
            );
        }

        SubmissionReport {
            reference_code: reference,
            record,
            saved,
            persistence,
            notification,
        }
    }

    async fn persist(
        &self,
        record: &FinalizedRecord,
    ) -> (CollaboratorOutcome, Option<SavedRecord>) {
        match bounded(self.timeout, self.store.save(record)).await {
            Ok(Ok(saved)) => (CollaboratorOutcome::Succeeded, Some(saved)),
            Ok(Err(err)) => (
                CollaboratorOutcome::Failed {
                    message: err.to_string(),
                },
                None,
            ),
            Err(Elapsed) => (CollaboratorOutcome::TimedOut, None),
        }
    }

    async fn notify(&self, record: &FinalizedRecord, email_ok: bool) -> CollaboratorOutcome {
        if !email_ok {
            return CollaboratorOutcome::Skipped {
                reason: "email address failed validation".to_string(),
            };
        }
        match bounded(self.timeout, self.notifier.notify(record)).await {
            Ok(Ok(())) => CollaboratorOutcome::Succeeded,
            Ok(Err(err)) => CollaboratorOutcome::Failed {
                message: err.to_string(),
            },
            Err(Elapsed) => CollaboratorOutcome::TimedOut,
        }
    }

    fn publish_rejection(&self, result: &ValidationResult) {
        if let Some(notices) = &self.notices {
            let count = result.errors.len();
            let noun = if count == 1 { "field needs" } else { "fields need" };
            notices.push(
                NewNotice::warning("Please check your answers")
                    .with_description(format!("{count} {noun} attention before you continue.")),
            );
        }
    }
}

struct Elapsed;

async fn bounded<F: Future>(timeout: Option<Duration>, future: F) -> Result<F::Output, Elapsed> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| Elapsed),
        None => Ok(future.await),
    }
}
