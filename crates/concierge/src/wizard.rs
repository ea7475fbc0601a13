//! Step state machine for one wizard session.
//!
//! The machine is synchronous and owns its fields outright. Collaborator
//! calls happen in [`crate::session::WizardSession`], which drives the
//! submission phases exposed here.

use std::collections::BTreeMap;

use concierge_collaborators::FinalizedRecord;
use concierge_form::{
    FieldValue, Fields, FormError, FormSpec, StepSpec, ValidationResult, VisibilityMap,
    resolve_visibility,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
pub enum WizardPhase {
    Editing(usize),
    Submitting,
    Confirmed,
    SubmissionError,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    NotSubmitted,
    Submitting,
    Submitted,
    Failed,
}

/// Transitions the machine refuses outright. A step that fails validation
/// is not an error; see [`Advance::Rejected`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("field `{0}` is not declared by the form")]
    UnknownField(String),
    #[error("the wizard is {0:?} and cannot be edited or navigated")]
    Locked(WizardPhase),
    #[error("step {0} is the last step; submit instead")]
    NoNextStep(usize),
}

/// Result of a forward navigation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved { step: usize },
    Rejected(ValidationResult),
}

/// Decision taken when a submission is requested.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SubmitGate {
    Ignored,
    Rejected(ValidationResult),
    Proceed(Fields),
}

/// Read-only copy of the state, for rendering and reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardSnapshot {
    pub phase: WizardPhase,
    pub status: SubmissionStatus,
    pub fields: Fields,
    pub errors: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FinalizedRecord>,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    form: FormSpec,
    phase: WizardPhase,
    fields: Fields,
    errors: BTreeMap<String, String>,
    status: SubmissionStatus,
    submit_confirmed: bool,
    result: Option<FinalizedRecord>,
}

impl Wizard {
    pub fn new(form: FormSpec) -> Result<Self, FormError> {
        form.check()?;
        let fields = form.empty_fields();
        Ok(Self {
            form,
            phase: WizardPhase::Editing(0),
            fields,
            errors: BTreeMap::new(),
            status: SubmissionStatus::NotSubmitted,
            submit_confirmed: false,
            result: None,
        })
    }

    pub fn form(&self) -> &FormSpec {
        &self.form
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn current_step(&self) -> Option<usize> {
        match self.phase {
            WizardPhase::Editing(step) => Some(step),
            _ => None,
        }
    }

    pub fn step(&self) -> Option<&StepSpec> {
        self.current_step().and_then(|index| self.form.steps.get(index))
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step() == Some(self.form.last_step())
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Inline messages from the last rejected navigation, minus fields
    /// edited since.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn result_record(&self) -> Option<&FinalizedRecord> {
        self.result.as_ref()
    }

    pub fn submit_confirmed(&self) -> bool {
        self.submit_confirmed
    }

    /// Which fields of the current step are shown for the current answers.
    pub fn visibility(&self) -> VisibilityMap {
        self.step()
            .map(|step| resolve_visibility(step, &self.fields))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            phase: self.phase,
            status: self.status,
            fields: self.fields.clone(),
            errors: self.errors.clone(),
            result: self.result.clone(),
        }
    }

    pub fn update_field(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), WizardError> {
        self.ensure_editing()?;
        let slot = self
            .fields
            .get_mut(name)
            .ok_or_else(|| WizardError::UnknownField(name.to_string()))?;
        *slot = value.into();
        self.errors.remove(name);
        // A confirmation covers the answers it was given for.
        self.submit_confirmed = false;
        Ok(())
    }

    /// Moves forward when the current step validates. On rejection only the
    /// inline error messages change.
    pub fn next(&mut self) -> Result<Advance, WizardError> {
        let step = self.ensure_editing()?;
        if step >= self.form.last_step() {
            return Err(WizardError::NoNextStep(step));
        }
        let result = self.form.steps[step].validate(&self.fields);
        if !result.valid {
            debug!(step, errors = result.errors.len(), "forward navigation rejected");
            self.errors = result.field_errors();
            return Ok(Advance::Rejected(result));
        }
        self.errors.clear();
        self.phase = WizardPhase::Editing(step + 1);
        debug!(from = step, to = step + 1, "wizard advanced");
        Ok(Advance::Moved { step: step + 1 })
    }

    /// Steps back without validating. A no-op on the first step.
    pub fn back(&mut self) -> Result<usize, WizardError> {
        let step = self.ensure_editing()?;
        self.submit_confirmed = false;
        if step == 0 {
            return Ok(0);
        }
        self.phase = WizardPhase::Editing(step - 1);
        debug!(from = step, to = step - 1, "wizard moved back");
        Ok(step - 1)
    }

    /// Records an explicit user request to submit. Only honoured on the last
    /// step, and dropped again by any later edit or backward move.
    pub fn confirm_submit(&mut self) {
        if self.is_last_step() {
            self.submit_confirmed = true;
        } else {
            debug!(phase = ?self.phase, "submit confirmation outside the last step ignored");
        }
    }

    /// Discards all answers and returns to the first step.
    pub fn reset(&mut self) -> Result<(), WizardError> {
        if self.phase == WizardPhase::Submitting {
            return Err(WizardError::Locked(self.phase));
        }
        self.phase = WizardPhase::Editing(0);
        self.fields = self.form.empty_fields();
        self.errors.clear();
        self.status = SubmissionStatus::NotSubmitted;
        self.submit_confirmed = false;
        self.result = None;
        debug!("wizard reset");
        Ok(())
    }

    /// Consumes the confirmation latch and, when the final step is valid,
    /// enters `Submitting` and hands back a snapshot of the answers.
    pub(crate) fn begin_submit(&mut self) -> SubmitGate {
        if !self.is_last_step() || !self.submit_confirmed {
            return SubmitGate::Ignored;
        }
        self.submit_confirmed = false;
        let last = self.form.last_step();
        let result = self.form.steps[last].validate(&self.fields);
        if !result.valid {
            self.errors = result.field_errors();
            return SubmitGate::Rejected(result);
        }
        self.errors.clear();
        self.phase = WizardPhase::Submitting;
        self.status = SubmissionStatus::Submitting;
        debug!("wizard submitting");
        SubmitGate::Proceed(self.fields.clone())
    }

    pub(crate) fn complete_submission(&mut self, record: FinalizedRecord) {
        if self.phase != WizardPhase::Submitting {
            return;
        }
        self.phase = WizardPhase::Confirmed;
        self.status = SubmissionStatus::Submitted;
        self.result = Some(record);
        debug!("wizard confirmed");
    }

    pub(crate) fn fail_submission(&mut self) {
        if self.phase != WizardPhase::Submitting {
            return;
        }
        self.phase = WizardPhase::SubmissionError;
        self.status = SubmissionStatus::Failed;
        debug!("wizard submission failed");
    }

    fn ensure_editing(&self) -> Result<usize, WizardError> {
        self.current_step().ok_or(WizardError::Locked(self.phase))
    }
}
