//! Interest and booking wizard for a medical-tourism travel concierge.
//!
//! [`Wizard`] is the synchronous step machine. [`WizardSession`] wraps it
//! for async callers and performs the one-shot submission against a
//! [`RecordStore`](concierge_collaborators::RecordStore) and a
//! [`Notifier`](concierge_collaborators::Notifier). The built-in form lives
//! in [`intake`].

pub mod config;
pub mod intake;
pub mod notice;
pub mod reference;
pub mod session;
pub mod wizard;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod cmd;
#[cfg(feature = "cli")]
pub mod telemetry;

pub use config::{ConciergeConfig, ConfigLoadError, SubmissionConfig};
pub use intake::{RecordError, assemble_record, interest_form};
pub use notice::{NewNotice, Notice, NoticeBus, NoticeBusConfig, NoticeId, NoticeLevel, NoticePatch};
pub use reference::ReferenceGenerator;
pub use session::{CollaboratorOutcome, SubmissionReport, SubmitOutcome, WizardSession};
pub use wizard::{Advance, SubmissionStatus, Wizard, WizardError, WizardPhase, WizardSnapshot};
