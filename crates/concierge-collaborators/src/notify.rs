use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::DEFAULT_CONFIRMATION_SUBJECT;
use crate::record::FinalizedRecord;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("email provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("email transport failed: {0}")]
    Transport(String),
}

/// Side channel that tells the submitter their enquiry was received.
///
/// Callers validate the record's email before calling; implementations do
/// not re-check it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, record: &FinalizedRecord) -> Result<(), NotificationError>;

    fn notifier_id(&self) -> &str;
}

/// Rendered confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl ConfirmationEmail {
    pub fn for_record(record: &FinalizedRecord, subject: &str) -> Self {
        let name = record.first_name.as_str();
        let code = record.reference_code.as_str();
        let text = format!(
            "Hi {name},\n\n\
             Thank you for registering your interest in {surgery} surgery. \
             Your reference code is {code}.\n\n\
             One of our coordinators will contact you about your {period} travel plans. \
             Please quote your reference code in any correspondence.\n",
            surgery = record.surgery_type,
            period = record.travel_period,
        );
        let html = format!(
            "<p>Hi {name},</p>\
             <p>Thank you for registering your interest in {surgery} surgery. \
             Your reference code is <strong>{code}</strong>.</p>\
             <p>One of our coordinators will contact you about your {period} travel plans. \
             Please quote your reference code in any correspondence.</p>",
            name = escape_html(name),
            surgery = record.surgery_type,
            code = escape_html(code),
            period = escape_html(&record.travel_period),
        );
        Self {
            to: record.email.clone(),
            subject: format!("{subject} ({code})"),
            text,
            html,
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Records rendered messages instead of sending them.
#[derive(Debug)]
pub struct MemoryNotifier {
    subject: String,
    sent: Mutex<Vec<ConfirmationEmail>>,
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self {
            subject: DEFAULT_CONFIRMATION_SUBJECT.to_string(),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<ConfirmationEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, record: &FinalizedRecord) -> Result<(), NotificationError> {
        let email = ConfirmationEmail::for_record(record, &self.subject);
        self.sent.lock().await.push(email);
        Ok(())
    }

    fn notifier_id(&self) -> &str {
        "memory"
    }
}
