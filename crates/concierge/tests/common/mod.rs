#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use concierge::intake::field;
use concierge::{Wizard, WizardSession, interest_form};
use concierge_collaborators::{
    FinalizedRecord, NotificationError, Notifier, PersistenceError, RecordStore, SavedRecord,
};
use concierge_form::FieldValue;

pub fn contact_answers() -> Vec<(&'static str, FieldValue)> {
    vec![
        (field::FIRST_NAME, FieldValue::text("Mere")),
        (field::LAST_NAME, FieldValue::text("Tane")),
        (field::EMAIL, FieldValue::text("mere@example.com")),
        (field::PHONE, FieldValue::text("+64 21 000 0000")),
        (field::COUNTRY, FieldValue::text("New Zealand")),
    ]
}

pub fn travel_answers() -> Vec<(&'static str, FieldValue)> {
    vec![
        (field::DEPARTURE_COUNTRY, FieldValue::text("New Zealand")),
        (field::DEPARTURE_CITY, FieldValue::text("Auckland")),
        (field::TRAVEL_PERIOD, FieldValue::text("March 2027")),
        (field::SURGERY_TYPE, FieldValue::text("bariatric")),
        (field::QUOTE_AMOUNT, FieldValue::text("12500")),
    ]
}

pub fn confirm_answers() -> Vec<(&'static str, FieldValue)> {
    vec![(field::TERMS_ACCEPTED, FieldValue::Flag(true))]
}

pub fn all_answers() -> Vec<(&'static str, FieldValue)> {
    let mut answers = contact_answers();
    answers.extend(travel_answers());
    answers.extend(confirm_answers());
    answers
}

pub fn wizard() -> Wizard {
    Wizard::new(interest_form()).expect("interest form is valid")
}

/// Session on the last step with every answer valid.
pub async fn ready_session(
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
) -> WizardSession {
    let session = WizardSession::new(wizard(), store, notifier);
    fill_to_last_step(&session).await;
    session
}

pub async fn fill_to_last_step(session: &WizardSession) {
    for (name, value) in all_answers() {
        session.update_field(name, value).await.unwrap();
    }
    session.next().await.unwrap();
    session.next().await.unwrap();
}

/// Records calls and answers after an optional delay.
#[derive(Default)]
pub struct CountingStore {
    calls: AtomicUsize,
    delay: Duration,
    fail: bool,
}

impl CountingStore {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn save(&self, record: &FinalizedRecord) -> Result<SavedRecord, PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(PersistenceError::Transport("connection refused".into()));
        }
        Ok(SavedRecord {
            id: "row-1".into(),
            reference_code: record.reference_code.clone(),
        })
    }

    fn store_id(&self) -> &str {
        "counting"
    }
}

#[derive(Default)]
pub struct CountingNotifier {
    calls: AtomicUsize,
    delay: Duration,
    fail: bool,
}

impl CountingNotifier {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn notify(&self, _record: &FinalizedRecord) -> Result<(), NotificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(NotificationError::Rejected {
                status: 422,
                body: "invalid from address".into(),
            });
        }
        Ok(())
    }

    fn notifier_id(&self) -> &str {
        "counting"
    }
}
