use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::record::{FinalizedRecord, SavedRecord};

/// Errors a [`RecordStore`] can report. None of them reach the end user.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Another record already carries this reference code.
    #[error("reference code {0} is already taken")]
    DuplicateReference(String),
    #[error("store rejected the record with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("store transport failed: {0}")]
    Transport(String),
    #[error("store response could not be decoded: {0}")]
    Decode(String),
}

/// Durable storage for finalized records.
///
/// Implementations own reference-code uniqueness: a second insert with a
/// code that already exists must fail with
/// [`PersistenceError::DuplicateReference`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn save(&self, record: &FinalizedRecord) -> Result<SavedRecord, PersistenceError>;

    fn store_id(&self) -> &str;
}

/// In-process store keyed by reference code.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, (String, FinalizedRecord)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<FinalizedRecord> {
        self.records
            .lock()
            .await
            .values()
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub async fn get(&self, reference_code: &str) -> Option<FinalizedRecord> {
        self.records
            .lock()
            .await
            .get(reference_code)
            .map(|(_, record)| record.clone())
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn save(&self, record: &FinalizedRecord) -> Result<SavedRecord, PersistenceError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.reference_code) {
            return Err(PersistenceError::DuplicateReference(
                record.reference_code.clone(),
            ));
        }
        let id = Uuid::new_v4().to_string();
        records.insert(
            record.reference_code.clone(),
            (id.clone(), record.clone()),
        );
        Ok(SavedRecord {
            id,
            reference_code: record.reference_code.clone(),
        })
    }

    fn store_id(&self) -> &str {
        "memory"
    }
}
