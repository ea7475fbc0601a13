//! Record store backed by a Supabase (PostgREST) table.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use url::Url;

use crate::config::{ConfigError, SupabaseConfig};
use crate::record::{
    FinalizedRecord, LogisticsStatus, PaymentStatus, SavedRecord, SurgeryType,
};
use crate::store::{PersistenceError, RecordStore};

/// Row shape of the bookings table. Column names follow the table, not the
/// in-process record.
#[derive(Debug, Serialize)]
struct BookingRow<'a> {
    reference_code: &'a str,
    full_name: String,
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: &'a str,
    country: &'a str,
    departure_country: &'a str,
    departure_city: &'a str,
    travel_period: &'a str,
    surgery_type: SurgeryType,
    quote_amount: Option<f64>,
    notes: Option<&'a str>,
    payment_status: PaymentStatus,
    questionnaire_complete: bool,
    logistics_status: LogisticsStatus,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl<'a> From<&'a FinalizedRecord> for BookingRow<'a> {
    fn from(record: &'a FinalizedRecord) -> Self {
        Self {
            reference_code: &record.reference_code,
            full_name: record.full_name(),
            first_name: &record.first_name,
            last_name: &record.last_name,
            email: &record.email,
            phone: &record.phone,
            country: &record.country,
            departure_country: &record.departure_country,
            departure_city: &record.departure_city,
            travel_period: &record.travel_period,
            surgery_type: record.surgery_type,
            quote_amount: record.quote_amount,
            notes: record.notes.as_deref(),
            payment_status: record.payment_status,
            questionnaire_complete: record.questionnaire_complete,
            logistics_status: record.logistics_status,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: serde_json::Value,
    reference_code: String,
}

pub struct SupabaseStore {
    client: Client,
    insert_url: Url,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig) -> Result<Self, ConfigError> {
        Self::with_client(config, Client::builder().build()?)
    }

    pub fn with_client(config: &SupabaseConfig, client: Client) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            insert_url: config.insert_url()?,
            api_key: config.api_key.trim().to_string(),
        })
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn save(&self, record: &FinalizedRecord) -> Result<SavedRecord, PersistenceError> {
        debug!(url = %self.insert_url, reference = %record.reference_code, "inserting booking row");
        let response = self
            .client
            .post(self.insert_url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&BookingRow::from(record))
            .send()
            .await
            .map_err(|err| PersistenceError::Transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(PersistenceError::DuplicateReference(
                record.reference_code.clone(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<InsertedRow> = response
            .json()
            .await
            .map_err(|err| PersistenceError::Decode(err.to_string()))?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| PersistenceError::Decode("insert returned no rows".into()))?;
        let id = match row.id {
            serde_json::Value::String(id) => id,
            other => other.to_string(),
        };
        Ok(SavedRecord {
            id,
            reference_code: row.reference_code,
        })
    }

    fn store_id(&self) -> &str {
        "supabase"
    }
}
