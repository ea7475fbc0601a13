use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Surgery category selected in the travel step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurgeryType {
    Bariatric,
    Cosmetic,
}

impl SurgeryType {
    pub const ALL: [SurgeryType; 2] = [SurgeryType::Bariatric, SurgeryType::Cosmetic];

    pub fn as_str(self) -> &'static str {
        match self {
            SurgeryType::Bariatric => "bariatric",
            SurgeryType::Cosmetic => "cosmetic",
        }
    }
}

impl fmt::Display for SurgeryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurgeryType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "bariatric" => Ok(SurgeryType::Bariatric),
            "cosmetic" => Ok(SurgeryType::Cosmetic),
            other => Err(format!("unknown surgery type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogisticsStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

/// The validated bundle produced by a confirmed submission.
///
/// Status flags are never user-entered; they start at their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedRecord {
    pub reference_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub departure_country: String,
    pub departure_city: String,
    pub travel_period: String,
    pub surgery_type: SurgeryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub payment_status: PaymentStatus,
    pub questionnaire_complete: bool,
    pub logistics_status: LogisticsStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl FinalizedRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// What a store returns after a successful insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRecord {
    pub id: String,
    pub reference_code: String,
}
