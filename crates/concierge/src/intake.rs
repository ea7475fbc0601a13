//! The interest form used by the booking flow and the mapping from its
//! answers to a [`FinalizedRecord`].

use concierge_collaborators::{
    FinalizedRecord, LogisticsStatus, PaymentStatus, SurgeryType,
};
use concierge_form::{Condition, FieldKind, FieldSpec, Fields, FormSpec, StepSpec, validate_number};
use thiserror::Error;
use time::OffsetDateTime;

pub const FORM_ID: &str = "concierge-interest";
pub const FORM_VERSION: &str = "1.0.0";

/// Country choice that reveals the free-text country field.
pub const OTHER_COUNTRY_SENTINEL: &str = "other";

pub const COUNTRIES: &[&str] = &[
    "New Zealand",
    "Australia",
    "United Kingdom",
    "Ireland",
    "United States",
    "Canada",
    OTHER_COUNTRY_SENTINEL,
];

pub mod field {
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const COUNTRY: &str = "country";
    pub const OTHER_COUNTRY: &str = "other_country";
    pub const DEPARTURE_COUNTRY: &str = "departure_country";
    pub const DEPARTURE_CITY: &str = "departure_city";
    pub const TRAVEL_PERIOD: &str = "travel_period";
    pub const SURGERY_TYPE: &str = "surgery_type";
    pub const QUOTE_AMOUNT: &str = "quote_amount";
    pub const NOTES: &str = "notes";
    pub const TERMS_ACCEPTED: &str = "terms_accepted";
}

/// Why a set of answers could not be turned into a record.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("field `{0}` is missing or blank")]
    Missing(&'static str),
    #[error("field `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub fn interest_form() -> FormSpec {
    FormSpec {
        id: FORM_ID.to_string(),
        title: "Register your interest".to_string(),
        version: FORM_VERSION.to_string(),
        steps: vec![contact_step(), travel_step(), confirm_step()],
    }
}

fn contact_step() -> StepSpec {
    StepSpec {
        description: Some("How can our coordinators reach you?".to_string()),
        ..StepSpec::new(
            "contact",
            "Your details",
            vec![
                FieldSpec::new(field::FIRST_NAME, FieldKind::Text, "First name").required(),
                FieldSpec::new(field::LAST_NAME, FieldKind::Text, "Last name").required(),
                FieldSpec::new(field::EMAIL, FieldKind::Email, "Email").required(),
                FieldSpec::new(field::PHONE, FieldKind::Phone, "Phone")
                    .required()
                    .with_help("Include your country code, e.g. +64 21 000 0000"),
                FieldSpec::new(field::COUNTRY, FieldKind::Choice, "Country of residence")
                    .required()
                    .with_choices(COUNTRIES.iter().copied()),
                FieldSpec::new(field::OTHER_COUNTRY, FieldKind::Text, "Please specify your country")
                    .required()
                    .visible_if(Condition::equals(field::COUNTRY, OTHER_COUNTRY_SENTINEL)),
            ],
        )
    }
}

fn travel_step() -> StepSpec {
    StepSpec {
        description: Some("Tell us about the trip you are planning.".to_string()),
        ..StepSpec::new(
            "travel",
            "Your trip",
            vec![
                FieldSpec::new(field::DEPARTURE_COUNTRY, FieldKind::Text, "Departure country")
                    .required(),
                FieldSpec::new(field::DEPARTURE_CITY, FieldKind::Text, "Departure city").required(),
                FieldSpec::new(field::TRAVEL_PERIOD, FieldKind::Text, "Preferred travel period")
                    .required()
                    .with_help("A month or season is fine"),
                FieldSpec::new(field::SURGERY_TYPE, FieldKind::Choice, "Surgery type")
                    .required()
                    .with_choices(SurgeryType::ALL.iter().map(|kind| kind.as_str())),
                FieldSpec::new(field::QUOTE_AMOUNT, FieldKind::Number, "Quoted amount")
                    .with_help("Leave blank if you have not received a quote yet"),
            ],
        )
    }
}

fn confirm_step() -> StepSpec {
    StepSpec::new(
        "confirm",
        "Confirm",
        vec![
            FieldSpec::new(field::NOTES, FieldKind::Text, "Anything else we should know?"),
            FieldSpec::new(
                field::TERMS_ACCEPTED,
                FieldKind::Acknowledgement,
                "The terms and privacy policy",
            )
            .required(),
        ],
    )
}

/// Normalises validated answers into the record handed to collaborators.
///
/// Text is trimmed, the country sentinel is resolved to the free-text
/// country, and the status flags start at their defaults.
pub fn assemble_record(
    fields: &Fields,
    reference_code: String,
    created_at: OffsetDateTime,
) -> Result<FinalizedRecord, RecordError> {
    let country = match required(fields, field::COUNTRY)? {
        OTHER_COUNTRY_SENTINEL => required(fields, field::OTHER_COUNTRY)?,
        selected => selected,
    };
    let surgery_type = required(fields, field::SURGERY_TYPE)?
        .parse::<SurgeryType>()
        .map_err(|reason| RecordError::Invalid {
            field: field::SURGERY_TYPE,
            reason,
        })?;
    let quote_amount = match optional(fields, field::QUOTE_AMOUNT) {
        Some(raw) => validate_number(raw).map_err(|rejection| RecordError::Invalid {
            field: field::QUOTE_AMOUNT,
            reason: rejection.code().to_string(),
        })?,
        None => None,
    };

    Ok(FinalizedRecord {
        reference_code,
        first_name: required(fields, field::FIRST_NAME)?.to_string(),
        last_name: required(fields, field::LAST_NAME)?.to_string(),
        email: required(fields, field::EMAIL)?.to_string(),
        phone: required(fields, field::PHONE)?.to_string(),
        country: country.to_string(),
        departure_country: required(fields, field::DEPARTURE_COUNTRY)?.to_string(),
        departure_city: required(fields, field::DEPARTURE_CITY)?.to_string(),
        travel_period: required(fields, field::TRAVEL_PERIOD)?.to_string(),
        surgery_type,
        quote_amount,
        notes: optional(fields, field::NOTES).map(str::to_string),
        payment_status: PaymentStatus::default(),
        questionnaire_complete: false,
        logistics_status: LogisticsStatus::default(),
        created_at,
    })
}

fn required<'a>(fields: &'a Fields, name: &'static str) -> Result<&'a str, RecordError> {
    optional(fields, name).ok_or(RecordError::Missing(name))
}

fn optional<'a>(fields: &'a Fields, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(|value| value.trimmed())
}
