use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BOOKINGS_TABLE: &str = "bookings";
pub const DEFAULT_RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
pub const DEFAULT_CONFIRMATION_SUBJECT: &str = "We have received your enquiry";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field} url `{value}`: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[cfg(feature = "http")]
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the hosted Postgres REST endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            table: default_table(),
        }
    }

    /// `{url}/rest/v1/{table}`
    pub fn insert_url(&self) -> Result<Url, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Empty("supabase.api_key"));
        }
        if self.table.trim().is_empty() {
            return Err(ConfigError::Empty("supabase.table"));
        }
        let base = parse_url("supabase.url", &self.url)?;
        let raw = format!(
            "{}/rest/v1/{}",
            base.as_str().trim_end_matches('/'),
            self.table.trim()
        );
        parse_url("supabase.url", &raw)
    }
}

/// Settings for the transactional email API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
    #[serde(default = "default_resend_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl ResendConfig {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            from: from.into(),
            endpoint: default_resend_endpoint(),
            subject: default_subject(),
        }
    }

    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Empty("resend.api_key"));
        }
        if self.from.trim().is_empty() {
            return Err(ConfigError::Empty("resend.from"));
        }
        parse_url("resend.endpoint", &self.endpoint)
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })
}

fn default_table() -> String {
    DEFAULT_BOOKINGS_TABLE.to_string()
}

fn default_resend_endpoint() -> String {
    DEFAULT_RESEND_ENDPOINT.to_string()
}

fn default_subject() -> String {
    DEFAULT_CONFIRMATION_SUBJECT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_url_joins_rest_path() {
        let config = SupabaseConfig::new("https://abc.supabase.co/", "anon");
        assert_eq!(
            config.insert_url().unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/bookings"
        );
    }

    #[test]
    fn rejects_bad_url_and_empty_keys() {
        let config = SupabaseConfig::new("not a url", "anon");
        assert!(matches!(
            config.insert_url(),
            Err(ConfigError::InvalidUrl { field: "supabase.url", .. })
        ));
        let config = SupabaseConfig::new("https://abc.supabase.co", " ");
        assert!(matches!(
            config.insert_url(),
            Err(ConfigError::Empty("supabase.api_key"))
        ));
        let config = ResendConfig::new("re_key", "");
        assert!(matches!(
            config.endpoint_url(),
            Err(ConfigError::Empty("resend.from"))
        ));
    }

    #[test]
    fn resend_defaults_apply_when_deserialized() {
        let config: ResendConfig =
            serde_json::from_str(r#"{"api_key":"re_1","from":"hello@example.com"}"#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_RESEND_ENDPOINT);
        assert_eq!(config.subject, DEFAULT_CONFIRMATION_SUBJECT);
    }
}
