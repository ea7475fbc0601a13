//! Confirmation email sent through the Resend HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::{ConfigError, ResendConfig};
use crate::notify::{ConfirmationEmail, NotificationError, Notifier};
use crate::record::FinalizedRecord;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

pub struct ResendNotifier {
    client: Client,
    endpoint: Url,
    api_key: String,
    from: String,
    subject: String,
}

impl ResendNotifier {
    pub fn new(config: &ResendConfig) -> Result<Self, ConfigError> {
        Self::with_client(config, Client::builder().build()?)
    }

    pub fn with_client(config: &ResendConfig, client: Client) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            endpoint: config.endpoint_url()?,
            api_key: config.api_key.trim().to_string(),
            from: config.from.trim().to_string(),
            subject: config.subject.clone(),
        })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn notify(&self, record: &FinalizedRecord) -> Result<(), NotificationError> {
        let email = ConfirmationEmail::for_record(record, &self.subject);
        let body = SendEmailRequest {
            from: &self.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };
        debug!(reference = %record.reference_code, "sending confirmation email");
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn notifier_id(&self) -> &str {
        "resend"
    }
}
