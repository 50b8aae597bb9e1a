use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;

use crate::{errors::MailError, settings::AppConfig};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

/// Outbound email transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Posts messages as JSON to a transactional mail HTTP API.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: Option<String>, timeout_secs: u64) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(HttpMailer { client, endpoint, api_key, timeout_secs })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(mail);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MailError::Timeout(self.timeout_secs)
            } else {
                MailError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }

        tracing::debug!(subject = %mail.subject, "Mail accepted by API");
        Ok(())
    }
}

/// Writes mail to the log instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            from = %mail.from,
            to = ?mail.to,
            subject = %mail.subject,
            "Mail API not configured; logging message instead:\n{}",
            mail.text
        );
        Ok(())
    }
}

pub fn mailer_from_config(config: &AppConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match &config.mail_api_url {
        Some(url) => Ok(Arc::new(HttpMailer::new(
            url.clone(),
            config.mail_api_key.clone(),
            config.mail_timeout_secs,
        )?)),
        None => {
            tracing::warn!("APP_MAIL_API_URL is not set; outgoing mail will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
