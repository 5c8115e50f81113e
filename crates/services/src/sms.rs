use std::sync::Arc;

use async_trait::async_trait;
use groupframe_config::SmsSettings;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("SMS request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("SMS gateway rejected message: {status} {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError>;
}

#[derive(Serialize)]
struct SmsRequest<'a> {
    to: &'a str,
    sender: &'a str,
    message: &'a str,
}

/// JSON gateway: `POST {api_url}` with a bearer key.
pub struct HttpSmsProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    sender_id: String,
}

impl HttpSmsProvider {
    pub fn new(api_url: String, api_key: Option<String>, sender_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            sender_id,
        }
    }
}

#[async_trait]
impl SmsProvider for HttpSmsProvider {
    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        let mut request = self.client.post(&self.api_url).json(&SmsRequest {
            to,
            sender: &self.sender_id,
            message,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, to, "SMS gateway rejected message");
            return Err(SmsError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        info!(to, "SMS sent");
        Ok(())
    }
}

/// Development fallback when no gateway is configured.
pub struct LogSmsProvider;

#[async_trait]
impl SmsProvider for LogSmsProvider {
    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        info!(to, message, "SMS gateway not configured, logging message");
        Ok(())
    }
}

pub fn provider_from_settings(settings: &SmsSettings) -> Arc<dyn SmsProvider> {
    match settings.api_url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => Arc::new(HttpSmsProvider::new(
            url.to_string(),
            settings.api_key.clone(),
            settings.sender_id.clone(),
        )),
        None => Arc::new(LogSmsProvider),
    }
}
