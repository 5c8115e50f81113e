use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// Resolves a member's photo reference into decoded pixels.
#[async_trait]
pub trait PhotoLoader: Send + Sync {
    async fn load(&self, reference: &str) -> RenderResult<DynamicImage>;
}

/// Loads `http(s)://` URLs with reqwest and inline `data:` URLs directly.
#[derive(Clone)]
pub struct HttpPhotoLoader {
    client: reqwest::Client,
}

impl HttpPhotoLoader {
    pub fn new(timeout: Duration) -> RenderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RenderError::Fetch(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PhotoLoader for HttpPhotoLoader {
    async fn load(&self, reference: &str) -> RenderResult<DynamicImage> {
        let bytes = if reference.starts_with("data:") {
            decode_data_url(reference)?
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            debug!(url = %reference, "Downloading photo");
            let response = self
                .client
                .get(reference)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| photo_error(reference, e))?;
            response
                .bytes()
                .await
                .map_err(|e| photo_error(reference, e))?
                .to_vec()
        } else {
            return Err(photo_error(reference, "unsupported photo reference"));
        };

        image::load_from_memory(&bytes).map_err(|e| photo_error(reference, e))
    }
}

/// Decodes the payload of a base64 `data:` URL. Non-base64 payloads are
/// rejected since photos are always binary.
pub fn decode_data_url(url: &str) -> RenderResult<Vec<u8>> {
    let (header, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| photo_error(url, "malformed data URL"))?;
    if !header.ends_with(";base64") {
        return Err(photo_error(url, "data URL is not base64 encoded"));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| photo_error(url, e))
}

fn photo_error(reference: &str, reason: impl ToString) -> RenderError {
    // Data URLs can be megabytes long.
    let reference = if reference.len() > 64 {
        format!("{}...", reference.chars().take(64).collect::<String>())
    } else {
        reference.to_string()
    };
    RenderError::Photo { reference, reason: reason.to_string() }
}
