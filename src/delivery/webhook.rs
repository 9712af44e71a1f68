//! Webhook delivery
//!
//! Completed photos and audio clips can be POSTed as JSON to user supplied
//! endpoints. Delivery is best-effort: a failed POST is logged and the
//! artifact is dropped. There is no retry and no queue.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::Serialize;

use crate::error::{Result, WebhookError};
use crate::media::{AudioClip, PhotoFrame};
use crate::protocol::constants::AUDIO_SAMPLE_RATE;

/// Webhook client configuration
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Request timeout
    pub timeout: Duration,

    /// User-Agent header
    pub user_agent: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("glass-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl WebhookConfig {
    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Photo webhook body
#[derive(Debug, Clone, Serialize)]
pub struct PhotoPayload {
    /// Always `glass_photo`
    #[serde(rename = "type")]
    pub kind: String,
    pub device_id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub format: String,
    /// Clockwise rotation in degrees
    pub rotation: u16,
    /// Base64 image bytes
    pub data: String,
}

impl PhotoPayload {
    pub const KIND: &'static str = "glass_photo";

    pub fn new(device_id: &str, photo: &PhotoFrame) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            device_id: device_id.to_string(),
            timestamp: photo.timestamp,
            format: "jpeg".to_string(),
            rotation: photo.rotation.degrees(),
            data: BASE64.encode(&photo.data),
        }
    }
}

/// Audio webhook body
#[derive(Debug, Clone, Serialize)]
pub struct AudioPayload {
    /// Always `glass_audio_bytes`
    #[serde(rename = "type")]
    pub kind: String,
    pub device_id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub codec: u8,
    pub sample_rate: u32,
    /// Base64 audio bytes
    pub data: String,
}

impl AudioPayload {
    pub const KIND: &'static str = "glass_audio_bytes";

    pub fn new(device_id: &str, clip: &AudioClip) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            device_id: device_id.to_string(),
            timestamp: clip.timestamp,
            codec: clip.codec.id(),
            sample_rate: AUDIO_SAMPLE_RATE,
            data: BASE64.encode(&clip.data),
        }
    }
}

/// HTTP client for webhook POSTs
#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: Client,
    config: WebhookConfig,
}

impl WebhookSender {
    /// Create a sender with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(WebhookConfig::default())
    }

    /// Create a sender with custom configuration
    pub fn with_config(config: WebhookConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// POST a photo
    pub async fn send_photo(&self, url: &str, device_id: &str, photo: &PhotoFrame) -> Result<()> {
        let payload = PhotoPayload::new(device_id, photo);
        self.post(url, &payload, PhotoPayload::KIND, photo.size()).await
    }

    /// POST an audio clip
    pub async fn send_audio(&self, url: &str, device_id: &str, clip: &AudioClip) -> Result<()> {
        let payload = AudioPayload::new(device_id, clip);
        self.post(url, &payload, AudioPayload::KIND, clip.size()).await
    }

    async fn post<T: Serialize>(
        &self,
        url: &str,
        payload: &T,
        kind: &str,
        size: usize,
    ) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(WebhookError::EmptyUrl.into());
        }

        let result = self.client.post(url).json(payload).send().await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, kind = kind, error = %e, "Webhook request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                url = %url,
                kind = kind,
                status = status.as_u16(),
                "Webhook rejected delivery"
            );
            return Err(WebhookError::Status(status.as_u16()).into());
        }

        tracing::debug!(url = %url, kind = kind, bytes = size, "Webhook delivered");
        Ok(())
    }
}
