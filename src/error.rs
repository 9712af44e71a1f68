//! Error types
//!
//! Reassembly itself never fails: malformed notifications and sequence breaks
//! are absorbed by the reassemblers. Errors only surface from the transport,
//! webhook delivery and the settings store.

use crate::protocol::Characteristic;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Errors reported by a [`Transport`](crate::session::Transport) implementation
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("device is not connected")]
    NotConnected,

    #[error("characteristic not available: {0}")]
    CharacteristicNotFound(Characteristic),

    #[error("write to {characteristic} failed: {reason}")]
    WriteFailed {
        characteristic: Characteristic,
        reason: String,
    },

    #[error("read from {characteristic} failed: {reason}")]
    ReadFailed {
        characteristic: Characteristic,
        reason: String,
    },
}

/// Webhook delivery failures
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook url is empty")]
    EmptyUrl,

    #[error("webhook returned HTTP {0}")]
    Status(u16),

    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Settings store failures
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Webhook(WebhookError::Http(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: Error = TransportError::CharacteristicNotFound(Characteristic::PhotoData).into();
        assert_eq!(
            err.to_string(),
            "transport error: characteristic not available: photo data"
        );

        let err: Error = WebhookError::Status(503).into();
        assert_eq!(err.to_string(), "webhook error: webhook returned HTTP 503");
    }
}
