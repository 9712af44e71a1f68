//! Session configuration

use std::time::Duration;

use crate::protocol::constants::{DEFAULT_CAPTURE_INTERVAL_SECS, ORIENTATION_FIRMWARE};

/// Per-connection options
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wait after connecting before touching GATT (lets the link stabilize)
    pub settle_delay: Duration,

    /// Photo capture interval written to the photo control characteristic
    pub capture_interval_secs: u8,

    /// Subscribe to audio and start audio capture
    pub audio_enabled: bool,

    /// Firmware revision assumed when the device does not report one
    pub fallback_firmware: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            capture_interval_secs: DEFAULT_CAPTURE_INTERVAL_SECS,
            audio_enabled: true,
            fallback_firmware: ORIENTATION_FIRMWARE.to_string(),
        }
    }
}

impl SessionConfig {
    /// Set the settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the photo capture interval (clamped to at least one second)
    pub fn capture_interval(mut self, secs: u8) -> Self {
        self.capture_interval_secs = secs.max(1);
        self
    }

    /// Disable the audio stream
    pub fn disable_audio(mut self) -> Self {
        self.audio_enabled = false;
        self
    }

    /// Set the firmware revision assumed when the read fails
    pub fn fallback_firmware(mut self, revision: impl Into<String>) -> Self {
        self.fallback_firmware = revision.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();

        assert_eq!(config.settle_delay, Duration::from_secs(1));
        assert_eq!(config.capture_interval_secs, 5);
        assert!(config.audio_enabled);
        assert_eq!(config.fallback_firmware, "2.1.1");
    }

    #[test]
    fn test_builder_capture_interval_clamped() {
        let config = SessionConfig::default().capture_interval(0);
        assert_eq!(config.capture_interval_secs, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = SessionConfig::default()
            .settle_delay(Duration::ZERO)
            .capture_interval(10)
            .disable_audio()
            .fallback_firmware("1.0.0");

        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.capture_interval_secs, 10);
        assert!(!config.audio_enabled);
        assert_eq!(config.fallback_firmware, "1.0.0");
    }
}
