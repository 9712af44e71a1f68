//! Completed media artifacts
//!
//! Reassemblers move these out on frame completion and keep no reference.
//! `Bytes` keeps them cheap to clone when a frame fans out to several
//! consumers (display, agent, webhook).

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use super::audio::AudioCodec;
use crate::protocol::Rotation;

/// A complete still image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFrame {
    /// Encoded image (JPEG from current firmware)
    pub data: Bytes,
    /// Rotation needed to display the image upright
    pub rotation: Rotation,
    /// Wall-clock completion time in milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl PhotoFrame {
    pub fn new(data: Bytes, rotation: Rotation, timestamp: u64) -> Self {
        Self {
            data,
            rotation,
            timestamp,
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A complete audio clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// PCM samples or codec packets, as sent by the device
    pub data: Bytes,
    /// Codec announced by the first chunk of the clip
    pub codec: AudioCodec,
    /// Wall-clock completion time in milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl AudioClip {
    pub fn new(data: Bytes, codec: AudioCodec, timestamp: u64) -> Self {
        Self {
            data,
            codec,
            timestamp,
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
