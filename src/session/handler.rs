//! Device handler and transport traits

use bytes::Bytes;
use tokio::sync::mpsc;

use super::context::DeviceContext;
use crate::error::Result;
use crate::media::{AudioClip, PhotoFrame};
use crate::protocol::Characteristic;
use crate::stats::SessionStats;

/// Wireless link to one glass device
///
/// Discovery, pairing and connection retry happen before a transport is
/// handed to a session.
pub trait Transport: Send + Sync {
    /// Stable device identifier
    fn device_id(&self) -> &str;

    /// Read the firmware revision string
    async fn read_firmware_revision(&self) -> Result<String>;

    /// Start notifications on a characteristic
    ///
    /// Payloads arrive in delivery order. The channel closing means the
    /// device disconnected.
    async fn subscribe(&self, characteristic: Characteristic) -> Result<mpsc::Receiver<Bytes>>;

    /// Write a value to a characteristic
    async fn write(&self, characteristic: Characteristic, value: &[u8]) -> Result<()>;
}

/// Receives completed artifacts from a [`DeviceSession`](super::DeviceSession)
///
/// Callbacks run on the session loop, one at a time. Long work should be
/// spawned rather than awaited, or chunk processing stalls.
pub trait DeviceHandler: Send + Sync + 'static {
    /// Called once subscriptions are active and capture has started
    async fn on_connected(&self, _ctx: &DeviceContext) {}

    /// Called for every completed photo
    async fn on_photo(&self, _ctx: &DeviceContext, _photo: PhotoFrame) {}

    /// Called for every completed, non-empty audio clip
    async fn on_audio(&self, _ctx: &DeviceContext, _clip: AudioClip) {}

    /// Called after the session stops
    async fn on_disconnected(&self, _ctx: &DeviceContext, _stats: &SessionStats) {}
}
