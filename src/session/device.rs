//! Device session
//!
//! Drives one glass connection from setup to teardown:
//!
//! ```text
//!  settle ─► read firmware ─► subscribe photo ─► start photo capture
//!                                 │
//!                                 ├─► subscribe audio ─► start audio capture
//!                                 ▼
//!           ┌──────────── select! loop ────────────┐
//!           │ photo rx ─► PhotoReassembler ─► on_photo
//!           │ audio rx ─► AudioReassembler ─► on_audio
//!           │ shutdown / channel closed ─► break    │
//!           └───────────────────────────────────────┘
//!                                 ▼
//!     drop receivers ─► abandon partial frames ─► stop audio ─► on_disconnected
//! ```
//!
//! Both reassemblers live on the loop's stack, so they are only ever touched
//! by one consumer and need no locking.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use super::config::SessionConfig;
use super::context::DeviceContext;
use super::handler::{DeviceHandler, Transport};
use crate::error::Result;
use crate::media::{AudioReassembler, PhotoReassembler};
use crate::protocol::constants::{AUDIO_START, AUDIO_STOP};
use crate::protocol::Characteristic;
use crate::stats::SessionStats;

/// Why the session loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Shutdown future resolved
    Shutdown,
    /// A notification channel closed
    Disconnected,
}

/// One glass connection
pub struct DeviceSession<T: Transport, H: DeviceHandler> {
    config: SessionConfig,
    transport: T,
    handler: Arc<H>,
}

impl<T: Transport, H: DeviceHandler> DeviceSession<T, H> {
    /// Create a session over a connected transport
    pub fn new(config: SessionConfig, transport: T, handler: H) -> Self {
        Self::with_shared_handler(config, transport, Arc::new(handler))
    }

    /// Create a session with a handler shared with other owners
    pub fn with_shared_handler(config: SessionConfig, transport: T, handler: Arc<H>) -> Self {
        Self {
            config,
            transport,
            handler,
        }
    }

    /// Get the handler
    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run until the device disconnects
    pub async fn run(&self) -> Result<SessionStats> {
        self.run_until(std::future::pending()).await
    }

    /// Run until the device disconnects or `shutdown` resolves
    ///
    /// Setup failures (subscribing, starting capture) are returned as errors.
    /// Once streaming, nothing inside the loop is fatal.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<SessionStats>
    where
        F: Future<Output = ()>,
    {
        let mut stats = SessionStats::new();

        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let ctx = self.resolve_context().await;

        let mut photo_rx = self.transport.subscribe(Characteristic::PhotoData).await?;
        self.transport
            .write(
                Characteristic::PhotoControl,
                &[self.config.capture_interval_secs],
            )
            .await?;

        let mut audio_rx = if self.config.audio_enabled {
            let rx = self.transport.subscribe(Characteristic::AudioData).await?;
            self.transport
                .write(Characteristic::AudioControl, &[AUDIO_START])
                .await?;
            Some(rx)
        } else {
            None
        };

        tracing::info!(
            device_id = %ctx.device_id,
            firmware = %ctx.firmware_revision,
            variant = ?ctx.variant,
            audio = self.config.audio_enabled,
            "Glass session started"
        );
        self.handler.on_connected(&ctx).await;

        let mut photo = PhotoReassembler::new(ctx.variant);
        let mut audio = AudioReassembler::new();

        tokio::pin!(shutdown);

        let end = loop {
            tokio::select! {
                _ = &mut shutdown => break SessionEnd::Shutdown,
                raw = photo_rx.recv() => match raw {
                    Some(raw) => {
                        if let Some(frame) = photo.push_notification(raw) {
                            self.handler.on_photo(&ctx, frame).await;
                        }
                    }
                    None => break SessionEnd::Disconnected,
                },
                raw = recv_optional(&mut audio_rx) => match raw {
                    Some(raw) => {
                        if let Some(clip) = audio.push_notification(raw) {
                            self.handler.on_audio(&ctx, clip).await;
                        }
                    }
                    None => break SessionEnd::Disconnected,
                },
            }
        };

        // Stop delivery before discarding reassembly state
        drop(photo_rx);
        drop(audio_rx);
        photo.reset();
        audio.reset();

        if self.config.audio_enabled && end == SessionEnd::Shutdown {
            if let Err(e) = self
                .transport
                .write(Characteristic::AudioControl, &[AUDIO_STOP])
                .await
            {
                tracing::debug!(
                    device_id = %ctx.device_id,
                    error = %e,
                    "Audio stop skipped"
                );
            }
        }

        stats.photo = photo.stats().clone();
        stats.audio = audio.stats().clone();
        stats.finish();

        tracing::info!(
            device_id = %ctx.device_id,
            reason = ?end,
            photos = stats.photo.frames_completed,
            photos_dropped = stats.photo.frames_dropped,
            audio_clips = stats.audio.frames_completed,
            duration_secs = stats.duration.as_secs(),
            "Glass session ended"
        );
        self.handler.on_disconnected(&ctx, &stats).await;

        Ok(stats)
    }

    async fn resolve_context(&self) -> DeviceContext {
        let revision = match self.transport.read_firmware_revision().await {
            Ok(revision) => revision,
            Err(e) => {
                tracing::warn!(
                    device_id = %self.transport.device_id(),
                    error = %e,
                    fallback = %self.config.fallback_firmware,
                    "Could not read firmware revision"
                );
                self.config.fallback_firmware.clone()
            }
        };

        DeviceContext::new(self.transport.device_id(), revision)
    }
}

async fn recv_optional(rx: &mut Option<mpsc::Receiver<Bytes>>) -> Option<Bytes> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
