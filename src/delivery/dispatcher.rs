//! Artifact fan-out
//!
//! The dispatcher is the stock [`DeviceHandler`]. For each completed photo it:
//!
//! 1. publishes it as the latest photo for local display
//! 2. POSTs it to the photo webhook, if enabled (spawned, best-effort)
//! 3. queues it for the analysis agent and invalidates the analysis sync
//!
//! Audio clips only go to the audio webhook. Webhook settings are loaded
//! from the store once per artifact.
//!
//! Bursts of photos collapse into few agent calls: while the agent is busy,
//! new photos pile up in the queue and the next run takes them all at once.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::watch;

use super::settings::{SettingsStore, WebhookSettings};
use super::webhook::WebhookSender;
use crate::media::{AudioClip, PhotoFrame};
use crate::session::{DeviceContext, DeviceHandler};
use crate::stats::SessionStats;
use crate::sync::InvalidateSync;

/// Downstream photo analysis (vision model, assistant, ...)
pub trait AnalysisAgent: Send + Sync + 'static {
    /// Process a batch of photos not seen before, oldest first
    fn add_photos(&self, photos: Vec<Bytes>) -> impl Future<Output = ()> + Send;
}

type PhotoQueue = Arc<Mutex<Vec<Bytes>>>;

/// Default handler wiring display, analysis and webhooks
pub struct Dispatcher<A: AnalysisAgent> {
    agent: Arc<A>,
    settings: Arc<dyn SettingsStore>,
    webhooks: WebhookSender,
    latest: watch::Sender<Option<PhotoFrame>>,
    queue: PhotoQueue,
    analysis: InvalidateSync,
    photos: AtomicU64,
    audio_clips: AtomicU64,
}

impl<A: AnalysisAgent> Dispatcher<A> {
    /// Create a dispatcher
    pub fn new(agent: A, settings: Arc<dyn SettingsStore>, webhooks: WebhookSender) -> Self {
        let agent = Arc::new(agent);
        let queue: PhotoQueue = Arc::new(Mutex::new(Vec::new()));
        let (latest, _) = watch::channel(None);

        let analysis = {
            let agent = Arc::clone(&agent);
            let queue = Arc::clone(&queue);
            InvalidateSync::new(move || {
                let agent = Arc::clone(&agent);
                let queue = Arc::clone(&queue);
                async move {
                    let batch =
                        std::mem::take(&mut *queue.lock().unwrap_or_else(|e| e.into_inner()));
                    if batch.is_empty() {
                        return;
                    }
                    tracing::debug!(photos = batch.len(), "Running photo analysis");
                    agent.add_photos(batch).await;
                }
            })
        };

        Self {
            agent,
            settings,
            webhooks,
            latest,
            queue,
            analysis,
            photos: AtomicU64::new(0),
            audio_clips: AtomicU64::new(0),
        }
    }

    /// Watch the most recent photo
    pub fn latest_photo(&self) -> watch::Receiver<Option<PhotoFrame>> {
        self.latest.subscribe()
    }

    /// The analysis scheduler
    pub fn analysis(&self) -> &InvalidateSync {
        &self.analysis
    }

    /// The analysis agent
    pub fn agent(&self) -> &Arc<A> {
        &self.agent
    }

    /// Photos waiting for the next analysis run
    pub fn pending_photos(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Photos received so far
    pub fn photo_count(&self) -> u64 {
        self.photos.load(Ordering::Relaxed)
    }

    /// Audio clips received so far
    pub fn audio_clip_count(&self) -> u64 {
        self.audio_clips.load(Ordering::Relaxed)
    }

    fn webhook_settings(&self) -> WebhookSettings {
        WebhookSettings::load(self.settings.as_ref())
    }
}

impl<A: AnalysisAgent> DeviceHandler for Dispatcher<A> {
    async fn on_connected(&self, ctx: &DeviceContext) {
        let settings = self.webhook_settings();
        tracing::info!(
            device_id = %ctx.device_id,
            photo_webhook = settings.photo_target().is_some(),
            audio_webhook = settings.audio_target().is_some(),
            "Dispatcher attached"
        );
    }

    async fn on_photo(&self, ctx: &DeviceContext, photo: PhotoFrame) {
        self.photos.fetch_add(1, Ordering::Relaxed);
        self.latest.send_replace(Some(photo.clone()));

        let settings = self.webhook_settings();
        if let Some(url) = settings.photo_target() {
            let sender = self.webhooks.clone();
            let url = url.to_string();
            let device_id = Arc::clone(&ctx.device_id);
            let photo = photo.clone();
            tokio::spawn(async move {
                // Failures are logged by the sender
                let _ = sender.send_photo(&url, &device_id, &photo).await;
            });
        }

        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(photo.data);
        self.analysis.invalidate();
    }

    async fn on_audio(&self, ctx: &DeviceContext, clip: AudioClip) {
        self.audio_clips.fetch_add(1, Ordering::Relaxed);

        let settings = self.webhook_settings();
        if let Some(url) = settings.audio_target() {
            let sender = self.webhooks.clone();
            let url = url.to_string();
            let device_id = Arc::clone(&ctx.device_id);
            tokio::spawn(async move {
                let _ = sender.send_audio(&url, &device_id, &clip).await;
            });
        }
    }

    async fn on_disconnected(&self, ctx: &DeviceContext, stats: &SessionStats) {
        tracing::info!(
            device_id = %ctx.device_id,
            photos = stats.photo.frames_completed,
            audio_clips = stats.audio.frames_completed,
            pending_analysis = self.pending_photos(),
            "Dispatcher detached"
        );
    }
}
