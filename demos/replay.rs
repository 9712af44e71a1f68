//! Replay a captured notification dump through a glass session
//!
//! Run with: cargo run --example replay <DUMP> [FIRMWARE]
//!
//! The dump is a text file with one notification per line, in arrival order:
//!
//! ```text
//! # comments and blank lines are ignored
//! p AAAB/9j/4AAQ...     photo data notification, base64
//! a AAABAgME...         audio data notification, base64
//! ```
//!
//! FIRMWARE defaults to 2.1.1. Set GLASS_SETTINGS to a JSON settings file to
//! enable webhook delivery, and RUST_LOG to adjust logging.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use tokio::sync::mpsc;

use glass_rs::delivery::{AnalysisAgent, FileStore, MemoryStore, SettingsStore, WebhookSender};
use glass_rs::error::{Result, TransportError};
use glass_rs::protocol::Characteristic;
use glass_rs::{Dispatcher, DeviceSession, SessionConfig, Transport};

enum Notification {
    Photo(Bytes),
    Audio(Bytes),
}

fn load_dump(path: &Path) -> std::result::Result<Vec<Notification>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let mut notifications = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (kind, data) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| format!("line {}: expected '<p|a> <base64>'", i + 1))?;
        let payload = Bytes::from(BASE64.decode(data.trim())?);
        match kind {
            "p" => notifications.push(Notification::Photo(payload)),
            "a" => notifications.push(Notification::Audio(payload)),
            other => return Err(format!("line {}: unknown stream '{}'", i + 1, other).into()),
        }
    }

    Ok(notifications)
}

/// Transport that plays back a dump once capture starts
struct ReplayTransport {
    firmware: String,
    pending: Mutex<Option<Vec<Notification>>>,
    senders: Mutex<Option<(mpsc::Sender<Bytes>, mpsc::Sender<Bytes>)>>,
    photo_rx: Mutex<Option<mpsc::Receiver<Bytes>>>,
    audio_rx: Mutex<Option<mpsc::Receiver<Bytes>>>,
}

impl ReplayTransport {
    fn new(firmware: String, notifications: Vec<Notification>) -> Self {
        let (photo_tx, photo_rx) = mpsc::channel(256);
        let (audio_tx, audio_rx) = mpsc::channel(256);
        Self {
            firmware,
            pending: Mutex::new(Some(notifications)),
            senders: Mutex::new(Some((photo_tx, audio_tx))),
            photo_rx: Mutex::new(Some(photo_rx)),
            audio_rx: Mutex::new(Some(audio_rx)),
        }
    }

    fn start_feed(&self) {
        let notifications = self.pending.lock().unwrap_or_else(|e| e.into_inner()).take();
        let senders = self.senders.lock().unwrap_or_else(|e| e.into_inner()).take();
        let (Some(notifications), Some((photo_tx, audio_tx))) = (notifications, senders) else {
            return;
        };

        tokio::spawn(async move {
            for notification in notifications {
                let sent = match notification {
                    Notification::Photo(data) => photo_tx.send(data).await,
                    Notification::Audio(data) => audio_tx.send(data).await,
                };
                if sent.is_err() {
                    return;
                }
            }

            // Let the session drain both queues before signalling disconnect
            while photo_tx.capacity() < photo_tx.max_capacity()
                || audio_tx.capacity() < audio_tx.max_capacity()
            {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });
    }
}

impl Transport for ReplayTransport {
    fn device_id(&self) -> &str {
        "replay"
    }

    async fn read_firmware_revision(&self) -> Result<String> {
        Ok(self.firmware.clone())
    }

    async fn subscribe(&self, characteristic: Characteristic) -> Result<mpsc::Receiver<Bytes>> {
        let rx = match characteristic {
            Characteristic::PhotoData => {
                self.photo_rx.lock().unwrap_or_else(|e| e.into_inner()).take()
            }
            Characteristic::AudioData => {
                self.audio_rx.lock().unwrap_or_else(|e| e.into_inner()).take()
            }
            _ => None,
        };
        rx.ok_or_else(|| TransportError::CharacteristicNotFound(characteristic).into())
    }

    async fn write(&self, characteristic: Characteristic, value: &[u8]) -> Result<()> {
        println!("write {} {:02x?}", characteristic, value);
        if characteristic == Characteristic::PhotoControl {
            self.start_feed();
        }
        Ok(())
    }
}

/// Agent that just reports batch sizes
#[derive(Default)]
struct PrintAgent {
    photos: AtomicU64,
}

impl AnalysisAgent for PrintAgent {
    fn add_photos(&self, photos: Vec<Bytes>) -> impl std::future::Future<Output = ()> + Send {
        let count = photos.len() as u64;
        let total = self.photos.fetch_add(count, Ordering::Relaxed) + count;
        async move {
            let bytes: usize = photos.iter().map(Bytes::len).sum();
            println!(
                "analysis batch: {} photos, {} bytes ({} total)",
                photos.len(),
                bytes,
                total
            );
        }
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("glass_rs=debug".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let dump = args.next().ok_or("usage: replay <DUMP> [FIRMWARE]")?;
    let firmware = args.next().unwrap_or_else(|| "2.1.1".to_string());

    let notifications = load_dump(Path::new(&dump))?;
    println!("Loaded {} notifications from {}", notifications.len(), dump);

    let settings: Arc<dyn SettingsStore> = match std::env::var("GLASS_SETTINGS") {
        Ok(path) => Arc::new(FileStore::new(path)),
        Err(_) => Arc::new(MemoryStore::new()),
    };

    let dispatcher = Dispatcher::new(PrintAgent::default(), settings, WebhookSender::new()?);
    let mut latest = dispatcher.latest_photo();
    tokio::spawn(async move {
        while latest.changed().await.is_ok() {
            if let Some(photo) = latest.borrow_and_update().as_ref() {
                println!("photo: {} bytes, rotate {}°", photo.size(), photo.rotation);
            }
        }
    });

    let config = SessionConfig::default().settle_delay(Duration::ZERO);
    let transport = ReplayTransport::new(firmware, notifications);
    let session = DeviceSession::new(config, transport, dispatcher);

    let stats = session
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    session.handler().analysis().wait_idle().await;

    println!(
        "Done: photos={} dropped={} audio_clips={} malformed={} duration={:?}",
        stats.photo.frames_completed,
        stats.photo.frames_dropped,
        stats.audio.frames_completed,
        stats.photo.malformed + stats.audio.malformed,
        stats.duration,
    );
    Ok(())
}
