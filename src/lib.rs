//! # glass-rs
//!
//! Photo and audio frame reassembly for notification-based wearable cameras.
//!
//! The glass streams photos and audio as runs of small numbered chunks over
//! two GATT characteristics. This crate turns those notifications back into
//! complete artifacts and fans them out to display, analysis and webhooks.
//!
//! ## Architecture
//!
//! ```text
//!  Transport ──► Chunk::decode ──► PhotoReassembler ──┐
//!      │                                              ├──► DeviceHandler
//!      └──────► Chunk::decode ──► AudioReassembler ──┘        │
//!                                                             ▼
//!                                   Dispatcher: display watch, webhooks,
//!                                   InvalidateSync ──► AnalysisAgent
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use glass_rs::delivery::{AnalysisAgent, Dispatcher, MemoryStore, WebhookSender};
//! use glass_rs::session::{DeviceSession, SessionConfig, Transport};
//!
//! struct Agent;
//!
//! impl AnalysisAgent for Agent {
//!     fn add_photos(&self, photos: Vec<Bytes>) -> impl std::future::Future<Output = ()> + Send {
//!         async move { println!("analyzing {} photos", photos.len()) }
//!     }
//! }
//!
//! # async fn example(transport: impl Transport) -> glass_rs::error::Result<()> {
//! let dispatcher = Dispatcher::new(Agent, Arc::new(MemoryStore::new()), WebhookSender::new()?);
//! let session = DeviceSession::new(SessionConfig::default(), transport, dispatcher);
//! let stats = session.run().await?;
//! println!("{} photos", stats.photo.frames_completed);
//! # Ok(())
//! # }
//! ```

pub mod delivery;
pub mod error;
pub mod media;
pub mod protocol;
pub mod session;
pub mod stats;
pub mod sync;

pub use delivery::Dispatcher;
pub use error::{Error, Result};
pub use media::{AudioClip, AudioCodec, AudioReassembler, PhotoFrame, PhotoReassembler};
pub use protocol::{Chunk, ProtocolVariant, Rotation};
pub use session::{DeviceHandler, DeviceSession, SessionConfig, Transport};
pub use sync::InvalidateSync;
