//! Delivery of completed artifacts
//!
//! This module provides:
//! - The [`Dispatcher`] handler (display, analysis agent, webhooks)
//! - Best-effort JSON webhook delivery
//! - Persisted webhook settings

pub mod dispatcher;
pub mod settings;
pub mod webhook;

pub use dispatcher::{AnalysisAgent, Dispatcher};
pub use settings::{FileStore, MemoryStore, SettingsStore, WebhookSettings};
pub use webhook::{AudioPayload, PhotoPayload, WebhookConfig, WebhookSender};
