//! Glass device sessions
//!
//! A session owns one connected device: it resolves the protocol variant,
//! starts capture, feeds notifications through the reassemblers and hands
//! completed artifacts to a [`DeviceHandler`].

pub mod config;
pub mod context;
pub mod device;
pub mod handler;

pub use config::SessionConfig;
pub use context::DeviceContext;
pub use device::{DeviceSession, SessionEnd};
pub use handler::{DeviceHandler, Transport};
