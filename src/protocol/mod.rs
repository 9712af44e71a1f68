//! Glass wire protocol
//!
//! This module provides:
//! - Notification chunk decoding
//! - GATT characteristic identifiers
//! - Firmware-gated protocol variants and photo rotation

pub mod characteristic;
pub mod chunk;
pub mod constants;
pub mod variant;

pub use characteristic::Characteristic;
pub use chunk::Chunk;
pub use variant::{FirmwareVersion, ProtocolVariant, Rotation};
