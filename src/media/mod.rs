//! Media reassembly
//!
//! This module provides:
//! - Photo frame reassembly with orientation metadata
//! - Audio clip reassembly with codec metadata
//! - Completed artifact types

pub mod audio;
pub mod frame;
pub mod photo;

pub use audio::{AudioCodec, AudioReassembler};
pub use frame::{AudioClip, PhotoFrame};
pub use photo::PhotoReassembler;
