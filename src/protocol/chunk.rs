//! Notification chunk decoding
//!
//! Every photo and audio notification shares the same framing:
//!
//! ```text
//! +-----------+-----------+-------------------+
//! | seq (lo)  | seq (hi)  | payload...        |
//! +-----------+-----------+-------------------+
//!
//! End of frame:
//! +-----------+-----------+
//! |   0xFF    |   0xFF    |
//! +-----------+-----------+
//! ```
//!
//! Decoding is best-effort. Anything shorter than the two byte header is
//! reported as `None` and the caller drops it.

use bytes::Bytes;

use super::constants::{CHUNK_HEADER_SIZE, END_MARKER};

/// A decoded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// A numbered slice of the current frame
    Data {
        /// Little-endian sequence number
        sequence: u16,
        /// Bytes following the header
        payload: Bytes,
    },
    /// End-of-frame sentinel
    End,
}

impl Chunk {
    /// Decode a raw notification payload
    ///
    /// Returns `None` for payloads shorter than the sequence header.
    pub fn decode(mut raw: Bytes) -> Option<Self> {
        if raw.len() < CHUNK_HEADER_SIZE {
            return None;
        }

        if raw[..CHUNK_HEADER_SIZE] == END_MARKER {
            return Some(Chunk::End);
        }

        let sequence = u16::from_le_bytes([raw[0], raw[1]]);
        let payload = raw.split_off(CHUNK_HEADER_SIZE);

        Some(Chunk::Data { sequence, payload })
    }

    /// Build a data chunk
    pub fn data(sequence: u16, payload: impl Into<Bytes>) -> Self {
        Chunk::Data {
            sequence,
            payload: payload.into(),
        }
    }

    /// Check if this is the end-of-frame sentinel
    pub fn is_end(&self) -> bool {
        matches!(self, Chunk::End)
    }

    /// Sequence number, if this is a data chunk
    pub fn sequence(&self) -> Option<u16> {
        match self {
            Chunk::Data { sequence, .. } => Some(*sequence),
            Chunk::End => None,
        }
    }
}
