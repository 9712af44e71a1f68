//! Photo stream reassembly
//!
//! A photo arrives as a run of numbered chunks followed by an end marker:
//!
//! ```text
//!   seq 0: [orientation]? [image bytes...]
//!   seq 1: [image bytes...]
//!   ...
//!   seq n: [image bytes...]
//!   0xFF 0xFF
//! ```
//!
//! The orientation byte is only present on [`ProtocolVariant::Oriented`]
//! firmware. Chunks must arrive strictly in order. Any gap, duplicate or
//! reordering throws the whole frame away and the reassembler waits for the
//! next sequence 0; a broken photo is useless, so there is nothing to gain
//! from keeping part of it.

use bytes::{Bytes, BytesMut};

use super::frame::{now_millis, PhotoFrame};
use crate::protocol::{Chunk, ProtocolVariant};
use crate::stats::StreamStats;

#[derive(Debug)]
enum PhotoState {
    /// Waiting for sequence 0
    Idle,
    /// Collecting a frame
    Accumulating {
        last_sequence: u16,
        orientation: Option<u8>,
        buffer: BytesMut,
    },
}

/// Photo stream state machine
///
/// Owns the single in-flight frame of the photo characteristic. Driven by
/// one consumer, so no locking is needed.
#[derive(Debug)]
pub struct PhotoReassembler {
    variant: ProtocolVariant,
    state: PhotoState,
    stats: StreamStats,
}

impl PhotoReassembler {
    /// Create a reassembler for a connection using `variant`
    pub fn new(variant: ProtocolVariant) -> Self {
        Self {
            variant,
            state: PhotoState::Idle,
            stats: StreamStats::new(),
        }
    }

    /// Protocol variant this reassembler was created with
    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    /// Check if no frame is in progress
    pub fn is_idle(&self) -> bool {
        matches!(self.state, PhotoState::Idle)
    }

    /// Bytes buffered for the in-progress frame
    pub fn buffered_len(&self) -> usize {
        match &self.state {
            PhotoState::Idle => 0,
            PhotoState::Accumulating { buffer, .. } => buffer.len(),
        }
    }

    /// Reassembly counters
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Decode and process a raw notification
    pub fn push_notification(&mut self, raw: Bytes) -> Option<PhotoFrame> {
        self.stats.notifications += 1;

        match Chunk::decode(raw) {
            Some(chunk) => self.push(chunk),
            None => {
                self.stats.malformed += 1;
                tracing::trace!("Dropping malformed photo notification");
                None
            }
        }
    }

    /// Process a decoded chunk
    ///
    /// Returns the completed photo when `chunk` is the end marker of an
    /// intact frame.
    pub fn push(&mut self, chunk: Chunk) -> Option<PhotoFrame> {
        match (std::mem::replace(&mut self.state, PhotoState::Idle), chunk) {
            (PhotoState::Idle, Chunk::End) => None,
            (
                PhotoState::Idle,
                Chunk::Data {
                    sequence: 0,
                    payload,
                },
            ) => {
                self.start(payload);
                None
            }
            (PhotoState::Idle, Chunk::Data { sequence, .. }) => {
                self.stats.chunks_dropped += 1;
                tracing::trace!(sequence = sequence, "Ignoring photo chunk while idle");
                None
            }
            (
                PhotoState::Accumulating {
                    orientation,
                    buffer,
                    ..
                },
                Chunk::End,
            ) => {
                Some(self.finish(orientation, buffer))
            }
            (
                PhotoState::Accumulating {
                    last_sequence,
                    orientation,
                    mut buffer,
                },
                Chunk::Data { sequence, payload },
            ) => {
                if last_sequence.checked_add(1) == Some(sequence) {
                    buffer.extend_from_slice(&payload);
                    self.stats.bytes_buffered += payload.len() as u64;
                    self.state = PhotoState::Accumulating {
                        last_sequence: sequence,
                        orientation,
                        buffer,
                    };
                } else {
                    self.stats.frames_dropped += 1;
                    tracing::warn!(
                        expected = last_sequence as u32 + 1,
                        received = sequence,
                        discarded = buffer.len(),
                        "Photo sequence broken, dropping frame"
                    );
                }
                None
            }
        }
    }

    /// Abandon the in-progress frame, if any
    ///
    /// Used on disconnect. No completion is emitted.
    pub fn reset(&mut self) {
        if let PhotoState::Accumulating { buffer, .. } =
            std::mem::replace(&mut self.state, PhotoState::Idle)
        {
            self.stats.frames_dropped += 1;
            tracing::debug!(discarded = buffer.len(), "Abandoning partial photo");
        }
    }

    fn start(&mut self, mut payload: Bytes) {
        let orientation = if self.variant.has_orientation_byte() && !payload.is_empty() {
            let code = payload[0];
            payload = payload.slice(1..);
            Some(code)
        } else {
            None
        };

        let mut buffer = BytesMut::with_capacity(payload.len() * 32);
        buffer.extend_from_slice(&payload);
        self.stats.bytes_buffered += payload.len() as u64;

        tracing::trace!(orientation = ?orientation, "Photo frame started");

        self.state = PhotoState::Accumulating {
            last_sequence: 0,
            orientation,
            buffer,
        };
    }

    fn finish(&mut self, orientation: Option<u8>, buffer: BytesMut) -> PhotoFrame {
        let rotation = self.variant.rotation(orientation);
        let frame = PhotoFrame::new(buffer.freeze(), rotation, now_millis());

        self.stats.frames_completed += 1;
        tracing::debug!(
            size = frame.size(),
            rotation = %frame.rotation,
            "Photo received"
        );

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Rotation;

    fn feed(r: &mut PhotoReassembler, chunks: Vec<Chunk>) -> Vec<PhotoFrame> {
        chunks.into_iter().filter_map(|c| r.push(c)).collect()
    }

    #[test]
    fn test_oriented_frame() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Oriented);
        let frames = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![0x02, 0xFF, 0xD8]),
                Chunk::data(1, vec![0x01, 0x02]),
                Chunk::data(2, vec![0xFF, 0xD9]),
                Chunk::End,
            ],
        );

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0].data[..], &[0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9]);
        assert_eq!(frames[0].rotation, Rotation::Deg180);
        assert!(frames[0].timestamp > 0);
        assert!(r.is_idle());
        assert_eq!(r.stats().frames_completed, 1);
    }

    #[test]
    fn test_legacy_frame_keeps_first_byte() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Legacy);
        let frames = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![0x00, 0xAA]),
                Chunk::data(1, vec![0xBB]),
                Chunk::End,
            ],
        );

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0].data[..], &[0x00, 0xAA, 0xBB]);
        assert_eq!(frames[0].rotation, Rotation::Deg180);
    }

    #[test]
    fn test_orientation_codes() {
        for (code, expected) in [
            (0u8, Rotation::Deg0),
            (1, Rotation::Deg90),
            (2, Rotation::Deg180),
            (3, Rotation::Deg270),
        ] {
            let mut r = PhotoReassembler::new(ProtocolVariant::Oriented);
            let frames = feed(&mut r, vec![Chunk::data(0, vec![code, 0x10]), Chunk::End]);
            assert_eq!(frames[0].rotation, expected);
            assert_eq!(&frames[0].data[..], &[0x10]);
        }
    }

    #[test]
    fn test_sequence_break_discards_frame() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Oriented);
        let frames = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![0x00, 0x01]),
                Chunk::data(1, vec![0x02]),
                Chunk::data(3, vec![0x04]), // skipped 2
                Chunk::data(4, vec![0x05]),
                Chunk::End,
            ],
        );

        assert!(frames.is_empty());
        assert!(r.is_idle());
        assert_eq!(r.stats().frames_dropped, 1);
        assert_eq!(r.stats().chunks_dropped, 1);
    }

    #[test]
    fn test_recovers_after_break() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Oriented);
        let frames = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![0x00, 0x01]),
                Chunk::data(2, vec![0x02]),
                Chunk::data(0, vec![0x01, 0x0A]),
                Chunk::data(1, vec![0x0B]),
                Chunk::End,
            ],
        );

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0].data[..], &[0x0A, 0x0B]);
        assert_eq!(frames[0].rotation, Rotation::Deg90);
    }

    #[test]
    fn test_breaking_chunk_zero_is_not_a_restart() {
        // A sequence 0 that breaks a frame is dropped, not treated as a new start
        let mut r = PhotoReassembler::new(ProtocolVariant::Legacy);
        let frames = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![0x01]),
                Chunk::data(1, vec![0x02]),
                Chunk::data(0, vec![0x03]),
                Chunk::data(1, vec![0x04]),
                Chunk::End,
            ],
        );

        assert!(frames.is_empty());
        assert!(r.is_idle());
    }

    #[test]
    fn test_duplicate_chunk_is_a_break() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Legacy);
        let frames = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![0x01]),
                Chunk::data(1, vec![0x02]),
                Chunk::data(1, vec![0x02]),
                Chunk::End,
            ],
        );

        assert!(frames.is_empty());
        assert_eq!(r.stats().frames_dropped, 1);
    }

    #[test]
    fn test_sequence_wraparound_is_a_break() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Legacy);
        for sequence in 0..=u16::MAX {
            assert!(r.push(Chunk::data(sequence, vec![0x01])).is_none());
        }
        assert_eq!(r.buffered_len(), 65536);

        // 65535 -> 0 does not continue the frame
        assert!(r.push(Chunk::data(0, vec![0x02])).is_none());
        assert!(r.is_idle());
        assert!(r.push(Chunk::End).is_none());
        assert_eq!(r.stats().frames_dropped, 1);
        assert_eq!(r.stats().frames_completed, 0);
    }

    #[test]
    fn test_idle_ignores_end_and_non_zero() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Oriented);
        assert!(r.push(Chunk::End).is_none());
        assert!(r.push(Chunk::data(5, vec![0x01])).is_none());
        assert!(r.is_idle());
        assert_eq!(r.buffered_len(), 0);
    }

    #[test]
    fn test_empty_first_chunk_on_oriented_firmware() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Oriented);
        let frames = feed(
            &mut r,
            vec![
                Chunk::data(0, Vec::<u8>::new()),
                Chunk::data(1, vec![0x42]),
                Chunk::End,
            ],
        );

        assert_eq!(&frames[0].data[..], &[0x42]);
        assert_eq!(frames[0].rotation, Rotation::Deg0);
    }

    #[test]
    fn test_push_notification_counts_malformed() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Legacy);
        assert!(r.push_notification(Bytes::from_static(&[0x00])).is_none());
        let partial = r.push_notification(Bytes::from_static(&[0x00, 0x00, 0xAB]));
        assert!(partial.is_none());
        let frame = r.push_notification(Bytes::from_static(&[0xFF, 0xFF])).unwrap();

        assert_eq!(&frame.data[..], &[0xAB]);
        assert_eq!(r.stats().notifications, 3);
        assert_eq!(r.stats().malformed, 1);
    }

    #[test]
    fn test_reset_abandons_partial() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Legacy);
        r.push(Chunk::data(0, vec![0x01, 0x02]));
        assert_eq!(r.buffered_len(), 2);

        r.reset();
        assert!(r.is_idle());
        assert!(r.push(Chunk::End).is_none());
        assert_eq!(r.stats().frames_dropped, 1);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut r = PhotoReassembler::new(ProtocolVariant::Oriented);
        let frames = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![0x00, 0x01]),
                Chunk::End,
                Chunk::data(0, vec![0x03, 0x02]),
                Chunk::data(1, vec![0x03]),
                Chunk::End,
            ],
        );

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].rotation, Rotation::Deg270);
        assert_eq!(&frames[1].data[..], &[0x02, 0x03]);
    }
}
