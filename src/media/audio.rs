//! Audio stream reassembly
//!
//! Audio clips use the same chunk framing as photos, but the first chunk
//! announces the codec:
//!
//! ```text
//!   seq 0: [codec id] [samples...]
//!   seq 1: [samples...]
//!   ...
//!   0xFF 0xFF
//! ```
//!
//! Unlike the photo stream, an out-of-order chunk only costs that chunk: it
//! is dropped and accumulation continues. A sequence 0 always starts a new
//! clip, silently discarding whatever was buffered.

use std::fmt;

use bytes::{Bytes, BytesMut};

use super::frame::{now_millis, AudioClip};
use crate::protocol::constants::DEFAULT_AUDIO_CODEC;
use crate::protocol::Chunk;
use crate::stats::StreamStats;

/// Audio codec id as announced by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioCodec(pub u8);

impl AudioCodec {
    /// 16-bit PCM, 16 kHz
    pub const PCM16: AudioCodec = AudioCodec(0);
    /// PCM, 8 kHz
    pub const PCM8: AudioCodec = AudioCodec(1);
    /// Opus packets
    pub const OPUS: AudioCodec = AudioCodec(20);

    /// Raw codec id
    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            0 => "pcm16",
            1 => "pcm8",
            20 => "opus",
            _ => "unknown",
        }
    }
}

impl Default for AudioCodec {
    fn default() -> Self {
        AudioCodec(DEFAULT_AUDIO_CODEC)
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

#[derive(Debug)]
enum AudioState {
    Idle,
    Accumulating { frame_index: u16, buffer: BytesMut },
}

/// Audio stream state machine
#[derive(Debug)]
pub struct AudioReassembler {
    state: AudioState,
    /// Last codec announced on this stream; survives across clips
    codec: AudioCodec,
    stats: StreamStats,
}

impl AudioReassembler {
    pub fn new() -> Self {
        Self {
            state: AudioState::Idle,
            codec: AudioCodec::default(),
            stats: StreamStats::new(),
        }
    }

    /// Check if no clip is in progress
    pub fn is_idle(&self) -> bool {
        matches!(self.state, AudioState::Idle)
    }

    /// Last codec announced by the device
    pub fn codec(&self) -> AudioCodec {
        self.codec
    }

    /// Index of the last accepted chunk, or -1 while idle
    pub fn frame_index(&self) -> i32 {
        match &self.state {
            AudioState::Idle => -1,
            AudioState::Accumulating { frame_index, .. } => *frame_index as i32,
        }
    }

    /// Bytes buffered for the in-progress clip
    pub fn buffered_len(&self) -> usize {
        match &self.state {
            AudioState::Idle => 0,
            AudioState::Accumulating { buffer, .. } => buffer.len(),
        }
    }

    /// Reassembly counters
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Decode and process a raw notification
    pub fn push_notification(&mut self, raw: Bytes) -> Option<AudioClip> {
        self.stats.notifications += 1;

        match Chunk::decode(raw) {
            Some(chunk) => self.push(chunk),
            None => {
                self.stats.malformed += 1;
                tracing::trace!("Dropping malformed audio notification");
                None
            }
        }
    }

    /// Process a decoded chunk
    ///
    /// Returns the completed clip on an end marker with buffered audio.
    pub fn push(&mut self, chunk: Chunk) -> Option<AudioClip> {
        match chunk {
            Chunk::End => self.finish(),
            Chunk::Data {
                sequence: 0,
                payload,
            } => {
                self.start(payload);
                None
            }
            Chunk::Data { sequence, payload } => {
                match &mut self.state {
                    AudioState::Accumulating {
                        frame_index,
                        buffer,
                        ..
                    } if frame_index.checked_add(1) == Some(sequence) => {
                        buffer.extend_from_slice(&payload);
                        *frame_index = sequence;
                        self.stats.bytes_buffered += payload.len() as u64;
                    }
                    AudioState::Accumulating { frame_index, .. } => {
                        self.stats.chunks_dropped += 1;
                        tracing::debug!(
                            expected = *frame_index as u32 + 1,
                            received = sequence,
                            "Dropping out-of-order audio chunk"
                        );
                    }
                    AudioState::Idle => {
                        self.stats.chunks_dropped += 1;
                        tracing::trace!(sequence = sequence, "Ignoring audio chunk while idle");
                    }
                }
                None
            }
        }
    }

    /// Abandon the in-progress clip, if any
    pub fn reset(&mut self) {
        if let AudioState::Accumulating { buffer, .. } =
            std::mem::replace(&mut self.state, AudioState::Idle)
        {
            self.stats.frames_dropped += 1;
            tracing::debug!(discarded = buffer.len(), "Abandoning partial audio clip");
        }
    }

    fn start(&mut self, payload: Bytes) {
        let samples = if payload.len() > 1 {
            self.codec = AudioCodec(payload[0]);
            payload.slice(1..)
        } else {
            payload
        };

        if let AudioState::Accumulating { buffer, .. } = &self.state {
            self.stats.frames_dropped += 1;
            tracing::debug!(discarded = buffer.len(), "Audio clip restarted");
        }

        let mut buffer = BytesMut::with_capacity(samples.len() * 32);
        buffer.extend_from_slice(&samples);
        self.stats.bytes_buffered += samples.len() as u64;

        self.state = AudioState::Accumulating {
            frame_index: 0,
            buffer,
        };
    }

    fn finish(&mut self) -> Option<AudioClip> {
        match std::mem::replace(&mut self.state, AudioState::Idle) {
            AudioState::Accumulating { buffer, .. } if !buffer.is_empty() => {
                let clip = AudioClip::new(buffer.freeze(), self.codec, now_millis());
                self.stats.frames_completed += 1;
                tracing::debug!(size = clip.size(), codec = %clip.codec, "Audio clip received");
                Some(clip)
            }
            _ => None,
        }
    }
}

impl Default for AudioReassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(r: &mut AudioReassembler, chunks: Vec<Chunk>) -> Vec<AudioClip> {
        chunks.into_iter().filter_map(|c| r.push(c)).collect()
    }

    #[test]
    fn test_clip_with_codec() {
        let mut r = AudioReassembler::new();
        let clips = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![20, 0x01, 0x02]),
                Chunk::data(1, vec![0x03]),
                Chunk::data(2, vec![0x04, 0x05]),
                Chunk::End,
            ],
        );

        assert_eq!(clips.len(), 1);
        assert_eq!(&clips[0].data[..], &[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(clips[0].codec, AudioCodec::OPUS);
        assert_eq!(r.frame_index(), -1);
    }

    #[test]
    fn test_default_codec() {
        let mut r = AudioReassembler::new();
        assert_eq!(r.codec(), AudioCodec::PCM8);

        // A single byte after the header is audio, not a codec id
        let clips = feed(&mut r, vec![Chunk::data(0, vec![0x7F]), Chunk::End]);
        assert_eq!(&clips[0].data[..], &[0x7F]);
        assert_eq!(clips[0].codec, AudioCodec::PCM8);
    }

    #[test]
    fn test_codec_persists_across_clips() {
        let mut r = AudioReassembler::new();
        feed(
            &mut r,
            vec![Chunk::data(0, vec![0, 0xAA, 0xBB]), Chunk::End],
        );
        let clips = feed(&mut r, vec![Chunk::data(0, vec![0xCC]), Chunk::End]);

        assert_eq!(clips[0].codec, AudioCodec::PCM16);
    }

    #[test]
    fn test_restart_with_new_codec_tags_clip() {
        let mut r = AudioReassembler::new();
        let clips = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![20, 0x01]),
                Chunk::data(0, vec![0, 0x02, 0x03]),
                Chunk::End,
            ],
        );

        assert_eq!(clips.len(), 1);
        assert_eq!(&clips[0].data[..], &[0x02, 0x03]);
        assert_eq!(clips[0].codec, AudioCodec::PCM16);
        assert_eq!(r.codec(), AudioCodec::PCM16);
    }

    #[test]
    fn test_empty_end_marker_resets() {
        let mut r = AudioReassembler::new();
        // Header-only chunk 0 starts a clip with an empty buffer
        r.push(Chunk::data(0, Vec::<u8>::new()));
        assert_eq!(r.frame_index(), 0);

        assert!(r.push(Chunk::End).is_none());
        assert_eq!(r.frame_index(), -1);
        assert!(r.is_idle());

        assert!(r.push(Chunk::End).is_none());
        assert_eq!(r.stats().frames_completed, 0);
    }

    #[test]
    fn test_restart_discards_buffer() {
        let mut r = AudioReassembler::new();
        let clips = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![1, 0x01, 0x02]),
                Chunk::data(1, vec![0x03]),
                Chunk::data(0, vec![1, 0x10]),
                Chunk::data(1, vec![0x11]),
                Chunk::data(2, vec![0x12]),
                Chunk::End,
            ],
        );

        assert_eq!(clips.len(), 1);
        assert_eq!(&clips[0].data[..], &[0x10, 0x11, 0x12]);
        assert_eq!(r.stats().frames_dropped, 1);
    }

    #[test]
    fn test_out_of_order_chunk_dropped() {
        let mut r = AudioReassembler::new();
        let clips = feed(
            &mut r,
            vec![
                Chunk::data(0, vec![1, 0x01, 0x02]),
                Chunk::data(2, vec![0xEE]), // gap, dropped
                Chunk::data(1, vec![0x03]),
                Chunk::data(1, vec![0x03]), // duplicate, dropped
                Chunk::data(2, vec![0x04]),
                Chunk::End,
            ],
        );

        assert_eq!(clips.len(), 1);
        assert_eq!(&clips[0].data[..], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(r.stats().chunks_dropped, 2);
        assert_eq!(r.stats().frames_dropped, 0);
    }

    #[test]
    fn test_idle_drops_non_zero() {
        let mut r = AudioReassembler::new();
        assert!(r.push(Chunk::data(3, vec![0x01])).is_none());
        assert!(r.is_idle());
        assert_eq!(r.buffered_len(), 0);
    }

    #[test]
    fn test_push_notification() {
        let mut r = AudioReassembler::new();
        r.push_notification(Bytes::from_static(&[0x00, 0x00, 0x01, 0xAA, 0xBB]));
        r.push_notification(Bytes::from_static(&[0x01]));
        r.push_notification(Bytes::from_static(&[0x01, 0x00, 0xCC]));
        let clip = r
            .push_notification(Bytes::from_static(&[0xFF, 0xFF]))
            .unwrap();

        assert_eq!(&clip.data[..], &[0xAA, 0xBB, 0xCC]);
        assert_eq!(r.stats().malformed, 1);
        assert_eq!(r.stats().notifications, 4);
    }

    #[test]
    fn test_codec_display() {
        assert_eq!(AudioCodec::OPUS.to_string(), "opus (20)");
        assert_eq!(AudioCodec(99).name(), "unknown");
    }
}
