//! Statistics for glass sessions

use std::time::{Duration, Instant};

/// Per-stream reassembly counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Notifications received, including malformed ones
    pub notifications: u64,
    /// Notifications too short to carry a sequence header
    pub malformed: u64,
    /// Payload bytes appended to frame buffers
    pub bytes_buffered: u64,
    /// Frames emitted to the handler
    pub frames_completed: u64,
    /// In-progress frames thrown away (sequence break or restart)
    pub frames_dropped: u64,
    /// Individual chunks ignored without touching the frame
    pub chunks_dropped: u64,
}

impl StreamStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of started frames that completed
    pub fn completion_ratio(&self) -> f64 {
        let started = self.frames_completed + self.frames_dropped;
        if started > 0 {
            self.frames_completed as f64 / started as f64
        } else {
            0.0
        }
    }
}

/// Session-level statistics
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Photo stream counters
    pub photo: StreamStats,
    /// Audio stream counters
    pub audio: StreamStats,
    /// When the session started
    pub started_at: Instant,
    /// Connection duration, filled in at teardown
    pub duration: Duration,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            photo: StreamStats::new(),
            audio: StreamStats::new(),
            started_at: Instant::now(),
            duration: Duration::ZERO,
        }
    }

    /// Freeze the duration
    pub fn finish(&mut self) {
        self.duration = self.started_at.elapsed();
    }

    /// Photos per second over the session
    pub fn photo_rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.photo.frames_completed as f64 / secs
        } else {
            0.0
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_stats_new() {
        let stats = StreamStats::new();
        assert_eq!(stats.notifications, 0);
        assert_eq!(stats.malformed, 0);
        assert_eq!(stats.frames_completed, 0);
        assert_eq!(stats.frames_dropped, 0);
        assert_eq!(stats.completion_ratio(), 0.0);
    }

    #[test]
    fn test_completion_ratio() {
        let stats = StreamStats {
            frames_completed: 3,
            frames_dropped: 1,
            ..Default::default()
        };
        assert_eq!(stats.completion_ratio(), 0.75);
    }

    #[test]
    fn test_photo_rate() {
        let mut stats = SessionStats::new();
        stats.photo.frames_completed = 12;
        stats.duration = Duration::from_secs(60);
        assert_eq!(stats.photo_rate(), 0.2);

        stats.duration = Duration::ZERO;
        assert_eq!(stats.photo_rate(), 0.0);
    }
}
