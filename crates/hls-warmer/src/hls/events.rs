//! Daemon scheduler events.
//!
//! The scheduler never prints anything itself; every observable step of a
//! tick is published as a [`WarmEvent`] for the caller to render.

use std::time::Duration;

/// Events emitted by the stream scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum WarmEvent {
    /// Daemon loops started
    DaemonStarted { streams: usize, interval: Duration },
    /// A tick found the previous cycle for this stream still running
    TickSkipped { stream: String },
    /// Playlist could not be fetched or its URL is invalid
    PlaylistFailed { stream: String, error: String },
    /// Every segment in the playlist is still fresh
    NoNewSegments { stream: String },
    /// A tick fetched at least one segment
    TickCompleted(TickReport),
    /// Cancellation observed, all tick loops have exited
    DaemonStopped,
}

/// Per-tick summary for one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub stream: String,
    /// Segments fetched this tick, rewarmed tail included
    pub new_segments: usize,
    pub hits: usize,
    pub errors: usize,
    /// `"url: cause"` per failed segment; only filled in quiet mode
    pub error_details: Vec<String>,
}

impl TickReport {
    pub fn misses(&self) -> usize {
        self.new_segments.saturating_sub(self.hits)
    }
}
