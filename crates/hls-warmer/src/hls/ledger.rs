use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Records when each segment was last fetched so daemon ticks only warm
/// segments that are new or whose entry outlived the TTL.
///
/// Entries are overwritten, never removed.
#[derive(Debug)]
pub struct DedupLedger {
    ttl: Duration,
    entries: HashMap<String, Instant>,
}

impl DedupLedger {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `segment` was stamped no longer than `ttl` before `now`.
    pub fn is_fresh(&self, segment: &str, now: Instant) -> bool {
        self.entries
            .get(segment)
            .is_some_and(|stamped| now.saturating_duration_since(*stamped) <= self.ttl)
    }

    /// Picks the segments to fetch on a tick at `now` and stamps them.
    ///
    /// Returns the new-or-expired segments in playlist order, followed by up
    /// to `rewarm_last` tail segments (by position) not already selected.
    /// The tail is re-stamped regardless of freshness.
    pub fn select(&mut self, segments: &[String], now: Instant, rewarm_last: usize) -> Vec<String> {
        let mut selected = Vec::new();
        let mut chosen = HashSet::new();

        for segment in segments {
            if self.is_fresh(segment, now) || chosen.contains(segment.as_str()) {
                continue;
            }
            self.entries.insert(segment.clone(), now);
            chosen.insert(segment.as_str());
            selected.push(segment.clone());
        }

        if rewarm_last > 0 {
            let start = segments.len().saturating_sub(rewarm_last);
            for segment in &segments[start..] {
                self.entries.insert(segment.clone(), now);
                if chosen.insert(segment.as_str()) {
                    selected.push(segment.clone());
                }
            }
        }

        selected
    }
}
