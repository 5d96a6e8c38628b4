// Stream Scheduler: periodic per-playlist ticks with overlap protection and TTL deduplication.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::WarmerError;
use crate::hls::events::{TickReport, WarmEvent};
use crate::hls::ledger::DedupLedger;
use crate::hls::warmer::Warmer;
use crate::utils::sanitize;

/// Set of streams with a cycle in flight.
#[derive(Debug, Default)]
pub struct ActivityFlags {
    active: Mutex<HashSet<String>>,
}

impl ActivityFlags {
    /// Marks `stream` active, or returns `None` if it already is.
    pub fn try_begin(self: &Arc<Self>, stream: &str) -> Option<ActivityGuard> {
        if !self.active.lock().insert(stream.to_owned()) {
            return None;
        }
        Some(ActivityGuard {
            flags: Arc::clone(self),
            stream: stream.to_owned(),
        })
    }

    pub fn is_active(&self, stream: &str) -> bool {
        self.active.lock().contains(stream)
    }
}

/// Clears the stream's activity flag when dropped, whatever way the cycle ended.
#[derive(Debug)]
pub struct ActivityGuard {
    flags: Arc<ActivityFlags>,
    stream: String,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.flags.active.lock().remove(&self.stream);
    }
}

/// Result of processing one tick for a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    PlaylistFailed(String),
    NoNewSegments,
    Completed(TickReport),
}

impl TickOutcome {
    pub fn into_event(self, stream: String) -> WarmEvent {
        match self {
            Self::PlaylistFailed(error) => WarmEvent::PlaylistFailed { stream, error },
            Self::NoNewSegments => WarmEvent::NoNewSegments { stream },
            Self::Completed(report) => WarmEvent::TickCompleted(report),
        }
    }
}

pub struct StreamScheduler {
    warmer: Arc<Warmer>,
    ledger: Mutex<DedupLedger>,
    activity: Arc<ActivityFlags>,
    events: mpsc::UnboundedSender<WarmEvent>,
}

impl StreamScheduler {
    pub fn new(warmer: Arc<Warmer>) -> (Arc<Self>, mpsc::UnboundedReceiver<WarmEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let ledger = DedupLedger::new(warmer.config().ttl);
        let scheduler = Arc::new(Self {
            warmer,
            ledger: Mutex::new(ledger),
            activity: Arc::new(ActivityFlags::default()),
            events,
        });
        (scheduler, events_rx)
    }

    pub fn warmer(&self) -> &Arc<Warmer> {
        &self.warmer
    }

    pub fn is_running(&self, stream: &str) -> bool {
        self.activity.is_active(stream)
    }

    pub fn tracked_segments(&self) -> usize {
        self.ledger.lock().len()
    }

    fn emit(&self, event: WarmEvent) {
        // Nobody listening is fine, the daemon keeps warming.
        let _ = self.events.send(event);
    }

    /// Starts a detached cycle for `stream` unless one is already in flight.
    ///
    /// Returns the cycle's handle, or `None` when the tick was skipped.
    pub fn schedule(self: &Arc<Self>, stream: &str) -> Option<JoinHandle<()>> {
        let Some(guard) = self.activity.try_begin(stream) else {
            debug!(stream = %stream, "Previous cycle still running, skipping tick");
            self.warmer.metrics().record_skipped_tick();
            self.emit(WarmEvent::TickSkipped {
                stream: stream.to_owned(),
            });
            return None;
        };

        let scheduler = Arc::clone(self);
        let stream = stream.to_owned();
        let span = info_span!("tick", stream = %stream);

        Some(tokio::spawn(
            async move {
                let _guard = guard;
                let outcome = scheduler.process_tick(&stream).await;
                scheduler.emit(outcome.into_event(stream));
            }
            .instrument(span),
        ))
    }

    /// Runs one tick: re-parse, select new or rewarmed segments, fetch them.
    ///
    /// Callers must hold the stream's activity flag.
    pub async fn process_tick(&self, stream: &str) -> TickOutcome {
        let segments = match self.load(stream).await {
            Ok(segments) => segments,
            Err(e) => {
                let error = sanitize(&e.to_string());
                warn!(stream = %stream, error = %error, "Failed to parse playlist");
                return TickOutcome::PlaylistFailed(error);
            }
        };

        let now = time::Instant::now().into_std();
        let rewarm_last = self.warmer.config().rewarm_last;
        let selected = self.ledger.lock().select(&segments, now, rewarm_last);

        if selected.is_empty() {
            debug!(stream = %stream, segments = segments.len(), "No new segments");
            return TickOutcome::NoNewSegments;
        }

        let new_segments = selected.len();
        info!(stream = %stream, count = new_segments, "Warming new segments");

        let outcomes = self.warmer.fetch_segments(selected).await;
        self.warmer.metrics().record_cycle();

        let hits = outcomes.iter().filter(|o| o.is_hit()).count();
        let failed: Vec<_> = outcomes.iter().filter(|o| o.is_error()).collect();
        let error_details = if self.warmer.config().quiet {
            failed
                .iter()
                .map(|o| format!("{}: {}", o.url, o.error.as_deref().unwrap_or_default()))
                .collect()
        } else {
            Vec::new()
        };

        TickOutcome::Completed(TickReport {
            stream: stream.to_owned(),
            new_segments,
            hits,
            errors: failed.len(),
            error_details,
        })
    }

    async fn load(&self, stream: &str) -> Result<Vec<String>, WarmerError> {
        let url = self.warmer.prepare(stream)?;
        self.warmer.load_segments(&url).await
    }

    async fn tick_loop(self: Arc<Self>, stream: String, token: CancellationToken) {
        let period = self.warmer.config().interval;
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                _ = ticker.tick() => {
                    self.schedule(&stream);
                }
            }
        }

        debug!(stream = %stream, "Tick loop stopped");
    }

    /// Watches every stream until `token` is cancelled.
    ///
    /// Each stream gets an immediate first cycle, then one tick per interval.
    /// Cycles already in flight at cancellation are left to finish on their own.
    pub async fn run(
        self: Arc<Self>,
        streams: Vec<String>,
        token: CancellationToken,
    ) -> Result<(), WarmerError> {
        if streams.is_empty() {
            return Err(WarmerError::configuration("no playlists to watch"));
        }

        let interval = self.warmer.config().interval;
        info!(
            streams = streams.len(),
            interval = ?interval,
            ttl = ?self.warmer.config().ttl,
            rewarm_last = self.warmer.config().rewarm_last,
            "Starting daemon"
        );
        self.emit(WarmEvent::DaemonStarted {
            streams: streams.len(),
            interval,
        });

        let mut loops = Vec::with_capacity(streams.len());
        for stream in streams {
            self.schedule(&stream);
            loops.push(tokio::spawn(
                Arc::clone(&self).tick_loop(stream, token.clone()),
            ));
        }

        token.cancelled().await;
        info!("Shutting down daemon");

        for result in futures::future::join_all(loops).await {
            if let Err(e) = result {
                warn!(error = %e, "Tick loop terminated abnormally");
            }
        }

        self.warmer.metrics().log_summary();
        self.emit(WarmEvent::DaemonStopped);
        Ok(())
    }
}
