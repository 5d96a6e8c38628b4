// Segment Fetcher: bounded pool of workers that warm segment URLs and classify the responses.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use reqwest::header::HeaderMap;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, instrument, trace, warn};

use crate::hls::classifier::is_cache_hit;
use crate::hls::metrics::WarmMetrics;
use crate::hls::outcome::FetchOutcome;
use crate::transport::HttpTransport;
use crate::utils::sanitize;

pub struct SegmentFetcher {
    transport: Arc<dyn HttpTransport>,
    /// Last successful outcome per segment URL
    cache_stats: RwLock<HashMap<String, FetchOutcome>>,
    metrics: Arc<WarmMetrics>,
    quiet: bool,
}

impl SegmentFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, metrics: Arc<WarmMetrics>, quiet: bool) -> Self {
        Self {
            transport,
            cache_stats: RwLock::new(HashMap::new()),
            metrics,
            quiet,
        }
    }

    /// Last successful outcome recorded for `url`.
    pub fn cache_status(&self, url: &str) -> Option<FetchOutcome> {
        self.cache_stats.read().get(url).cloned()
    }

    /// Number of distinct segments with a recorded outcome.
    pub fn tracked_segments(&self) -> usize {
        self.cache_stats.read().len()
    }

    /// Warms every URL using at most `workers` concurrent requests.
    ///
    /// Returns exactly one outcome per input URL, in completion order.
    pub async fn fetch_all(
        self: &Arc<Self>,
        urls: Vec<String>,
        workers: usize,
        headers: Arc<HeaderMap>,
    ) -> Vec<FetchOutcome> {
        let total = urls.len();
        if total == 0 {
            return Vec::new();
        }

        let queue = Arc::new(Mutex::new(VecDeque::from(urls)));
        let (results_tx, mut results_rx) = mpsc::channel(total);
        let worker_count = workers.clamp(1, total);
        debug!(segments = total, workers = worker_count, "Dispatching warm workers");

        for worker_id in 0..worker_count {
            let fetcher = Arc::clone(self);
            let queue = Arc::clone(&queue);
            let results_tx = results_tx.clone();
            let headers = Arc::clone(&headers);

            tokio::spawn(
                async move {
                    loop {
                        let next = queue.lock().pop_front();
                        let Some(url) = next else {
                            break;
                        };
                        let outcome = fetcher.fetch_segment(&url, &headers).await;
                        if results_tx.send(outcome).await.is_err() {
                            break;
                        }
                    }
                    trace!(worker_id, "Warm worker drained queue");
                }
                .in_current_span(),
            );
        }
        drop(results_tx);

        let mut outcomes = Vec::with_capacity(total);
        while outcomes.len() < total {
            match results_rx.recv().await {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            }
        }

        if outcomes.len() < total {
            warn!(
                expected = total,
                received = outcomes.len(),
                "Warm workers exited before reporting every segment"
            );
        }

        outcomes
    }

    /// Warms a single segment: GET, drain the body, classify.
    #[instrument(level = "debug", skip(self, headers))]
    pub async fn fetch_segment(&self, url: &str, headers: &HeaderMap) -> FetchOutcome {
        let start = Instant::now();
        self.metrics.record_request();
        debug!(headers = ?headers, "Issuing warm request");

        let response = match self.transport.warm(url, headers).await {
            Ok(response) => response,
            Err(e) => {
                let cause = sanitize(&e.to_string());
                self.metrics.record_error();
                warn!(url = %url, error = %cause, "Segment warm failed");
                return FetchOutcome::failed(url, cause, start.elapsed());
            }
        };

        let hit = is_cache_hit(&response.headers);
        self.metrics.record_response(hit, response.bytes);

        let outcome = FetchOutcome {
            url: url.to_owned(),
            hit,
            status: response.status.as_u16(),
            headers: snapshot_headers(&response.headers),
            duration: start.elapsed(),
            error: None,
        };

        if !self.quiet {
            info!(
                url = %url,
                status = outcome.status,
                cache = if hit { "HIT" } else { "MISS" },
                elapsed = ?outcome.duration,
                "Segment warmed"
            );
        }

        self.cache_stats
            .write()
            .insert(outcome.url.clone(), outcome.clone());

        outcome
    }
}

/// One value per header name; the first occurrence wins.
fn snapshot_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut snapshot = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        snapshot
            .entry(name.as_str().to_owned())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    snapshot
}
