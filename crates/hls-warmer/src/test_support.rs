//! In-memory transport used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::sync::Semaphore;

use crate::WarmerError;
use crate::transport::{HttpTransport, WarmResponse};

/// Bytes reported for every drained segment body.
pub(crate) const SEGMENT_BYTES: u64 = 188 * 64;

#[derive(Default)]
pub(crate) struct FakeTransport {
    playlists: Mutex<HashMap<String, String>>,
    segment_headers: HashMap<String, HeaderMap>,
    failing: HashSet<String>,
    delay: Duration,
    playlist_gate: Option<Arc<Semaphore>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    playlist_calls: AtomicUsize,
    warm_calls: Mutex<Vec<String>>,
    seen_headers: Mutex<Vec<HeaderMap>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_playlist(self, url: &str, body: &str) -> Self {
        self.set_playlist(url, body);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn with_failing_segment(mut self, url: &str) -> Self {
        self.failing.insert(url.to_owned());
        self
    }

    pub(crate) fn with_segment_headers(mut self, url: &str, pairs: &[(&str, &str)]) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        self.segment_headers.insert(url.to_owned(), headers);
        self
    }

    /// Playlist downloads wait for a permit on `gate` before answering.
    pub(crate) fn with_playlist_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.playlist_gate = Some(gate);
        self
    }

    pub(crate) fn set_playlist(&self, url: &str, body: &str) {
        self.playlists.lock().insert(url.to_owned(), body.to_owned());
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn playlist_calls(&self) -> usize {
        self.playlist_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn warm_calls(&self) -> Vec<String> {
        self.warm_calls.lock().clone()
    }

    pub(crate) fn seen_headers(&self) -> Vec<HeaderMap> {
        self.seen_headers.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn fetch_text(&self, url: &str, headers: &HeaderMap) -> Result<String, WarmerError> {
        self.playlist_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_headers.lock().push(headers.clone());

        if let Some(gate) = &self.playlist_gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| WarmerError::client(e.to_string()))?;
        }

        let body = self.playlists.lock().get(url).cloned();
        body.ok_or_else(|| WarmerError::body_read(url, "404 Not Found"))
    }

    async fn warm(&self, url: &str, headers: &HeaderMap) -> Result<WarmResponse, WarmerError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.warm_calls.lock().push(url.to_owned());
        self.seen_headers.lock().push(headers.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(url) {
            return Err(WarmerError::body_read(url, "connection reset\u{1b}[0m by peer\u{0}"));
        }

        Ok(WarmResponse {
            status: StatusCode::OK,
            headers: self.segment_headers.get(url).cloned().unwrap_or_default(),
            bytes: SEGMENT_BYTES,
        })
    }
}
