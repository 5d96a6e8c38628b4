// Warmer: owns the request identity and runs single warm cycles over a playlist.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER,
    USER_AGENT,
};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::WarmerError;
use crate::config::{HttpClientConfig, WarmerConfig};
use crate::hls::fetcher::SegmentFetcher;
use crate::hls::metrics::WarmMetrics;
use crate::hls::outcome::{FetchOutcome, WarmSummary};
use crate::hls::playlist::parse_segments;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::utils::{base_url, sanitize};

const PLAYBACK_SESSION_HEADER: &str = "x-playback-session-id";

/// Browser-like headers sent with every request.
const FIXED_HEADERS: &[(&str, &str)] = &[
    ("sec-fetch-dest", "video"),
    ("sec-fetch-mode", "no-cors"),
    ("sec-fetch-site", "same-origin"),
    ("priority", "u=3, i"),
];

/// Referer, Origin and session id shared by every request of the process.
///
/// Referer and Origin are write-once: an explicit value wins, otherwise the
/// first playlist processed decides them for all later requests.
#[derive(Debug)]
pub struct RequestIdentity {
    user_agent: String,
    referer: OnceLock<String>,
    origin: OnceLock<String>,
    session_id: String,
}

impl RequestIdentity {
    pub fn new(config: &WarmerConfig) -> Self {
        let referer = write_once(config.referer.as_deref());
        let origin = write_once(config.origin.as_deref());

        let session_id = non_empty(config.session_id.as_deref())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("{:X}", Uuid::new_v4()));

        Self {
            user_agent: config.user_agent.clone(),
            referer,
            origin,
            session_id,
        }
    }

    pub fn referer(&self) -> Option<&str> {
        self.referer.get().map(String::as_str)
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.get().map(String::as_str)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Fills in Referer/Origin from `scheme://host` of the playlist if still unset.
    pub fn adopt_from(&self, playlist_url: &Url) {
        let Some(base) = base_url(playlist_url) else {
            return;
        };

        if self.referer.set(base.clone()).is_ok() {
            info!(referer = %base, "Auto-detected Referer");
        }
        if self.origin.set(base.clone()).is_ok() {
            info!(origin = %base, "Auto-detected Origin");
        }
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        insert_header(&mut headers, USER_AGENT, &self.user_agent);
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        for (name, value) in FIXED_HEADERS {
            headers.insert(
                HeaderName::from_static(*name),
                HeaderValue::from_static(*value),
            );
        }

        if let Some(referer) = self.referer() {
            insert_header(&mut headers, REFERER, referer);
        }
        if let Some(origin) = self.origin() {
            insert_header(&mut headers, ORIGIN, origin);
        }
        insert_header(
            &mut headers,
            HeaderName::from_static(PLAYBACK_SESSION_HEADER),
            &self.session_id,
        );

        headers
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A cell already holding `value`, or an empty one left for auto-detection.
fn write_once(value: Option<&str>) -> OnceLock<String> {
    non_empty(value).map_or_else(OnceLock::new, |v| OnceLock::from(v.to_owned()))
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => warn!(header = %name, error = %e, "Skipping header with invalid value"),
    }
}

pub struct Warmer {
    config: WarmerConfig,
    identity: RequestIdentity,
    transport: Arc<dyn HttpTransport>,
    fetcher: Arc<SegmentFetcher>,
    metrics: Arc<WarmMetrics>,
}

impl Warmer {
    pub fn new(
        config: WarmerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, WarmerError> {
        config.validate()?;

        let metrics = Arc::new(WarmMetrics::new());
        let fetcher = Arc::new(SegmentFetcher::new(
            Arc::clone(&transport),
            Arc::clone(&metrics),
            config.quiet,
        ));

        Ok(Self {
            identity: RequestIdentity::new(&config),
            config,
            transport,
            fetcher,
            metrics,
        })
    }

    /// Builds a warmer backed by a `reqwest` client.
    pub fn with_http_config(
        config: WarmerConfig,
        http_config: &HttpClientConfig,
    ) -> Result<Self, WarmerError> {
        let transport = ReqwestTransport::from_config(http_config)?;
        Self::new(config, Arc::new(transport))
    }

    pub fn config(&self) -> &WarmerConfig {
        &self.config
    }

    pub fn identity(&self) -> &RequestIdentity {
        &self.identity
    }

    pub fn session_id(&self) -> &str {
        self.identity.session_id()
    }

    pub fn referer(&self) -> Option<&str> {
        self.identity.referer()
    }

    pub fn origin(&self) -> Option<&str> {
        self.identity.origin()
    }

    pub fn metrics(&self) -> &Arc<WarmMetrics> {
        &self.metrics
    }

    /// Last successful outcome recorded for a segment URL.
    pub fn cache_status(&self, segment_url: &str) -> Option<FetchOutcome> {
        self.fetcher.cache_status(segment_url)
    }

    /// Parses the playlist URL and lets it seed the auto-detected Referer/Origin.
    pub fn prepare(&self, playlist_url: &str) -> Result<Url, WarmerError> {
        let url = Url::parse(playlist_url)
            .map_err(|e| WarmerError::invalid_url(playlist_url, e.to_string()))?;
        self.identity.adopt_from(&url);
        Ok(url)
    }

    /// Downloads the playlist and extracts its segment URLs.
    pub async fn load_segments(&self, playlist_url: &Url) -> Result<Vec<String>, WarmerError> {
        let headers = self.identity.headers();
        debug!(url = %playlist_url, headers = ?headers, "Fetching playlist");

        let body = self
            .transport
            .fetch_text(playlist_url.as_str(), &headers)
            .await
            .map_err(|e| WarmerError::playlist(playlist_url.as_str(), sanitize(&e.to_string())))?;

        Ok(parse_segments(&body, playlist_url))
    }

    /// Warms the given segments with the configured worker count.
    pub async fn fetch_segments(&self, segments: Vec<String>) -> Vec<FetchOutcome> {
        let headers = Arc::new(self.identity.headers());
        self.fetcher
            .fetch_all(segments, self.config.workers, headers)
            .await
    }

    /// Runs one full warm cycle over a playlist.
    ///
    /// Fails only when the playlist itself cannot be fetched or its URL is
    /// invalid; segment failures are reported inside the summary.
    pub async fn warm_playlist(&self, playlist_url: &str) -> Result<WarmSummary, WarmerError> {
        let start = Instant::now();
        let url = self.prepare(playlist_url)?;

        info!(playlist = %playlist_url, "Starting to warm playlist");
        let segments = self.load_segments(&url).await?;
        let total = segments.len();
        info!(playlist = %playlist_url, segments = total, "Found segments");

        let outcomes = self.fetch_segments(segments).await;
        self.metrics.record_cycle();

        Ok(WarmSummary::from_outcomes(
            playlist_url,
            total,
            outcomes,
            start.elapsed(),
        ))
    }
}
