use std::collections::HashMap;
use std::time::Duration;

/// Result of one warm request against a segment URL.
///
/// When `error` is set the request failed and `hit` / `status` carry no meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub url: String,
    pub hit: bool,
    pub status: u16,
    /// Response headers, lowercase names, first value per name
    pub headers: HashMap<String, String>,
    pub duration: Duration,
    /// Sanitized failure cause
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn failed(url: impl Into<String>, cause: impl Into<String>, duration: Duration) -> Self {
        Self {
            url: url.into(),
            hit: false,
            status: 0,
            headers: HashMap::new(),
            duration,
            error: Some(cause.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_hit(&self) -> bool {
        self.error.is_none() && self.hit
    }
}

/// Aggregate of one warm cycle over a playlist.
#[derive(Debug, Clone)]
pub struct WarmSummary {
    pub playlist_url: String,
    /// Number of segments dispatched
    pub total_segments: usize,
    pub cache_hits: usize,
    /// Failure causes in completion order
    pub errors: Vec<String>,
    /// Wall-clock time of the whole cycle, playlist download included
    pub duration: Duration,
    /// Individual outcomes in completion order
    pub outcomes: Vec<FetchOutcome>,
}

impl WarmSummary {
    pub fn from_outcomes(
        playlist_url: impl Into<String>,
        total_segments: usize,
        outcomes: Vec<FetchOutcome>,
        duration: Duration,
    ) -> Self {
        let cache_hits = outcomes.iter().filter(|o| o.is_hit()).count();
        let errors = outcomes
            .iter()
            .filter_map(|o| o.error.clone())
            .collect();

        Self {
            playlist_url: playlist_url.into(),
            total_segments,
            cache_hits,
            errors,
            duration,
            outcomes,
        }
    }

    /// Everything that was not a hit, failures included.
    pub fn cache_misses(&self) -> usize {
        self.total_segments.saturating_sub(self.cache_hits)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Hit percentage over all dispatched segments; 0.0 for an empty playlist.
    pub fn cache_ratio(&self) -> f64 {
        if self.total_segments == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / self.total_segments as f64 * 100.0
    }
}
