// HLS cache warming: playlist parsing, segment fetching and daemon scheduling

mod classifier;
pub mod events;
mod fetcher;
mod ledger;
mod metrics;
mod outcome;
mod playlist;
mod scheduler;
mod warmer;

// Re-exports for easier access
pub use classifier::is_cache_hit;
pub use events::{TickReport, WarmEvent};
pub use fetcher::SegmentFetcher;
pub use ledger::DedupLedger;
pub use metrics::{MetricsSnapshot, WarmMetrics};
pub use outcome::{FetchOutcome, WarmSummary};
pub use playlist::parse_segments;
pub use scheduler::{ActivityFlags, ActivityGuard, StreamScheduler, TickOutcome};
pub use warmer::{RequestIdentity, Warmer};
