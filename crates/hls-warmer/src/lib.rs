pub mod config;
pub mod error;
pub mod hls;
pub mod transport;
mod utils;

#[cfg(test)]
mod test_support;

pub use config::{HttpClientConfig, ProxyConfig, ProxyType, WarmerConfig};
pub use error::WarmerError;
pub use hls::{
    FetchOutcome, MetricsSnapshot, StreamScheduler, TickReport, WarmEvent, WarmMetrics,
    WarmSummary, Warmer, is_cache_hit, parse_segments,
};
pub use transport::{HttpTransport, ReqwestTransport, WarmResponse};
pub use utils::sanitize;
