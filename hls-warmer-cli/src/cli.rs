use std::time::Duration;

use clap::{Parser, ValueEnum};
use hls_warmer_engine::config::{DEFAULT_USER_AGENT, DEFAULT_WORKERS};
use hls_warmer_engine::{HttpClientConfig, ProxyConfig, ProxyType, WarmerConfig};

/// Output format for single-pass reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable report
    Pretty,
    /// One JSON object per playlist
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "hls-warmer",
    version,
    about = "Warm CDN caches by fetching every segment of HLS playlists before viewers do",
    long_about = None
)]
pub struct Args {
    /// Playlist URLs to warm
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Referer header (auto-detected from the first playlist if omitted)
    #[arg(long)]
    pub referer: Option<String>,

    /// Origin header (auto-detected from the first playlist if omitted)
    #[arg(long)]
    pub origin: Option<String>,

    /// X-Playback-Session-Id header (random UUID if omitted)
    #[arg(long = "playback-id", value_name = "ID")]
    pub playback_id: Option<String>,

    /// Number of concurrent segment requests
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, value_parser = parse_workers)]
    pub workers: usize,

    /// Keep re-checking the playlists and warm newly appended segments
    #[arg(short, long)]
    pub daemon: bool,

    /// Daemon tick interval (e.g. 1s, 15s, 1m)
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub interval: Duration,

    /// Re-warm the last N segments of each playlist on every tick (0 disables)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub rewarm_last: usize,

    /// How long a warmed segment is skipped before it may be warmed again
    #[arg(long, default_value = "5m", value_parser = humantime::parse_duration)]
    pub ttl: Duration,

    /// Overall timeout per HTTP request
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Proxy server URL (system proxy settings are used otherwise)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Proxy type
    #[arg(long, value_enum, default_value_t = ProxyType::Http)]
    pub proxy_type: ProxyType,

    /// Enable debug logging, including request headers
    #[arg(long)]
    pub debug: bool,

    /// Condensed output: no per-segment lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Report format for single-pass mode
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

impl Args {
    pub fn warmer_config(&self) -> WarmerConfig {
        WarmerConfig {
            workers: self.workers,
            referer: self.referer.clone(),
            origin: self.origin.clone(),
            session_id: self.playback_id.clone(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            interval: self.interval,
            ttl: self.ttl,
            rewarm_last: self.rewarm_last,
            quiet: self.quiet,
        }
    }

    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: self.timeout,
            proxy: self.proxy.as_ref().map(|url| ProxyConfig {
                url: url.clone(),
                proxy_type: self.proxy_type,
            }),
            ..Default::default()
        }
    }
}

fn parse_workers(value: &str) -> Result<usize, String> {
    let workers: usize = value
        .parse()
        .map_err(|e| format!("`{value}` is not a valid worker count: {e}"))?;
    if workers == 0 {
        return Err("worker count must be at least 1".to_string());
    }
    Ok(workers)
}
