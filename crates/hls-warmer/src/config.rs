use std::time::Duration;

use reqwest::{Client, Proxy};
use tracing::debug;

use crate::WarmerError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Settings for the warm engine and the daemon scheduler.
#[derive(Debug, Clone)]
pub struct WarmerConfig {
    /// Number of concurrent segment fetches per cycle
    pub workers: usize,

    /// Explicit Referer; auto-detected from the first playlist when `None`
    pub referer: Option<String>,

    /// Explicit Origin; auto-detected from the first playlist when `None`
    pub origin: Option<String>,

    /// `X-Playback-Session-Id` value; a random UUID v4 when `None`
    pub session_id: Option<String>,

    /// User agent sent with every request
    pub user_agent: String,

    /// Daemon tick interval per playlist
    pub interval: Duration,

    /// How long a warmed segment stays fresh in the dedup ledger
    pub ttl: Duration,

    /// Re-warm the last N segments of the playlist on every tick (0 disables)
    pub rewarm_last: usize,

    /// Condensed reporting: no per-segment lines, error details in tick reports
    pub quiet: bool,
}

impl Default for WarmerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            referer: None,
            origin: None,
            session_id: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            interval: DEFAULT_INTERVAL,
            ttl: DEFAULT_TTL,
            rewarm_last: 0,
            quiet: false,
        }
    }
}

impl WarmerConfig {
    pub fn validate(&self) -> Result<(), WarmerError> {
        if self.workers == 0 {
            return Err(WarmerError::configuration("workers must be at least 1"));
        }
        if self.interval.is_zero() {
            return Err(WarmerError::configuration("interval must be greater than zero"));
        }
        Ok(())
    }
}

/// Proxy configuration types
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ProxyType {
    /// HTTP proxy
    Http,
    /// HTTPS proxy
    Https,
    /// SOCKS5 proxy
    Socks5,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Proxy server URL (e.g., "http://proxy.example.com:8080")
    pub url: String,
    pub proxy_type: ProxyType,
}

impl ProxyConfig {
    fn build(&self) -> Result<Proxy, WarmerError> {
        let proxy = match self.proxy_type {
            ProxyType::Http => Proxy::http(&self.url),
            ProxyType::Https => Proxy::https(&self.url),
            ProxyType::Socks5 => {
                let url = if self.url.starts_with("socks5://") || self.url.starts_with("socks5h://")
                {
                    self.url.clone()
                } else {
                    format!("socks5://{}", self.url)
                };
                Proxy::all(url)
            }
        };
        proxy.map_err(|e| WarmerError::client(format!("invalid proxy URL {}: {e}", self.url)))
    }
}

/// Transport-level settings for the shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Overall timeout for a single request, including the body drain
    pub timeout: Duration,

    /// Time allowed to establish a connection
    pub connect_timeout: Duration,

    /// Maximum idle connections to keep per host
    pub pool_max_idle_per_host: usize,

    /// Duration to keep idle connections alive before closing
    pub pool_idle_timeout: Duration,

    /// Explicit proxy (optional)
    pub proxy: Option<ProxyConfig>,

    /// Whether to honour system/env proxy settings when no explicit proxy is set
    pub use_system_proxy: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            proxy: None,
            use_system_proxy: true,
        }
    }
}

impl HttpClientConfig {
    pub fn build_client(&self) -> Result<Client, WarmerError> {
        let mut builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout);

        if !self.timeout.is_zero() {
            builder = builder.timeout(self.timeout);
        }

        if let Some(proxy) = &self.proxy {
            debug!(proxy = %proxy.url, proxy_type = ?proxy.proxy_type, "Using explicit proxy");
            builder = builder.proxy(proxy.build()?);
        } else if !self.use_system_proxy {
            builder = builder.no_proxy();
        }

        builder
            .build()
            .map_err(|e| WarmerError::client(format!("failed to build HTTP client: {e}")))
    }
}
