// HTTP transport seam: the engine only ever talks to the network through `HttpTransport`.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::{trace, warn};

use crate::WarmerError;
use crate::config::HttpClientConfig;

/// Status and headers of a segment response whose body has been fully drained.
#[derive(Debug, Clone)]
pub struct WarmResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Number of body bytes read and discarded
    pub bytes: u64,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Downloads a playlist document as text.
    async fn fetch_text(&self, url: &str, headers: &HeaderMap) -> Result<String, WarmerError>;

    /// Issues a GET and reads the whole body so that caches register a complete transfer.
    async fn warm(&self, url: &str, headers: &HeaderMap) -> Result<WarmResponse, WarmerError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &HttpClientConfig) -> Result<Self, WarmerError> {
        Ok(Self::new(config.build_client()?))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch_text(&self, url: &str, headers: &HeaderMap) -> Result<String, WarmerError> {
        let response = self.client.get(url).headers(headers.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                url = %url,
                status = status.as_u16(),
                "Playlist request returned non-success status"
            );
        }

        response
            .text()
            .await
            .map_err(|e| WarmerError::body_read(url, e))
    }

    async fn warm(&self, url: &str, headers: &HeaderMap) -> Result<WarmResponse, WarmerError> {
        let response = self.client.get(url).headers(headers.clone()).send().await?;

        let status = response.status();
        let response_headers = response.headers().clone();
        trace!(url = %url, http_version = ?response.version(), "Segment response received");

        let mut body = response.bytes_stream();
        let mut drained: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| WarmerError::body_read(url, e))?;
            drained += chunk.len() as u64;
        }

        Ok(WarmResponse {
            status,
            headers: response_headers,
            bytes: drained,
        })
    }
}
