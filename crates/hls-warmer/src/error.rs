#[derive(Debug, thiserror::Error)]
pub enum WarmerError {
    #[error("invalid URL `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}: {reason}")]
    BodyRead { url: String, reason: String },

    #[error("playlist error for {url}: {reason}")]
    Playlist { url: String, reason: String },

    #[error("HTTP client error: {reason}")]
    Client { reason: String },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

impl WarmerError {
    pub fn invalid_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn body_read(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::BodyRead {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn playlist(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Playlist {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn client(reason: impl Into<String>) -> Self {
        Self::Client {
            reason: reason.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Errors that abort a whole warm cycle before any segment is fetched.
    pub fn is_parse_failure(&self) -> bool {
        match self {
            Self::InvalidUrl { .. } | Self::Playlist { .. } => true,
            Self::Network { .. }
            | Self::BodyRead { .. }
            | Self::Client { .. }
            | Self::Configuration { .. } => false,
        }
    }
}
