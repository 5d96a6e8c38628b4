use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Warmer error: {0}")]
    Warmer(#[from] hls_warmer_engine::WarmerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
