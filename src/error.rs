use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Malformed input: {0}")]
    MalformedInput(#[from] SeriesError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// A price series that violates the collaborator contract.
///
/// These are construction-time failures: a series that cannot be built is
/// never handed to the indicator engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("price series is empty")]
    Empty,

    #[error("price at index {index} must be positive and finite, got {price}")]
    InvalidPrice { index: usize, price: f64 },

    #[error("volume at index {index} must be non-negative and finite, got {volume}")]
    InvalidVolume { index: usize, volume: f64 },
}

pub type Result<T> = std::result::Result<T, AppError>;
