// Error handling module
// Contains the application error type and conversions from library errors

use thiserror::Error;
use tokio_tungstenite::tungstenite;

// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Please enter some text!")]
    EmptyText,

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("No audio received from the speech service")]
    NoAudio,

    #[error("Timed out while {0}")]
    Timeout(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Ошибки, которые пользователь видит как предупреждение, а не как сбой
    pub fn is_warning(&self) -> bool {
        matches!(self, AppError::EmptyText)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ApiError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<tungstenite::Error> for AppError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::Io(e) => AppError::IoError(e),
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                AppError::ConnectionError("connection closed".to_string())
            }
            other => AppError::ConnectionError(other.to_string()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout("waiting for the speech service".to_string())
    }
}

// Result type alias for application
pub type AppResult<T> = Result<T, AppError>;
