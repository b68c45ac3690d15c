use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Guard failed: {0}")]
    Guard(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl ReportError {
    /// Guard failures leave every step status untouched.
    pub fn is_guard(&self) -> bool {
        matches!(self, ReportError::Guard(_))
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
