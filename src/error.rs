//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Image search error: {0}")]
    ImageSearch(String),

    #[error("Malformed outline: {0}")]
    Outline(String),

    #[error("Missing configuration: {0} is not set")]
    MissingConfig(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Unknown session: {0}")]
    SessionNotFound(uuid::Uuid),

    #[error("Unknown file: {0}")]
    FileNotFound(uuid::Uuid),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

impl Error {
    /// Whether the failure came from one of the upstream providers rather
    /// than from this service.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::AiProvider(_) | Error::ImageSearch(_) | Error::Outline(_) | Error::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
