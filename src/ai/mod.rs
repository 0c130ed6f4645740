//! LLM integration for outline generation
//!
//! Provides the [`OutlineService`] seam plus the Groq-backed implementation
//! that drafts and refines presentation outlines.

pub mod groq;
pub mod mock;

pub use groq::GroqOutlineClient;
pub use mock::MockOutlineClient;

use crate::models::Outline;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;

/// Connection summary shown in the UI sidebar.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProviderStatus {
    pub connected: bool,
    pub model: Option<String>,
}

#[async_trait]
pub trait OutlineService: Send + Sync {
    /// Draft a fresh outline for `topic`.
    async fn generate_outline(&self, topic: &str) -> Result<Outline>;

    /// Produce a full replacement for `current` that applies `feedback`.
    async fn refine_outline(&self, current: &Outline, feedback: &str) -> Result<Outline>;

    fn status(&self) -> ProviderStatus;
}

/// Stand-in used when no LLM API key is configured.
pub struct DisconnectedOutlineClient;

#[async_trait]
impl OutlineService for DisconnectedOutlineClient {
    async fn generate_outline(&self, _topic: &str) -> Result<Outline> {
        Err(Error::MissingConfig("GROQ_API_KEY".to_string()))
    }

    async fn refine_outline(&self, _current: &Outline, _feedback: &str) -> Result<Outline> {
        Err(Error::MissingConfig("GROQ_API_KEY".to_string()))
    }

    fn status(&self) -> ProviderStatus {
        ProviderStatus {
            connected: false,
            model: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disconnected_client_reports_missing_key() {
        let client = DisconnectedOutlineClient;
        let err = client.generate_outline("rust").await.unwrap_err();
        assert!(matches!(err, Error::MissingConfig(ref key) if key == "GROQ_API_KEY"));
        assert!(!client.status().connected);
    }
}
