//! Stock photo retrieval
//!
//! Looks up one landscape photo per slide query and downloads it so it can be
//! embedded in the deck. A missing photo never fails a deck.

pub mod mock;
pub mod pexels;

pub use mock::MockPhotoClient;
pub use pexels::PexelsClient;

use crate::Result;
use async_trait::async_trait;
use tracing::{info, warn};

#[async_trait]
pub trait PhotoService: Send + Sync {
    /// URL of the best match for `query`, or `None` when nothing matched.
    async fn search(&self, query: &str) -> Result<Option<String>>;

    /// Download the image behind `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    fn enabled(&self) -> bool {
        true
    }

    /// Search and download in one step, logging instead of failing.
    async fn find_image(&self, query: &str) -> Option<Vec<u8>> {
        let url = match self.search(query).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                info!("No images found for: '{}'", query);
                return None;
            }
            Err(e) => {
                warn!("Image search failed for '{}': {}", query, e);
                return None;
            }
        };

        match self.fetch(&url).await {
            Ok(bytes) => {
                info!("Downloaded image for '{}' ({} bytes)", query, bytes.len());
                Some(bytes)
            }
            Err(e) => {
                warn!("Image download failed for '{}': {}", query, e);
                None
            }
        }
    }
}

/// Stand-in used when no photo API key is configured.
pub struct DisabledPhotoClient;

#[async_trait]
impl PhotoService for DisabledPhotoClient {
    async fn search(&self, _query: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(crate::Error::ImageSearch(format!(
            "image retrieval is disabled, cannot fetch {}",
            url
        )))
    }

    fn enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_client_finds_nothing() {
        let client = DisabledPhotoClient;
        assert!(!client.enabled());
        assert!(client.find_image("sunset").await.is_none());
    }

    #[tokio::test]
    async fn test_find_image_swallows_fetch_errors() {
        let client = MockPhotoClient::new().with_fetch_failure(true);
        assert!(client.find_image("sunset").await.is_none());
        assert_eq!(client.get_search_count(), 1);
    }
}
